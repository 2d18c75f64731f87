//! Endpoint resolution seam
//!
//! The catalog that owns service discovery lives outside this crate. Listener
//! generation only needs a point-in-time list of addresses per destination.

use std::net::IpAddr;

use crate::errors::Result;
use crate::mesh::MeshService;

/// Resolves the routable addresses of a destination service.
///
/// An `Ok` with an empty list means the service legitimately has no endpoints
/// yet. Lookup failures must be returned as `Err` so callers can tell the two
/// apart.
pub trait EndpointResolver: Send + Sync {
    /// Return the current endpoint addresses for `service`, in a stable order
    fn resolve_endpoints(&self, service: &MeshService) -> Result<Vec<IpAddr>>;
}

impl<T: EndpointResolver + ?Sized> EndpointResolver for std::sync::Arc<T> {
    fn resolve_endpoints(&self, service: &MeshService) -> Result<Vec<IpAddr>> {
        (**self).resolve_endpoints(service)
    }
}
