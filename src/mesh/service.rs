//! Mesh service identity
//!
//! A `MeshService` names a mesh participant by namespace and name. It derives
//! the SNI used both by upstream sidecars when originating TLS and by the
//! inbound filter chain when matching it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;

/// DNS suffix appended to `<name>.<namespace>` to form a server name
pub const CLUSTER_DOMAIN_SUFFIX: &str = "svc.cluster.local";

/// Identity of a service participating in the mesh
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshService {
    pub namespace: String,
    pub name: String,
}

impl MeshService {
    pub fn new<N: Into<String>, S: Into<String>>(namespace: N, name: S) -> Self {
        Self { namespace: namespace.into(), name: name.into() }
    }

    /// Canonical TLS server name, e.g. `bookstore.default.svc.cluster.local`
    pub fn server_name(&self) -> String {
        format!("{}.{}.{}", self.name, self.namespace, CLUSTER_DOMAIN_SUFFIX)
    }
}

impl fmt::Display for MeshService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for MeshService {
    type Err = Error;

    /// Parses `<namespace>/<name>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(namespace, name))
            }
            _ => Err(Error::validation_field(
                format!("Invalid mesh service '{}': expected <namespace>/<name>", s),
                "service",
            )),
        }
    }
}
