//! Filter chain match predicates
//!
//! Envoy picks a filter chain per connection by evaluating its match block. A
//! match with no predicates selects every connection, so the outbound builder
//! never returns one: a destination without endpoints yields
//! [`MatchOutcome::NoEndpoints`] instead.

use std::net::IpAddr;

use envoy_types::pb::envoy::config::core::v3::CidrRange;
use envoy_types::pb::envoy::config::listener::v3::FilterChainMatch;
use envoy_types::pb::google::protobuf::UInt32Value;
use tracing::{error, info};

use crate::config::MeshConfig;
use crate::mesh::{EndpointResolver, MeshService};
use crate::{Error, Result};

/// Transport protocol reported by Envoy's TLS inspector for TLS connections
pub const TRANSPORT_PROTOCOL_TLS: &str = "tls";

/// HTTP protocols a local application may use to originate an outbound request.
///
/// Applications only send plaintext to the sidecar, so `h2` is excluded; the
/// sidecar-to-sidecar hop is the one that is encrypted.
pub const SUPPORTED_DOWNSTREAM_HTTP_PROTOCOLS: [&str; 3] = ["http/1.0", "http/1.1", "h2c"];

/// Result of building an outbound match
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Match(FilterChainMatch),
    /// The destination resolved to no endpoints; no chain should be emitted
    NoEndpoints,
}

/// Exact-host prefix range for an endpoint address
pub fn host_prefix_range(ip: IpAddr) -> CidrRange {
    let prefix_len = match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };

    CidrRange { address_prefix: ip.to_string(), prefix_len: Some(UInt32Value { value: prefix_len }) }
}

/// Match for mTLS traffic from other sidecars addressed to `proxy`.
///
/// The server name is the SNI the upstream sidecar sets when originating TLS;
/// it is not derived from the peer certificate.
pub fn inbound_mesh_match(proxy: &MeshService, config: &MeshConfig) -> FilterChainMatch {
    FilterChainMatch {
        server_names: vec![proxy.server_name()],
        transport_protocol: TRANSPORT_PROTOCOL_TLS.to_string(),
        application_protocols: config.in_mesh_alpn.clone(),
        ..Default::default()
    }
}

/// Match for plaintext HTTP from the local application to `destination`.
///
/// One prefix range per resolved endpoint, in resolver order.
pub fn outbound_http_match(
    destination: &MeshService,
    resolver: &dyn EndpointResolver,
) -> Result<MatchOutcome> {
    let endpoints = resolver.resolve_endpoints(destination).map_err(|e| {
        error!(service = %destination, error = %e, "Error resolving endpoints");
        Error::resolution(destination.to_string(), e)
    })?;

    if endpoints.is_empty() {
        info!(service = %destination, "No resolvable endpoints returned for service");
        return Ok(MatchOutcome::NoEndpoints);
    }

    Ok(MatchOutcome::Match(FilterChainMatch {
        application_protocols: SUPPORTED_DOWNSTREAM_HTTP_PROTOCOLS
            .iter()
            .map(|protocol| protocol.to_string())
            .collect(),
        prefix_ranges: endpoints.into_iter().map(host_prefix_range).collect(),
        ..Default::default()
    }))
}
