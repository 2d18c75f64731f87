//! # Listener Discovery Payloads
//!
//! Builds the filter chains served to sidecars over LDS using envoy-types
//! protobuf definitions.
//!
//! - [`filter_chain_match`]: SNI, ALPN, transport protocol and destination predicates
//! - [`connection_manager`]: the HTTP connection manager bound to a route table
//! - [`tls`]: mTLS transport sockets for inbound mesh traffic
//! - [`listener`]: assembly of complete filter chains per proxy

pub mod connection_manager;
pub mod filter_chain_match;
pub mod listener;
pub mod resources;
pub mod summary;
pub mod tls;

pub use connection_manager::{
    ConnectionManagerFactory, MeshConnectionManagerFactory, RouteTable, INBOUND_ROUTE_CONFIG_NAME,
    OUTBOUND_ROUTE_CONFIG_NAME,
};
pub use filter_chain_match::{
    host_prefix_range, inbound_mesh_match, outbound_http_match, MatchOutcome,
    SUPPORTED_DOWNSTREAM_HTTP_PROTOCOLS, TRANSPORT_PROTOCOL_TLS,
};
pub use listener::{
    outbound_filter_chain_name, ListenerBuilder, OutboundChain, ProxyFilterChains,
    INBOUND_MESH_FILTER_CHAIN_NAME, OUTBOUND_MESH_HTTP_FILTER_CHAIN_PREFIX,
};
pub use summary::FilterChainSummary;
pub use tls::{
    tls_transport_socket, CertificateProvider, MeshCertificateProvider,
    MeshTransportSecurityFactory, SdsSecretNames, TransportSecurityFactory,
};
