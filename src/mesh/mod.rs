//! Mesh inputs to listener generation: service identities, endpoint
//! resolution, and static topology snapshots.

pub mod resolver;
pub mod service;
pub mod topology;

pub use resolver::EndpointResolver;
pub use service::{MeshService, CLUSTER_DOMAIN_SUFFIX};
pub use topology::{MeshTopology, ServiceEntry, StaticEndpointResolver};
