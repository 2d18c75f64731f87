//! # meshline
//!
//! Listener filter-chain generation for service-mesh sidecars. Given a proxy's
//! identity and the mesh's current service/endpoint snapshot, meshline builds
//! the Envoy filter chains that decide, per connection, which transport
//! security and HTTP routing apply.
//!
//! ## Architecture
//!
//! ```text
//! MeshConfig ─┐
//! Resolver ───┼─→ ListenerBuilder ─→ FilterChain (inbound mTLS)
//! Certs ──────┘         │         └→ FilterChain per destination (outbound HTTP)
//!                       ↓
//!     filter_chain_match / connection_manager / tls
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use meshline::mesh::{MeshService, StaticEndpointResolver};
//! use meshline::xds::{ListenerBuilder, OutboundChain};
//! use meshline::{MeshConfig, Result};
//!
//! fn main() -> Result<()> {
//!     let bookstore = MeshService::new("default", "bookstore");
//!     let resolver = StaticEndpointResolver::new()
//!         .with_service(bookstore.clone(), vec!["10.0.0.5".parse().unwrap()]);
//!
//!     let builder = ListenerBuilder::new(Arc::new(MeshConfig::default()), Arc::new(resolver));
//!     let inbound = builder.build_inbound_chain(&bookstore)?;
//!     if let OutboundChain::Chain(outbound) = builder.build_outbound_chain(&bookstore)? {
//!         println!("{} / {}", inbound.name, outbound.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod mesh;
pub mod observability;
pub mod xds;

// Re-export commonly used types and traits
pub use config::{MeshConfig, ObservabilityConfig};
pub use errors::{Error, Result};
pub use observability::init_logging;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
