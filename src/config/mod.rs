//! # Configuration Management
//!
//! Mesh configuration snapshots and observability settings.

pub mod settings;

pub use settings::{
    MeshConfig, MeshTlsConfig, MeshTracingConfig, ObservabilityConfig, TlsProtocolVersion,
    ENV_PREFIX,
};
