//! # Configuration Settings
//!
//! Read-only mesh configuration consumed by the listener builder, plus the
//! observability settings used by the binary.

use crate::errors::{Error, Result};
use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::tls_parameters::TlsProtocol;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Prefix for environment overrides, e.g. `MESHLINE_TRACING__ENABLE=true`
pub const ENV_PREFIX: &str = "MESHLINE";

/// Mesh-wide configuration snapshot.
///
/// Passed explicitly into every builder; nothing in the crate reads mesh
/// settings from ambient state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MeshConfig {
    /// ALPN tokens advertised by in-mesh upstream connections
    #[validate(length(min = 1, message = "At least one in-mesh ALPN token is required"))]
    pub in_mesh_alpn: Vec<String>,

    /// File the HTTP connection manager writes access logs to (None = no access log)
    pub access_log_path: Option<String>,

    /// Request tracing settings
    #[validate(nested)]
    pub tracing: MeshTracingConfig,

    /// TLS protocol bounds for mesh transport sockets
    #[validate(nested)]
    pub tls: MeshTlsConfig,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            in_mesh_alpn: vec!["osm".to_string()],
            access_log_path: Some("/dev/stdout".to_string()),
            tracing: MeshTracingConfig::default(),
            tls: MeshTlsConfig::default(),
        }
    }
}

impl MeshConfig {
    /// Load configuration from defaults, an optional file, then `MESHLINE_*` environment
    /// variables, and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::config(format!(
                    "Configuration file {} does not exist",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("in_mesh_alpn"),
            )
            .build()?;

        let mesh: MeshConfig = settings.try_deserialize()?;
        mesh.validate()?;
        Ok(mesh)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.in_mesh_alpn.iter().any(|token| token.trim().is_empty()) {
            return Err(Error::validation_field(
                "In-mesh ALPN tokens cannot be blank",
                "in_mesh_alpn",
            ));
        }

        if let Some(path) = &self.access_log_path {
            if path.trim().is_empty() {
                return Err(Error::validation_field(
                    "Access log path cannot be blank; omit it to disable access logging",
                    "access_log_path",
                ));
            }
        }

        if self.tls.min_protocol_version > self.tls.max_protocol_version {
            return Err(Error::validation_field(
                "Minimum TLS version cannot exceed maximum TLS version",
                "tls.min_protocol_version",
            ));
        }

        Ok(())
    }
}

/// Request tracing configuration for HTTP connection managers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MeshTracingConfig {
    /// Enable request tracing
    pub enable: bool,

    /// Cluster the Zipkin collector is reachable through
    #[validate(length(min = 1, message = "Tracing collector cluster cannot be empty"))]
    pub collector_cluster: String,

    /// HTTP path spans are posted to
    #[validate(length(min = 1, message = "Tracing collector endpoint cannot be empty"))]
    pub collector_endpoint: String,
}

impl Default for MeshTracingConfig {
    fn default() -> Self {
        Self {
            enable: false,
            collector_cluster: "envoy-tracing-cluster".to_string(),
            collector_endpoint: "/api/v2/spans".to_string(),
        }
    }
}

/// TLS protocol bounds for mesh transport sockets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MeshTlsConfig {
    pub min_protocol_version: TlsProtocolVersion,
    pub max_protocol_version: TlsProtocolVersion,
}

impl Default for MeshTlsConfig {
    fn default() -> Self {
        Self {
            min_protocol_version: TlsProtocolVersion::Tls12,
            max_protocol_version: TlsProtocolVersion::Tls13,
        }
    }
}

/// TLS protocol versions a mesh transport socket may negotiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TlsProtocolVersion {
    #[serde(rename = "TLSv1_0")]
    Tls10,
    #[serde(rename = "TLSv1_1")]
    Tls11,
    #[serde(rename = "TLSv1_2")]
    Tls12,
    #[serde(rename = "TLSv1_3")]
    Tls13,
}

impl TlsProtocolVersion {
    /// Wire value of envoy's `TlsParameters.TlsProtocol`
    pub fn as_proto(self) -> i32 {
        match self {
            TlsProtocolVersion::Tls10 => TlsProtocol::TlSv10 as i32,
            TlsProtocolVersion::Tls11 => TlsProtocol::TlSv11 as i32,
            TlsProtocolVersion::Tls12 => TlsProtocol::TlSv12 as i32,
            TlsProtocolVersion::Tls13 => TlsProtocol::TlSv13 as i32,
        }
    }
}

/// Logging configuration for the binary
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { service_name: "meshline".to_string(), log_level: "info".to_string(), json_logging: false }
    }
}

impl ObservabilityConfig {
    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let service_name =
            std::env::var("MESHLINE_SERVICE_NAME").unwrap_or(defaults.service_name);

        let log_level = std::env::var("MESHLINE_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(defaults.log_level);

        let json_logging = std::env::var("MESHLINE_LOG_JSON")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.json_logging);

        Self { service_name, log_level, json_logging }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validation() {
        let config = MeshConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.in_mesh_alpn, vec!["osm".to_string()]);
        assert!(!config.tracing.enable);
    }

    #[test]
    fn test_empty_alpn_rejected() {
        let config = MeshConfig { in_mesh_alpn: vec![], ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Validation { .. })));

        let config = MeshConfig { in_mesh_alpn: vec!["  ".to_string()], ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tls_version_bounds() {
        let mut config = MeshConfig::default();
        config.tls.min_protocol_version = TlsProtocolVersion::Tls13;
        config.tls.max_protocol_version = TlsProtocolVersion::Tls12;
        assert!(config.validate().is_err());

        config.tls.max_protocol_version = TlsProtocolVersion::Tls13;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tracing_requires_collector() {
        let mut config = MeshConfig::default();
        config.tracing.collector_cluster = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_access_log_path_rejected() {
        let config = MeshConfig { access_log_path: Some(" ".to_string()), ..Default::default() };
        assert!(config.validate().is_err());

        let config = MeshConfig { access_log_path: None, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tls_protocol_wire_values() {
        assert_eq!(TlsProtocolVersion::Tls10.as_proto(), 1);
        assert_eq!(TlsProtocolVersion::Tls12.as_proto(), 3);
        assert_eq!(TlsProtocolVersion::Tls13.as_proto(), 4);
        for (version, expected) in [
            (TlsProtocolVersion::Tls12, TlsProtocol::TlSv12),
            (TlsProtocolVersion::Tls13, TlsProtocol::TlSv13),
        ] {
            assert_eq!(TlsProtocol::try_from(version.as_proto()), Ok(expected));
        }
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "in_mesh_alpn: [osm, mesh-v2]\ntracing:\n  enable: true\ntls:\n  min_protocol_version: TLSv1_3\n"
        )
        .unwrap();

        let config = MeshConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.in_mesh_alpn, vec!["osm".to_string(), "mesh-v2".to_string()]);
        assert!(config.tracing.enable);
        assert_eq!(config.tracing.collector_cluster, "envoy-tracing-cluster");
        assert_eq!(config.tls.min_protocol_version, TlsProtocolVersion::Tls13);
        assert_eq!(config.tls.max_protocol_version, TlsProtocolVersion::Tls13);
    }

    #[test]
    fn test_load_rejects_invalid_file_contents() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "in_mesh_alpn: []").unwrap();

        assert!(MeshConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = MeshConfig::load(Some(Path::new("/nonexistent/meshline.yaml")));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_observability_defaults() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "meshline");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logging);
    }
}
