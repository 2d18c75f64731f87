//! Integration tests for configuration management
//!
//! These tests validate that mesh configuration layers a file under
//! `MESHLINE_*` environment overrides and that the loaded settings flow into
//! generated filter chains.

use std::env;
use std::io::Write;
use std::sync::{Arc, Mutex};

use meshline::config::TlsProtocolVersion;
use meshline::mesh::{MeshService, StaticEndpointResolver};
use meshline::xds::ListenerBuilder;
use meshline::{Error, MeshConfig, Result};

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDES: [&str; 3] =
    ["MESHLINE_IN_MESH_ALPN", "MESHLINE_TRACING__ENABLE", "MESHLINE_TLS__MIN_PROTOCOL_VERSION"];

/// Restores the override variables when dropped
struct EnvGuard(Vec<(&'static str, Option<String>)>);

impl EnvGuard {
    fn capture() -> Self {
        Self(OVERRIDES.iter().map(|key| (*key, env::var(key).ok())).collect())
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.0 {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

/// Test that defaults apply when neither a file nor overrides are present
#[test]
fn test_config_defaults_integration() -> Result<()> {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::capture();
    for key in OVERRIDES {
        env::remove_var(key);
    }

    let config = MeshConfig::load(None)?;
    assert_eq!(config, MeshConfig::default());

    Ok(())
}

/// Test that environment variables override values from the configuration file
#[test]
fn test_config_environment_overrides_file() -> Result<()> {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::capture();
    for key in OVERRIDES {
        env::remove_var(key);
    }

    let file = write_config("in_mesh_alpn: [osm]\ntracing:\n  enable: false\n");

    env::set_var("MESHLINE_IN_MESH_ALPN", "osm,mesh-v2");
    env::set_var("MESHLINE_TRACING__ENABLE", "true");
    env::set_var("MESHLINE_TLS__MIN_PROTOCOL_VERSION", "TLSv1_3");

    let config = MeshConfig::load(Some(file.path()))?;
    assert_eq!(config.in_mesh_alpn, vec!["osm".to_string(), "mesh-v2".to_string()]);
    assert!(config.tracing.enable);
    assert_eq!(config.tls.min_protocol_version, TlsProtocolVersion::Tls13);

    Ok(())
}

/// Test that an override producing an invalid configuration is rejected
#[test]
fn test_config_rejects_invalid_override() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::capture();
    for key in OVERRIDES {
        env::remove_var(key);
    }

    let file = write_config("tls:\n  max_protocol_version: TLSv1_2\n");
    env::set_var("MESHLINE_TLS__MIN_PROTOCOL_VERSION", "TLSv1_3");

    let result = MeshConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Validation { .. })));
}

/// Test that loaded ALPN tokens are what the inbound chain advertises
#[test]
fn test_loaded_config_drives_inbound_alpn() -> Result<()> {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _env = EnvGuard::capture();
    for key in OVERRIDES {
        env::remove_var(key);
    }

    let file = write_config("in_mesh_alpn: [mesh-a, mesh-b]\n");
    let config = Arc::new(MeshConfig::load(Some(file.path()))?);

    let builder = ListenerBuilder::new(config, Arc::new(StaticEndpointResolver::new()));
    let chain = builder.build_inbound_chain(&MeshService::new("default", "bookstore"))?;

    let m = chain.filter_chain_match.unwrap();
    assert_eq!(m.application_protocols, vec!["mesh-a".to_string(), "mesh-b".to_string()]);

    Ok(())
}
