//! Static mesh topology snapshots
//!
//! A `MeshTopology` is a serializable list of services and their endpoints.
//! It backs `StaticEndpointResolver`, which the CLI and tests use in place of
//! a live service catalog.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::mesh::{EndpointResolver, MeshService};

/// One service entry in a topology snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<IpAddr>,
}

impl ServiceEntry {
    pub fn service(&self) -> MeshService {
        MeshService::new(self.namespace.clone(), self.name.clone())
    }
}

/// Point-in-time view of the services in a mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshTopology {
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

impl MeshTopology {
    /// Load a topology from a YAML or JSON file (chosen by extension, YAML otherwise)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, format!("Failed to read topology {}", path.display())))?;

        let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
        let topology: MeshTopology =
            if is_json { serde_json::from_str(&contents)? } else { serde_yaml::from_str(&contents)? };

        topology.validate()?;
        Ok(topology)
    }

    /// Reject duplicate service entries
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.services {
            let service = entry.service();
            if entry.namespace.is_empty() || entry.name.is_empty() {
                return Err(Error::topology(format!(
                    "Service entry '{}' must have a namespace and a name",
                    service
                )));
            }
            if !seen.insert(service.clone()) {
                return Err(Error::topology(format!("Service '{}' is listed more than once", service)));
            }
        }
        Ok(())
    }

    /// All services in listed order
    pub fn services(&self) -> Vec<MeshService> {
        self.services.iter().map(ServiceEntry::service).collect()
    }
}

/// Resolver answering from an in-memory topology snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticEndpointResolver {
    endpoints: HashMap<MeshService, Vec<IpAddr>>,
}

impl StaticEndpointResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the endpoints of a service
    pub fn with_service(mut self, service: MeshService, endpoints: Vec<IpAddr>) -> Self {
        self.endpoints.insert(service, endpoints);
        self
    }
}

impl From<&MeshTopology> for StaticEndpointResolver {
    fn from(topology: &MeshTopology) -> Self {
        let endpoints =
            topology.services.iter().map(|entry| (entry.service(), entry.endpoints.clone())).collect();
        Self { endpoints }
    }
}

impl EndpointResolver for StaticEndpointResolver {
    fn resolve_endpoints(&self, service: &MeshService) -> Result<Vec<IpAddr>> {
        let endpoints = self.endpoints.get(service).cloned().ok_or_else(|| {
            Error::topology(format!("Service '{}' is not present in the topology", service))
        })?;

        debug!(service = %service, endpoint_count = endpoints.len(), "Resolved endpoints from topology");
        Ok(endpoints)
    }
}
