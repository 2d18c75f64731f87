//! Listener filter chain assembly
//!
//! `ListenerBuilder` turns a proxy identity and the current mesh snapshot into
//! the filter chains of that proxy's listener: one inbound mTLS chain, and one
//! plaintext HTTP chain per destination that currently has endpoints.
//!
//! Every call is a pure transform over the collaborators it was built with.
//! The builder holds no mutable state and can be shared across threads.

use std::sync::Arc;

use envoy_types::pb::envoy::config::listener::v3::{
    filter::ConfigType as FilterConfigType, Filter, FilterChain,
};
use envoy_types::pb::google::protobuf::Any;
use tracing::{debug, error, info};

use crate::config::MeshConfig;
use crate::lds_span;
use crate::mesh::{EndpointResolver, MeshService};
use crate::xds::connection_manager::{
    ConnectionManagerFactory, MeshConnectionManagerFactory, RouteTable,
};
use crate::xds::filter_chain_match::{inbound_mesh_match, outbound_http_match, MatchOutcome};
use crate::xds::resources::HTTP_CONNECTION_MANAGER_FILTER_NAME;
use crate::xds::tls::{
    tls_transport_socket, MeshCertificateProvider, MeshTransportSecurityFactory,
    TransportSecurityFactory,
};
use crate::{Error, Result};

pub const INBOUND_MESH_FILTER_CHAIN_NAME: &str = "inbound-mesh-filter-chain";
pub const OUTBOUND_MESH_HTTP_FILTER_CHAIN_PREFIX: &str = "outbound-mesh-http-filter-chain";

/// Name of the outbound chain for `destination`
pub fn outbound_filter_chain_name(destination: &MeshService) -> String {
    format!("{}:{}", OUTBOUND_MESH_HTTP_FILTER_CHAIN_PREFIX, destination)
}

/// Result of building an outbound chain
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundChain {
    Chain(FilterChain),
    /// The destination has no endpoints; omit it from the listener
    NoEndpoints,
}

impl OutboundChain {
    pub fn into_chain(self) -> Option<FilterChain> {
        match self {
            OutboundChain::Chain(chain) => Some(chain),
            OutboundChain::NoEndpoints => None,
        }
    }

    pub fn is_no_endpoints(&self) -> bool {
        matches!(self, OutboundChain::NoEndpoints)
    }
}

/// Filter chains generated for one proxy in one generation cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyFilterChains {
    pub inbound: FilterChain,
    pub outbound: Vec<FilterChain>,
    /// Destinations left out because they had no endpoints
    pub skipped: Vec<MeshService>,
}

impl ProxyFilterChains {
    /// All chains, inbound first
    pub fn into_filter_chains(self) -> Vec<FilterChain> {
        std::iter::once(self.inbound).chain(self.outbound).collect()
    }
}

fn http_connection_manager_filter(typed_config: Any) -> Filter {
    Filter {
        name: HTTP_CONNECTION_MANAGER_FILTER_NAME.to_string(),
        config_type: Some(FilterConfigType::TypedConfig(typed_config)),
    }
}

/// Builds listener filter chains from a mesh snapshot
#[derive(Clone)]
pub struct ListenerBuilder {
    config: Arc<MeshConfig>,
    resolver: Arc<dyn EndpointResolver>,
    connection_managers: Arc<dyn ConnectionManagerFactory>,
    transport_security: Arc<dyn TransportSecurityFactory>,
}

impl std::fmt::Debug for ListenerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerBuilder").field("config", &self.config).finish_non_exhaustive()
    }
}

impl ListenerBuilder {
    /// Create a builder using the mesh connection manager and SDS-backed mTLS factories
    pub fn new(config: Arc<MeshConfig>, resolver: Arc<dyn EndpointResolver>) -> Self {
        let connection_managers = Arc::new(MeshConnectionManagerFactory::new(config.clone()));
        let transport_security = Arc::new(MeshTransportSecurityFactory::new(
            config.clone(),
            Arc::new(MeshCertificateProvider),
        ));

        Self { config, resolver, connection_managers, transport_security }
    }

    pub fn with_connection_manager_factory(
        mut self,
        factory: Arc<dyn ConnectionManagerFactory>,
    ) -> Self {
        self.connection_managers = factory;
        self
    }

    pub fn with_transport_security_factory(
        mut self,
        factory: Arc<dyn TransportSecurityFactory>,
    ) -> Self {
        self.transport_security = factory;
        self
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Build the inbound mTLS chain for `proxy`.
    ///
    /// Fails if the mesh has no in-mesh ALPN token or if either payload cannot
    /// be serialized; no partial chain is returned.
    pub fn build_inbound_chain(&self, proxy: &MeshService) -> Result<FilterChain> {
        let _span = lds_span!("build_inbound_chain", proxy).entered();
        let target = proxy.to_string();

        if self.config.in_mesh_alpn.iter().all(|token| token.trim().is_empty()) {
            error!(proxy = %proxy, "No in-mesh ALPN configured for inbound filter chain");
            return Err(Error::validation_field(
                "At least one in-mesh ALPN token is required",
                "in_mesh_alpn",
            ));
        }

        let tls_context = self.transport_security.typed_config(proxy).map_err(|e| {
            error!(proxy = %proxy, error = %e, "Error building DownstreamTlsContext for proxy");
            e
        })?;

        let connection_manager =
            self.connection_managers.typed_config(RouteTable::Inbound, &target).map_err(|e| {
                error!(
                    proxy = %proxy,
                    error = %e,
                    "Error building inbound HttpConnectionManager for proxy"
                );
                e
            })?;

        let chain = FilterChain {
            name: INBOUND_MESH_FILTER_CHAIN_NAME.to_string(),
            filters: vec![http_connection_manager_filter(connection_manager)],
            filter_chain_match: Some(inbound_mesh_match(proxy, &self.config)),
            transport_socket: Some(tls_transport_socket(tls_context)),
            ..Default::default()
        };

        debug!(proxy = %proxy, chain = %chain.name, "Built inbound filter chain");
        Ok(chain)
    }

    /// Build the outbound HTTP chain for `destination`.
    ///
    /// Returns [`OutboundChain::NoEndpoints`] when the destination has no
    /// endpoints; resolver and serialization failures are errors.
    pub fn build_outbound_chain(&self, destination: &MeshService) -> Result<OutboundChain> {
        let _span = lds_span!("build_outbound_chain", destination).entered();

        let filter_chain_match = match outbound_http_match(destination, self.resolver.as_ref())? {
            MatchOutcome::Match(m) => m,
            MatchOutcome::NoEndpoints => return Ok(OutboundChain::NoEndpoints),
        };

        let connection_manager = self
            .connection_managers
            .typed_config(RouteTable::Outbound, &destination.to_string())
            .map_err(|e| {
                error!(
                    service = %destination,
                    error = %e,
                    "Error building outbound HttpConnectionManager"
                );
                e
            })?;

        let chain = FilterChain {
            name: outbound_filter_chain_name(destination),
            filters: vec![http_connection_manager_filter(connection_manager)],
            filter_chain_match: Some(filter_chain_match),
            ..Default::default()
        };

        debug!(service = %destination, chain = %chain.name, "Built outbound filter chain");
        Ok(OutboundChain::Chain(chain))
    }

    /// Build every chain for `proxy`: the inbound chain, then one outbound chain
    /// per destination in the given order. Destinations without endpoints are
    /// recorded in `skipped`; the first error aborts the whole set.
    pub fn build_filter_chains(
        &self,
        proxy: &MeshService,
        destinations: &[MeshService],
    ) -> Result<ProxyFilterChains> {
        let inbound = self.build_inbound_chain(proxy)?;

        let mut outbound = Vec::with_capacity(destinations.len());
        let mut skipped = Vec::new();
        for destination in destinations {
            match self.build_outbound_chain(destination)? {
                OutboundChain::Chain(chain) => outbound.push(chain),
                OutboundChain::NoEndpoints => skipped.push(destination.clone()),
            }
        }

        info!(
            proxy = %proxy,
            outbound_chains = outbound.len(),
            skipped_destinations = skipped.len(),
            "Built listener filter chains"
        );

        Ok(ProxyFilterChains { inbound, outbound, skipped })
    }
}
