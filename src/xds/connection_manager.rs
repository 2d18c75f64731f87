//! HTTP connection manager construction
//!
//! Every mesh filter chain carries exactly one network filter: an HTTP
//! connection manager that fetches its routes over RDS. Inbound chains share
//! one route table and outbound chains share another.

use std::sync::Arc;

use envoy_types::pb::envoy::config::accesslog::v3::{
    access_log::ConfigType as AccessLogConfigType, AccessLog,
};
use envoy_types::pb::envoy::config::trace::v3::{
    tracing as trace_provider, zipkin_config::CollectorEndpointVersion, ZipkinConfig,
};
use envoy_types::pb::envoy::extensions::access_loggers::file::v3::FileAccessLog;
use envoy_types::pb::envoy::extensions::filters::http::router::v3::Router;
use envoy_types::pb::envoy::extensions::filters::network::http_connection_manager::v3::{
    http_connection_manager::{CodecType, RouteSpecifier, Tracing},
    http_filter::ConfigType as HttpFilterConfigType,
    HttpConnectionManager, HttpFilter, Rds,
};
use envoy_types::pb::google::protobuf::{Any, BoolValue};

use crate::config::MeshConfig;
use crate::xds::resources::{
    ads_config_source, encode_any, FILE_ACCESS_LOG_NAME, FILE_ACCESS_LOG_TYPE_URL,
    HTTP_CONNECTION_MANAGER_TYPE_URL, ROUTER_FILTER_NAME, ROUTER_TYPE_URL, ZIPKIN_CONFIG_TYPE_URL,
    ZIPKIN_TRACER_NAME,
};
use crate::Result;

/// Route table every inbound connection manager is bound to
pub const INBOUND_ROUTE_CONFIG_NAME: &str = "RDS_Inbound";
/// Route table every outbound connection manager is bound to
pub const OUTBOUND_ROUTE_CONFIG_NAME: &str = "RDS_Outbound";

const STAT_PREFIX: &str = "mesh-http-conn-manager";

/// Direction-specific route table a connection manager is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTable {
    Inbound,
    Outbound,
}

impl RouteTable {
    pub fn config_name(self) -> &'static str {
        match self {
            RouteTable::Inbound => INBOUND_ROUTE_CONFIG_NAME,
            RouteTable::Outbound => OUTBOUND_ROUTE_CONFIG_NAME,
        }
    }
}

/// Produces the HTTP connection manager for a filter chain.
///
/// `target` names the proxy or destination the filter is built for and is
/// carried into errors.
pub trait ConnectionManagerFactory: Send + Sync {
    fn connection_manager(&self, route_table: RouteTable, target: &str)
        -> Result<HttpConnectionManager>;

    /// Build and serialize the connection manager into its opaque payload
    fn typed_config(&self, route_table: RouteTable, target: &str) -> Result<Any> {
        let hcm = self.connection_manager(route_table, target)?;
        encode_any(HTTP_CONNECTION_MANAGER_TYPE_URL, &hcm, target)
    }
}

/// Connection manager factory driven by the mesh configuration snapshot
#[derive(Debug, Clone)]
pub struct MeshConnectionManagerFactory {
    config: Arc<MeshConfig>,
}

impl MeshConnectionManagerFactory {
    pub fn new(config: Arc<MeshConfig>) -> Self {
        Self { config }
    }

    fn router_filter(&self, target: &str) -> Result<HttpFilter> {
        Ok(HttpFilter {
            name: ROUTER_FILTER_NAME.to_string(),
            config_type: Some(HttpFilterConfigType::TypedConfig(encode_any(
                ROUTER_TYPE_URL,
                &Router::default(),
                target,
            )?)),
            ..Default::default()
        })
    }

    fn access_log(&self, path: &str, target: &str) -> Result<AccessLog> {
        let file_log = FileAccessLog { path: path.to_string(), access_log_format: None };

        Ok(AccessLog {
            name: FILE_ACCESS_LOG_NAME.to_string(),
            filter: None,
            config_type: Some(AccessLogConfigType::TypedConfig(encode_any(
                FILE_ACCESS_LOG_TYPE_URL,
                &file_log,
                target,
            )?)),
        })
    }

    fn tracing(&self, target: &str) -> Result<Tracing> {
        let tracing_config = &self.config.tracing;
        let zipkin = ZipkinConfig {
            collector_cluster: tracing_config.collector_cluster.clone(),
            collector_endpoint: tracing_config.collector_endpoint.clone(),
            collector_endpoint_version: CollectorEndpointVersion::HttpJson as i32,
            ..Default::default()
        };

        let provider = trace_provider::Http {
            name: ZIPKIN_TRACER_NAME.to_string(),
            config_type: Some(trace_provider::http::ConfigType::TypedConfig(encode_any(
                ZIPKIN_CONFIG_TYPE_URL,
                &zipkin,
                target,
            )?)),
        };

        Ok(Tracing { provider: Some(provider), ..Default::default() })
    }
}

impl ConnectionManagerFactory for MeshConnectionManagerFactory {
    fn connection_manager(
        &self,
        route_table: RouteTable,
        target: &str,
    ) -> Result<HttpConnectionManager> {
        let route_config_name = route_table.config_name();

        let mut hcm = HttpConnectionManager {
            stat_prefix: format!("{}.{}", STAT_PREFIX, route_config_name),
            codec_type: CodecType::Auto as i32,
            http_filters: vec![self.router_filter(target)?],
            route_specifier: Some(RouteSpecifier::Rds(Rds {
                config_source: Some(ads_config_source()),
                route_config_name: route_config_name.to_string(),
            })),
            ..Default::default()
        };

        if let Some(path) = &self.config.access_log_path {
            hcm.access_log = vec![self.access_log(path, target)?];
        }

        if self.config.tracing.enable {
            hcm.generate_request_id = Some(BoolValue { value: true });
            hcm.tracing = Some(self.tracing(target)?);
        }

        Ok(hcm)
    }
}
