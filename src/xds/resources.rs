//! Well-known Envoy names, type URLs, and typed-payload encoding shared by the
//! listener builders.

use envoy_types::pb::envoy::config::core::v3::{
    config_source::ConfigSourceSpecifier, AggregatedConfigSource, ApiVersion, ConfigSource,
};
use envoy_types::pb::google::protobuf::Any;
use prost::Message;
use tracing::{debug, error};

use crate::{Error, Result};

pub const HTTP_CONNECTION_MANAGER_FILTER_NAME: &str =
    "envoy.filters.network.http_connection_manager";
pub const HTTP_CONNECTION_MANAGER_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";

pub const TLS_TRANSPORT_SOCKET_NAME: &str = "envoy.transport_sockets.tls";
pub const DOWNSTREAM_TLS_CONTEXT_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.DownstreamTlsContext";

/// Envoy's canonical router filter name
pub const ROUTER_FILTER_NAME: &str = "envoy.filters.http.router";
pub const ROUTER_TYPE_URL: &str = "type.googleapis.com/envoy.extensions.filters.http.router.v3.Router";

pub const FILE_ACCESS_LOG_NAME: &str = "envoy.access_loggers.file";
pub const FILE_ACCESS_LOG_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.access_loggers.file.v3.FileAccessLog";

pub const ZIPKIN_TRACER_NAME: &str = "envoy.tracers.zipkin";
pub const ZIPKIN_CONFIG_TYPE_URL: &str = "type.googleapis.com/envoy.config.trace.v3.ZipkinConfig";

/// Short message name of a type URL, e.g. `DownstreamTlsContext`
pub fn message_name(type_url: &str) -> &str {
    type_url.rsplit('.').next().unwrap_or(type_url)
}

/// Encode `message` into a typed `Any` payload.
///
/// `target` is the proxy or destination the payload is built for and is only
/// used to attribute failures.
pub fn encode_any<M: Message>(type_url: &str, message: &M, target: &str) -> Result<Any> {
    let mut value = Vec::with_capacity(message.encoded_len());
    message.encode(&mut value).map_err(|e| {
        error!(
            resource = message_name(type_url),
            identity = target,
            error = %e,
            "Error marshalling payload"
        );
        Error::serialization_with_source(message_name(type_url), target, Box::new(e))
    })?;

    debug!(
        resource = message_name(type_url),
        identity = target,
        bytes = value.len(),
        "Encoded payload"
    );
    Ok(Any { type_url: type_url.to_string(), value })
}

/// Config source pointing at the aggregated discovery stream
pub fn ads_config_source() -> ConfigSource {
    ConfigSource {
        config_source_specifier: Some(ConfigSourceSpecifier::Ads(AggregatedConfigSource::default())),
        resource_api_version: ApiVersion::V3 as i32,
        ..Default::default()
    }
}
