//! Human-readable summaries of generated filter chains.
//!
//! Opaque payloads are reported by type URL and size only.

use envoy_types::pb::envoy::config::core::v3::transport_socket::ConfigType as TransportSocketConfigType;
use envoy_types::pb::envoy::config::listener::v3::{filter::ConfigType as FilterConfigType, FilterChain};
use serde::{Deserialize, Serialize};

/// Summary of one filter chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterChainSummary {
    pub name: String,
    #[serde(rename = "match")]
    pub filter_chain_match: Option<MatchSummary>,
    pub filters: Vec<PayloadSummary>,
    pub transport_socket: Option<PayloadSummary>,
}

/// Predicates of a filter chain match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub server_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transport_protocol: Option<String>,
    pub application_protocols: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub prefix_ranges: Vec<String>,
}

/// A named filter or transport socket and its typed payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSummary {
    pub name: String,
    pub type_url: Option<String>,
    pub bytes: usize,
}

impl From<&FilterChain> for FilterChainSummary {
    fn from(chain: &FilterChain) -> Self {
        let filter_chain_match = chain.filter_chain_match.as_ref().map(|m| MatchSummary {
            server_names: m.server_names.clone(),
            transport_protocol: Some(m.transport_protocol.clone()).filter(|p| !p.is_empty()),
            application_protocols: m.application_protocols.clone(),
            prefix_ranges: m
                .prefix_ranges
                .iter()
                .map(|range| match &range.prefix_len {
                    Some(len) => format!("{}/{}", range.address_prefix, len.value),
                    None => range.address_prefix.clone(),
                })
                .collect(),
        });

        let filters = chain
            .filters
            .iter()
            .map(|filter| {
                let typed = match &filter.config_type {
                    Some(FilterConfigType::TypedConfig(any)) => Some(any),
                    _ => None,
                };
                PayloadSummary {
                    name: filter.name.clone(),
                    type_url: typed.map(|any| any.type_url.clone()),
                    bytes: typed.map_or(0, |any| any.value.len()),
                }
            })
            .collect();

        let transport_socket = chain.transport_socket.as_ref().map(|socket| {
            let typed = match &socket.config_type {
                Some(TransportSocketConfigType::TypedConfig(any)) => Some(any),
                _ => None,
            };
            PayloadSummary {
                name: socket.name.clone(),
                type_url: typed.map(|any| any.type_url.clone()),
                bytes: typed.map_or(0, |any| any.value.len()),
            }
        });

        Self { name: chain.name.clone(), filter_chain_match, filters, transport_socket }
    }
}
