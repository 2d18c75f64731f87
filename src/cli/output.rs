//! Output formatting for CLI commands
//!
//! Filter chain summaries can be printed as JSON, YAML, or a table.

use anyhow::{Context, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::xds::FilterChainSummary;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.",
                s
            ),
        }
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize>(data: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;
    println!("{}", yaml);
    Ok(())
}

/// Print filter chain summaries in the requested format
pub fn print_chains(chains: &[FilterChainSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&chains),
        OutputFormat::Yaml => print_yaml(&chains),
        OutputFormat::Table => {
            print!("{}", render_chain_table(chains));
            Ok(())
        }
    }
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

const COLUMNS: [(&str, usize); 4] =
    [("NAME", 48), ("SERVER NAMES", 40), ("ALPN", 20), ("PREFIX RANGES", 36)];

fn render_chain_table(chains: &[FilterChainSummary]) -> String {
    let mut out = String::new();
    let width: usize = COLUMNS.iter().map(|(_, w)| w + 1).sum();

    for (title, w) in COLUMNS {
        out.push_str(&format!("{:<w$} ", title, w = w));
    }
    out.push('\n');
    out.push_str(&"-".repeat(width));
    out.push('\n');

    for chain in chains {
        let (server_names, alpn, prefixes) = match &chain.filter_chain_match {
            Some(m) => (
                m.server_names.join(","),
                m.application_protocols.join(","),
                m.prefix_ranges.join(","),
            ),
            None => Default::default(),
        };

        let cells = [&chain.name, &server_names, &alpn, &prefixes];
        for (cell, (_, w)) in cells.iter().zip(COLUMNS) {
            out.push_str(&format!("{:<w$} ", truncate(cell, w), w = w));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xds::summary::MatchSummary;

    #[test]
    fn test_parse_output_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("outbound-mesh-http-filter-chain", 10), "outboun...");
    }

    #[test]
    fn test_table_contains_chain_rows() {
        let chains = vec![FilterChainSummary {
            name: "inbound-mesh-filter-chain".to_string(),
            filter_chain_match: Some(MatchSummary {
                server_names: vec!["bookstore.default.svc.cluster.local".to_string()],
                transport_protocol: Some("tls".to_string()),
                application_protocols: vec!["osm".to_string()],
                prefix_ranges: vec![],
            }),
            filters: vec![],
            transport_socket: None,
        }];

        let table = render_chain_table(&chains);
        assert!(table.starts_with("NAME"));
        assert!(table.contains("inbound-mesh-filter-chain"));
        assert!(table.contains("bookstore.default.svc.cluster.local"));
        assert_eq!(table.lines().count(), 3);
    }
}
