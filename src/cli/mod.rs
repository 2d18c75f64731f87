//! # Command Line Interface
//!
//! Renders the listener filter chains a proxy would receive for a static mesh
//! topology, for inspection and debugging.

pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{MeshConfig, ObservabilityConfig};
use crate::mesh::{MeshService, MeshTopology, StaticEndpointResolver};
use crate::observability::init_logging;
use crate::xds::{FilterChainSummary, ListenerBuilder, OutboundChain};
use output::{print_chains, print_yaml, OutputFormat};

#[derive(Parser)]
#[command(name = "meshline")]
#[command(about = "Sidecar listener filter-chain generator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Mesh configuration file (YAML, TOML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: json, yaml or table
    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render every filter chain for a proxy: inbound, then one per other service
    Render {
        /// Topology snapshot (YAML or JSON)
        #[arg(long)]
        topology: PathBuf,

        /// Proxy identity as <namespace>/<name>
        #[arg(long)]
        proxy: MeshService,
    },

    /// Render only the inbound mTLS chain for a proxy
    Inbound {
        /// Proxy identity as <namespace>/<name>
        #[arg(long)]
        proxy: MeshService,
    },

    /// Render the outbound HTTP chain for a destination
    Outbound {
        /// Topology snapshot (YAML or JSON)
        #[arg(long)]
        topology: PathBuf,

        /// Destination service as <namespace>/<name>
        #[arg(long)]
        destination: MeshService,
    },

    /// Print the effective mesh configuration
    ShowConfig,
}

/// Run CLI commands
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut observability = ObservabilityConfig::from_env();
    if cli.verbose {
        observability.log_level = "debug".to_string();
    }
    // Logs go to stderr so rendered output stays machine readable.
    if let Err(e) = init_logging(&observability) {
        eprintln!("Warning: {}", e);
    }

    let mesh = Arc::new(
        MeshConfig::load(cli.config.as_deref()).context("Failed to load mesh configuration")?,
    );

    match cli.command {
        Commands::Render { topology, proxy } => {
            let topology = load_topology(&topology)?;
            let destinations: Vec<MeshService> =
                topology.services().into_iter().filter(|svc| *svc != proxy).collect();

            let resolver = Arc::new(StaticEndpointResolver::from(&topology));
            let builder = ListenerBuilder::new(mesh, resolver);
            let chains = builder
                .build_filter_chains(&proxy, &destinations)
                .with_context(|| format!("Failed to build filter chains for proxy {}", proxy))?;

            for skipped in &chains.skipped {
                info!(service = %skipped, "Skipped destination without endpoints");
            }

            let summaries: Vec<FilterChainSummary> =
                chains.into_filter_chains().iter().map(FilterChainSummary::from).collect();
            print_chains(&summaries, cli.format)?;
        }
        Commands::Inbound { proxy } => {
            let builder = ListenerBuilder::new(mesh, Arc::new(StaticEndpointResolver::new()));
            let chain = builder
                .build_inbound_chain(&proxy)
                .with_context(|| format!("Failed to build inbound chain for proxy {}", proxy))?;
            print_chains(&[FilterChainSummary::from(&chain)], cli.format)?;
        }
        Commands::Outbound { topology, destination } => {
            let topology = load_topology(&topology)?;
            let resolver = Arc::new(StaticEndpointResolver::from(&topology));
            let builder = ListenerBuilder::new(mesh, resolver);
            match builder
                .build_outbound_chain(&destination)
                .with_context(|| format!("Failed to build outbound chain for {}", destination))?
            {
                OutboundChain::Chain(chain) => {
                    print_chains(&[FilterChainSummary::from(&chain)], cli.format)?
                }
                OutboundChain::NoEndpoints => {
                    eprintln!("No filter chain: {} has no resolvable endpoints", destination);
                }
            }
        }
        Commands::ShowConfig => print_yaml(mesh.as_ref())?,
    }

    Ok(())
}

fn load_topology(path: &std::path::Path) -> anyhow::Result<MeshTopology> {
    MeshTopology::from_file(path)
        .with_context(|| format!("Failed to load topology from {}", path.display()))
}
