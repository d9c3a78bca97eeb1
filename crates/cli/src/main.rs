mod cmd;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clusterseed_lib::consts::{
  DEFAULT_CONFIG_FILENAME, DEFAULT_DB_PORT, DEFAULT_RAFT_PORT, DEFAULT_REMOTE_CONFIG_PATH, DEFAULT_SSH_PROGRAM,
};
use clusterseed_lib::topology::ClusterPorts;

use crate::cmd::DistributeArgs;
use crate::output::OutputFormat;

/// seed - cluster configuration from testbed manifests
#[derive(Parser)]
#[command(name = "seed")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Write the cluster configuration for a manifest to a local file
  Generate {
    /// Manifest describing the allocated nodes
    #[arg(long)]
    manifest: PathBuf,

    /// Raft port shared by every node
    #[arg(long, default_value_t = DEFAULT_RAFT_PORT)]
    raft_port: u16,

    /// Database port shared by every node
    #[arg(long, default_value_t = DEFAULT_DB_PORT)]
    db_port: u16,

    /// Output file
    #[arg(long, default_value = DEFAULT_CONFIG_FILENAME)]
    output: PathBuf,
  },

  /// Push the cluster configuration to every node of a manifest
  Distribute {
    /// Manifest describing the allocated nodes
    #[arg(long)]
    manifest: PathBuf,

    /// Private key (file) used to log in to the nodes
    #[arg(long)]
    pvt_key: PathBuf,

    /// Raft port shared by every node
    #[arg(long, default_value_t = DEFAULT_RAFT_PORT)]
    raft_port: u16,

    /// Database port shared by every node
    #[arg(long, default_value_t = DEFAULT_DB_PORT)]
    db_port: u16,

    /// Destination of the configuration on every node
    #[arg(long, default_value = DEFAULT_REMOTE_CONFIG_PATH)]
    remote_path: String,

    /// Number of nodes to configure at once
    #[arg(long, default_value_t = 1)]
    parallelism: usize,

    /// Give up on a node after this long (e.g. 30s, 2m)
    #[arg(long, default_value = "60s", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// TCP connect timeout passed to the ssh client
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    connect_timeout: Duration,

    /// ssh client binary
    #[arg(long, default_value = DEFAULT_SSH_PROGRAM)]
    ssh_program: String,
  },

  /// Decode a configuration file and print the cluster table
  Show {
    /// Configuration file to read
    #[arg(default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Generate {
      manifest,
      raft_port,
      db_port,
      output,
    } => cmd::cmd_generate(&manifest, ClusterPorts { raft_port, db_port }, &output),
    Commands::Distribute {
      manifest,
      pvt_key,
      raft_port,
      db_port,
      remote_path,
      parallelism,
      timeout,
      connect_timeout,
      ssh_program,
    } => cmd::cmd_distribute(DistributeArgs {
      manifest,
      pvt_key,
      ports: ClusterPorts { raft_port, db_port },
      remote_path,
      parallelism,
      timeout,
      connect_timeout,
      ssh_program,
    }),
    Commands::Show { config, format } => cmd::cmd_show(&config, format),
  }
}
