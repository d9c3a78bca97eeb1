//! Implementation of the `seed distribute` command.
//!
//! Loads the private key, parses the manifest and writes the encoded cluster
//! configuration to every node over ssh. Every node is attempted; the command
//! fails afterwards if any node did not receive the configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use tracing::info;

use clusterseed_lib::codec::encode;
use clusterseed_lib::credential::Credential;
use clusterseed_lib::manifest::load_manifest;
use clusterseed_lib::remote::{DistributeOptions, SshConnector, distribute};
use clusterseed_lib::topology::{ClusterPorts, build_topology};

use crate::output::{format_duration, print_error, print_stat, print_success, print_warning, symbols};

/// Arguments of the distribute command.
pub struct DistributeArgs {
  pub manifest: PathBuf,
  pub pvt_key: PathBuf,
  pub ports: ClusterPorts,
  pub remote_path: String,
  pub parallelism: usize,
  pub timeout: Duration,
  pub connect_timeout: Duration,
  pub ssh_program: String,
}

/// Execute the distribute command.
///
/// The key and the manifest are both validated before the first connection
/// is opened.
///
/// # Errors
///
/// Returns an error if the key or manifest is invalid, or if distribution
/// failed on at least one node.
pub fn cmd_distribute(args: DistributeArgs) -> Result<()> {
  let start = Instant::now();

  let credential = Credential::load(&args.pvt_key)
    .with_context(|| format!("Failed to load private key: {}", args.pvt_key.display()))?;

  let nodes = load_manifest(&args.manifest)
    .with_context(|| format!("Failed to parse manifest: {}", args.manifest.display()))?;
  super::log_discovered(&nodes);
  info!("authentication via ssh keys only");

  if nodes.is_empty() {
    print_warning("No nodes in manifest, nothing to distribute");
    return Ok(());
  }

  let config = build_topology(&nodes, args.ports);
  let payload: Arc<[u8]> = encode(&config).context("Failed to encode cluster config")?.into();

  let connector = SshConnector::new()
    .with_program(args.ssh_program)
    .with_connect_timeout(args.connect_timeout);
  let options = DistributeOptions {
    remote_path: args.remote_path,
    parallelism: args.parallelism,
    node_timeout: Some(args.timeout),
  };

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(distribute(
    &nodes,
    Arc::new(credential),
    payload,
    &options,
    Arc::new(connector),
  ));

  for outcome in &report.outcomes {
    match &outcome.result {
      Ok(()) => println!(
        "  {} {} {} {}",
        symbols::SUCCESS.green(),
        outcome.name,
        symbols::ARROW.dimmed(),
        outcome.destination
      ),
      Err(e) => print_error(&format!("{} ({}): {}", outcome.name, outcome.destination, e)),
    }
  }

  let failed = report.len() - report.succeeded();

  println!();
  if failed == 0 {
    print_success(&format!("Distributed cluster config to {} node(s)", report.len()));
  }
  print_stat("Remote path", &options.remote_path);
  print_stat("Succeeded", &report.succeeded().to_string());
  print_stat("Failed", &failed.to_string());
  print_stat("Duration", &format_duration(start.elapsed()));

  if failed > 0 {
    let names: Vec<_> = report.failures().map(|o| o.name.as_str()).collect();
    bail!(
      "Distribution failed on {} of {} node(s): {}",
      failed,
      report.len(),
      names.join(", ")
    );
  }

  Ok(())
}
