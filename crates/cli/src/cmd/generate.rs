//! Implementation of the `seed generate` command.
//!
//! Parses a manifest, builds the cluster configuration table and writes it
//! to a local file.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use clusterseed_lib::codec::write_config;
use clusterseed_lib::manifest::load_manifest;
use clusterseed_lib::topology::{ClusterPorts, build_topology};

use crate::output::{format_duration, print_stat, print_success};

/// Execute the generate command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be parsed or the output file
/// cannot be written. Nothing is written when parsing fails.
pub fn cmd_generate(manifest: &Path, ports: ClusterPorts, output: &Path) -> Result<()> {
  let start = Instant::now();

  let nodes =
    load_manifest(manifest).with_context(|| format!("Failed to parse manifest: {}", manifest.display()))?;
  super::log_discovered(&nodes);

  let config = build_topology(&nodes, ports);
  write_config(output, &config).with_context(|| format!("Failed to write config: {}", output.display()))?;

  print_success(&format!("Wrote cluster config for {} node(s)", config.len()));
  print_stat("Path", &output.display().to_string());
  print_stat("Raft port", &ports.raft_port.to_string());
  print_stat("DB port", &ports.db_port.to_string());
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
