//! Implementation of the `seed show` command.
//!
//! Decodes a configuration file and prints every node with the endpoints its
//! peers and clients will use.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use clusterseed_lib::codec::read_config;
use clusterseed_lib::topology::ClusterNode;

use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success, symbols};

#[derive(Serialize)]
struct NodeView<'a> {
  #[serde(flatten)]
  node: &'a ClusterNode,
  raft_addr: String,
  db_addr: String,
}

pub fn cmd_show(path: &Path, format: OutputFormat) -> Result<()> {
  let config = read_config(path).with_context(|| format!("Failed to read config: {}", path.display()))?;

  let nodes: Vec<_> = config
    .nodes()
    .iter()
    .map(|node| NodeView {
      node,
      raft_addr: node.raft_addr(),
      db_addr: node.db_addr(),
    })
    .collect();

  if format.is_json() {
    return print_json(&serde_json::json!({ "nodes": nodes }));
  }

  let Some(ports) = config.ports() else {
    print_info(&format!("No nodes in {}", path.display()));
    return Ok(());
  };

  print_success(&format!("{} node(s) in {}", config.len(), path.display()));
  print_stat("Raft port", &ports.raft_port.to_string());
  print_stat("DB port", &ports.db_port.to_string());
  println!();

  for view in &nodes {
    println!(
      "  {} [{}] {} raft={} db={} login={}@{}",
      symbols::INFO,
      view.node.id,
      view.node.name,
      view.raft_addr,
      view.db_addr,
      view.node.username,
      view.node.hostname
    );
  }

  Ok(())
}
