//! Cluster topology.
//!
//! Turns the ordered node descriptors of a manifest into the cluster
//! configuration table: every node gets its position as `id` and the same
//! cluster-wide raft and database ports.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::{DEFAULT_DB_PORT, DEFAULT_RAFT_PORT};
use crate::manifest::NodeDescriptor;

/// Ports shared by every node of the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterPorts {
  pub raft_port: u16,
  pub db_port: u16,
}

impl Default for ClusterPorts {
  fn default() -> Self {
    Self {
      raft_port: DEFAULT_RAFT_PORT,
      db_port: DEFAULT_DB_PORT,
    }
  }
}

/// One row of the configuration table.
///
/// Field order is the column order of the encoded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
  pub name: String,
  pub intf_ip: String,
  pub host_ip: String,
  pub hostname: String,
  pub username: String,
  pub id: usize,
  pub raft_port: u16,
  pub db_port: u16,
}

impl ClusterNode {
  /// Address peers use for raft traffic.
  pub fn raft_addr(&self) -> String {
    format!("{}:{}", self.intf_ip, self.raft_port)
  }

  /// Address clients use for the database service.
  pub fn db_addr(&self) -> String {
    format!("{}:{}", self.intf_ip, self.db_port)
  }
}

/// The complete, immutable configuration table.
///
/// Invariants: ids are `0..len` in row order and every row carries the same
/// raft and database ports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterConfig {
  nodes: Vec<ClusterNode>,
}

impl ClusterConfig {
  /// Column schema of the table, independent of how many rows it has.
  pub const COLUMNS: [&'static str; 8] = [
    "name",
    "intf_ip",
    "host_ip",
    "hostname",
    "username",
    "id",
    "raft_port",
    "db_port",
  ];

  /// Assemble a table from rows that are already known to be consistent.
  pub(crate) fn from_rows(nodes: Vec<ClusterNode>) -> Self {
    Self { nodes }
  }

  pub fn nodes(&self) -> &[ClusterNode] {
    &self.nodes
  }

  /// Cluster-wide ports, or `None` for an empty table.
  pub fn ports(&self) -> Option<ClusterPorts> {
    self.nodes.first().map(|n| ClusterPorts {
      raft_port: n.raft_port,
      db_port: n.db_port,
    })
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Look up a row by its node name.
  pub fn node(&self, name: &str) -> Option<&ClusterNode> {
    self.nodes.iter().find(|n| n.name == name)
  }
}

/// Build the configuration table for the given nodes.
///
/// Rows keep the input order; `id` is the zero-based position.
pub fn build_topology(nodes: &[NodeDescriptor], ports: ClusterPorts) -> ClusterConfig {
  let rows = nodes
    .iter()
    .enumerate()
    .map(|(id, node)| ClusterNode {
      name: node.name.clone(),
      intf_ip: node.intf_ip.clone(),
      host_ip: node.host_ip.clone(),
      hostname: node.hostname.clone(),
      username: node.username.clone(),
      id,
      raft_port: ports.raft_port,
      db_port: ports.db_port,
    })
    .collect::<Vec<_>>();

  info!(
    nodes = rows.len(),
    raft_port = ports.raft_port,
    db_port = ports.db_port,
    "built cluster topology"
  );

  ClusterConfig::from_rows(rows)
}
