//! Types for remote distribution.
//!
//! Defines the connector/channel seams the distributor talks to, the error
//! type for per-node failures, and the report returned to the caller.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::consts::DEFAULT_REMOTE_CONFIG_PATH;
use crate::credential::Credential;
use crate::manifest::NodeDescriptor;

/// Errors that can occur while distributing to a single node.
#[derive(Debug, Error)]
pub enum RemoteError {
  /// The local client process could not be started.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// Connecting or authenticating to the node failed.
  #[error("connection to {destination} failed with exit code {code:?}: {stderr}")]
  ConnectFailed {
    destination: String,
    code: Option<i32>,
    stderr: String,
  },

  /// The remote command ran but did not succeed.
  #[error("remote command failed with exit code {code:?}: {stderr}")]
  CommandFailed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },

  /// The node did not finish within the configured limit.
  #[error("timed out after {0:?}")]
  Timeout(Duration),

  /// I/O error while talking to the client process.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The distribution task for this node did not complete.
  #[error("task failed: {0}")]
  Task(String),
}

/// Captured result of a remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl ExecOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// An open command-execution channel to one node.
#[async_trait]
pub trait RemoteChannel: Send {
  /// Run `command` on the node, feeding `stdin` to it.
  async fn exec(&mut self, command: &str, stdin: &[u8]) -> Result<ExecOutput, RemoteError>;
}

/// Opens authenticated channels to nodes.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
  async fn connect(&self, node: &NodeDescriptor, credential: &Credential)
  -> Result<Box<dyn RemoteChannel>, RemoteError>;
}

/// Options for a distribution run.
#[derive(Debug, Clone)]
pub struct DistributeOptions {
  /// Destination of the artifact on every node.
  pub remote_path: String,

  /// Maximum number of nodes handled at once. `1` is strictly sequential.
  pub parallelism: usize,

  /// Upper bound on connect plus write for a single node.
  pub node_timeout: Option<Duration>,
}

impl Default for DistributeOptions {
  fn default() -> Self {
    Self {
      remote_path: DEFAULT_REMOTE_CONFIG_PATH.to_string(),
      parallelism: 1,
      node_timeout: None,
    }
  }
}

/// Result of distributing to one node.
#[derive(Debug)]
pub struct NodeOutcome {
  /// Node name from the manifest.
  pub name: String,
  /// `user@host` the node was reached at.
  pub destination: String,
  pub result: Result<(), RemoteError>,
}

impl NodeOutcome {
  pub fn is_success(&self) -> bool {
    self.result.is_ok()
  }
}

/// Per-node results of a distribution run, in table order.
#[derive(Debug, Default)]
pub struct DistributionReport {
  pub outcomes: Vec<NodeOutcome>,
}

impl DistributionReport {
  /// Returns true if every node received the configuration.
  pub fn is_success(&self) -> bool {
    self.outcomes.iter().all(NodeOutcome::is_success)
  }

  /// Number of nodes that received the configuration.
  pub fn succeeded(&self) -> usize {
    self.outcomes.iter().filter(|o| o.is_success()).count()
  }

  /// Outcomes of nodes that did not receive the configuration.
  pub fn failures(&self) -> impl Iterator<Item = &NodeOutcome> {
    self.outcomes.iter().filter(|o| !o.is_success())
  }

  pub fn len(&self) -> usize {
    self.outcomes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.outcomes.is_empty()
  }
}
