//! Remote distribution of the configuration artifact.
//!
//! For every node of the table, opens an authenticated channel and writes the
//! encoded configuration to the destination path. Each node is independent:
//! a failure is recorded in that node's [`NodeOutcome`] and never stops the
//! remaining nodes. The caller decides what a partial failure means.
//!
//! Nodes are handled one at a time unless [`DistributeOptions::parallelism`]
//! allows more; the report is in table order either way.

pub mod ssh;
mod types;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::credential::Credential;
use crate::manifest::NodeDescriptor;

pub use ssh::{SshChannel, SshConnector, shell_quote};
pub use types::*;

/// Distribute `payload` to every node.
///
/// # Arguments
///
/// * `nodes` - Nodes in table order
/// * `credential` - Key used to authenticate every channel
/// * `payload` - Encoded configuration, written unchanged to each node
/// * `options` - Where to write and how nodes are scheduled
/// * `connector` - Opens the per-node channels
///
/// # Returns
///
/// One outcome per node, in the order of `nodes`.
pub async fn distribute(
  nodes: &[NodeDescriptor],
  credential: Arc<Credential>,
  payload: Arc<[u8]>,
  options: &DistributeOptions,
  connector: Arc<dyn RemoteConnector>,
) -> DistributionReport {
  info!(
    nodes = nodes.len(),
    remote_path = %options.remote_path,
    parallelism = options.parallelism,
    "starting distribution"
  );

  let command: Arc<str> = write_command(&options.remote_path).into();
  debug!(command = %command, "remote write command");

  let outcomes = if options.parallelism <= 1 {
    let mut outcomes = Vec::with_capacity(nodes.len());
    for node in nodes {
      let outcome = distribute_node(
        node,
        &credential,
        &payload,
        &command,
        options.node_timeout,
        connector.as_ref(),
      )
      .await;
      outcomes.push(outcome);
    }
    outcomes
  } else {
    distribute_concurrently(nodes, credential, payload, command, options, connector).await
  };

  let report = DistributionReport { outcomes };

  info!(
    succeeded = report.succeeded(),
    failed = report.len() - report.succeeded(),
    "distribution complete"
  );

  report
}

/// Shell command that atomically replaces `remote_path` with its stdin.
pub fn write_command(remote_path: &str) -> String {
  let path = shell_quote(remote_path);
  let temp = shell_quote(&format!("{}.tmp", remote_path));

  match Path::new(remote_path).parent().filter(|p| !p.as_os_str().is_empty()) {
    Some(dir) => format!(
      "mkdir -p {} && cat > {} && mv -f {} {}",
      shell_quote(&dir.display().to_string()),
      temp,
      temp,
      path
    ),
    None => format!("cat > {} && mv -f {} {}", temp, temp, path),
  }
}

async fn distribute_concurrently(
  nodes: &[NodeDescriptor],
  credential: Arc<Credential>,
  payload: Arc<[u8]>,
  command: Arc<str>,
  options: &DistributeOptions,
  connector: Arc<dyn RemoteConnector>,
) -> Vec<NodeOutcome> {
  // Bounded by the node count and by tokio's permit limit.
  let permits = options.parallelism.min(nodes.len()).min(Semaphore::MAX_PERMITS);
  let semaphore = Arc::new(Semaphore::new(permits));
  let mut join_set = JoinSet::new();

  for (index, node) in nodes.iter().enumerate() {
    let node = node.clone();
    let credential = credential.clone();
    let payload = payload.clone();
    let command = command.clone();
    let connector = connector.clone();
    let semaphore = semaphore.clone();
    let timeout = options.node_timeout;

    join_set.spawn(async move {
      let outcome = match semaphore.acquire().await {
        Ok(_permit) => distribute_node(&node, &credential, &payload, &command, timeout, connector.as_ref()).await,
        Err(e) => NodeOutcome {
          name: node.name.clone(),
          destination: node.destination(),
          result: Err(RemoteError::Task(e.to_string())),
        },
      };
      (index, outcome)
    });
  }

  let mut slots: Vec<Option<NodeOutcome>> = nodes.iter().map(|_| None).collect();

  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok((index, outcome)) => slots[index] = Some(outcome),
      Err(e) => error!(error = %e, "distribution task failed"),
    }
  }

  slots
    .into_iter()
    .zip(nodes)
    .map(|(slot, node)| {
      slot.unwrap_or_else(|| NodeOutcome {
        name: node.name.clone(),
        destination: node.destination(),
        result: Err(RemoteError::Task("task did not complete".to_string())),
      })
    })
    .collect()
}

async fn distribute_node(
  node: &NodeDescriptor,
  credential: &Credential,
  payload: &[u8],
  command: &str,
  timeout: Option<Duration>,
  connector: &dyn RemoteConnector,
) -> NodeOutcome {
  let destination = node.destination();
  info!(node = %node.name, destination = %destination, "distributing config");

  let work = write_to_node(node, credential, payload, command, connector);
  let result = match timeout {
    Some(limit) => tokio::time::timeout(limit, work)
      .await
      .unwrap_or_else(|_| Err(RemoteError::Timeout(limit))),
    None => work.await,
  };

  match &result {
    Ok(()) => info!(node = %node.name, "config written"),
    Err(e) => error!(node = %node.name, destination = %destination, error = %e, "distribution failed"),
  }

  NodeOutcome {
    name: node.name.clone(),
    destination,
    result,
  }
}

async fn write_to_node(
  node: &NodeDescriptor,
  credential: &Credential,
  payload: &[u8],
  command: &str,
  connector: &dyn RemoteConnector,
) -> Result<(), RemoteError> {
  let mut channel = connector.connect(node, credential).await?;
  let output = channel.exec(command, payload).await?;

  if !output.success() {
    return Err(RemoteError::CommandFailed {
      command: command.to_string(),
      code: output.code,
      stderr: output.stderr,
    });
  }

  Ok(())
}
