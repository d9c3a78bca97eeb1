//! SSH-backed remote channels.
//!
//! Channels are driven through the system `ssh` client in batch mode, so no
//! prompt can ever block a run. Opening a channel runs a no-op command on the
//! node; this surfaces connection and authentication failures separately from
//! failures of the write itself.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::consts::DEFAULT_SSH_PROGRAM;
use crate::credential::Credential;
use crate::manifest::NodeDescriptor;

use super::types::{ExecOutput, RemoteChannel, RemoteConnector, RemoteError};

/// Exit status `ssh` reserves for its own failures.
const SSH_ERROR_CODE: i32 = 255;

/// Opens channels by invoking an `ssh` client binary.
#[derive(Debug, Clone)]
pub struct SshConnector {
  program: String,
  connect_timeout: Duration,
}

impl Default for SshConnector {
  fn default() -> Self {
    Self {
      program: DEFAULT_SSH_PROGRAM.to_string(),
      connect_timeout: Duration::from_secs(10),
    }
  }
}

impl SshConnector {
  pub fn new() -> Self {
    Self::default()
  }

  /// Use a different client binary.
  pub fn with_program(mut self, program: impl Into<String>) -> Self {
    self.program = program.into();
    self
  }

  /// Limit how long the client waits for the TCP connection.
  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }
}

#[async_trait]
impl RemoteConnector for SshConnector {
  async fn connect(
    &self,
    node: &NodeDescriptor,
    credential: &Credential,
  ) -> Result<Box<dyn RemoteChannel>, RemoteError> {
    let channel = SshChannel {
      program: self.program.clone(),
      args: ssh_args(node, credential.path(), self.connect_timeout),
      destination: node.destination(),
    };

    debug!(destination = %channel.destination, program = %channel.program, "probing ssh channel");

    let output = channel.run("true", None).await?;
    if !output.success() {
      return Err(RemoteError::ConnectFailed {
        destination: channel.destination,
        code: output.code,
        stderr: output.stderr,
      });
    }

    Ok(Box::new(channel))
  }
}

/// A channel to one node; every command is a separate client invocation.
#[derive(Debug)]
pub struct SshChannel {
  program: String,
  args: Vec<String>,
  destination: String,
}

impl SshChannel {
  async fn run(&self, command: &str, stdin: Option<&[u8]>) -> Result<ExecOutput, RemoteError> {
    let mut child = Command::new(&self.program)
      .args(&self.args)
      .arg(command)
      .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| RemoteError::Spawn {
        program: self.program.clone(),
        source,
      })?;

    let pipe = child.stdin.take();
    let feed = async move {
      if let (Some(mut pipe), Some(bytes)) = (pipe, stdin) {
        pipe.write_all(bytes).await?;
        pipe.shutdown().await?;
      }
      Ok::<(), std::io::Error>(())
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output?;

    let result = ExecOutput {
      code: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    // A client that exits early closes its stdin; its exit status is the
    // more useful error.
    if result.success() {
      fed?;
    }

    Ok(result)
  }
}

#[async_trait]
impl RemoteChannel for SshChannel {
  async fn exec(&mut self, command: &str, stdin: &[u8]) -> Result<ExecOutput, RemoteError> {
    debug!(destination = %self.destination, command = %command, bytes = stdin.len(), "executing remote command");

    let output = self.run(command, Some(stdin)).await?;

    if output.code == Some(SSH_ERROR_CODE) {
      return Err(RemoteError::ConnectFailed {
        destination: self.destination.clone(),
        code: output.code,
        stderr: output.stderr,
      });
    }

    Ok(output)
  }
}

/// Client arguments for reaching `node` with the given identity file.
///
/// The remote command is appended after these. Options end at `--`, so a
/// destination can never be read as one.
pub fn ssh_args(node: &NodeDescriptor, identity: &Path, connect_timeout: Duration) -> Vec<String> {
  vec![
    "-i".to_string(),
    identity.display().to_string(),
    "-p".to_string(),
    node.login_port.to_string(),
    "-o".to_string(),
    "BatchMode=yes".to_string(),
    "-o".to_string(),
    "IdentitiesOnly=yes".to_string(),
    "-o".to_string(),
    "StrictHostKeyChecking=accept-new".to_string(),
    "-o".to_string(),
    format!("ConnectTimeout={}", connect_timeout.as_secs().max(1)),
    "--".to_string(),
    node.destination(),
  ]
}

/// Quote `value` for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
  let safe = !value.is_empty()
    && value
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | ':' | ',' | '@' | '%' | '='));

  if safe {
    value.to_string()
  } else {
    format!("'{}'", value.replace('\'', r"'\''"))
  }
}
