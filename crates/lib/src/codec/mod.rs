//! Configuration artifact encoding.
//!
//! The cluster configuration table is stored as CSV: a header row naming every
//! column followed by one row per node, in table order. The header is written
//! even when the table has no rows.
//!
//! ```text
//! name,intf_ip,host_ip,hostname,username,id,raft_port,db_port
//! n0,10.0.0.1,128.110.96.1,pc1.example.org,alice,0,8080,12345
//! n1,10.0.0.2,128.110.96.2,pc2.example.org,bob,1,8080,12345
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::topology::{ClusterConfig, ClusterNode};

/// Errors that can occur while encoding, decoding or storing an artifact.
#[derive(Debug, Error)]
pub enum CodecError {
  /// The CSV layer rejected a record.
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  /// I/O error while producing the encoded bytes.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The header row does not match the configuration schema.
  #[error("unexpected header `{found}`, expected `{expected}`")]
  UnexpectedHeader { found: String, expected: String },

  /// Row ids are not the dense sequence `0..n`.
  #[error("row {row}: expected id {row}, found {id}")]
  NonSequentialId { row: usize, id: usize },

  /// A row disagrees with the cluster-wide ports of the first row.
  #[error("row {row}: ports {raft_port}/{db_port} differ from cluster ports {expected_raft}/{expected_db}")]
  MixedPorts {
    row: usize,
    raft_port: u16,
    db_port: u16,
    expected_raft: u16,
    expected_db: u16,
  },

  /// Reading an artifact from disk failed.
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Writing an artifact to disk failed.
  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Encode a configuration table as CSV bytes.
pub fn encode(config: &ClusterConfig) -> Result<Vec<u8>, CodecError> {
  let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());

  writer.write_record(ClusterConfig::COLUMNS)?;
  for node in config.nodes() {
    writer.serialize(node)?;
  }

  let bytes = writer.into_inner().map_err(|e| CodecError::Io(e.into_error()))?;
  debug!(rows = config.len(), bytes = bytes.len(), "encoded cluster config");
  Ok(bytes)
}

/// Decode CSV bytes back into a configuration table.
///
/// The header must match [`ClusterConfig::COLUMNS`] exactly, and the rows must
/// satisfy the table invariants (sequential ids, uniform ports).
pub fn decode(bytes: &[u8]) -> Result<ClusterConfig, CodecError> {
  let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes);

  let headers = reader.headers()?;
  if !headers.iter().eq(ClusterConfig::COLUMNS) {
    return Err(CodecError::UnexpectedHeader {
      found: headers.iter().collect::<Vec<_>>().join(","),
      expected: ClusterConfig::COLUMNS.join(","),
    });
  }

  let mut nodes: Vec<ClusterNode> = Vec::new();
  for (row, record) in reader.deserialize::<ClusterNode>().enumerate() {
    let node = record?;

    if node.id != row {
      return Err(CodecError::NonSequentialId { row, id: node.id });
    }

    if let Some(first) = nodes.first() {
      if node.raft_port != first.raft_port || node.db_port != first.db_port {
        return Err(CodecError::MixedPorts {
          row,
          raft_port: node.raft_port,
          db_port: node.db_port,
          expected_raft: first.raft_port,
          expected_db: first.db_port,
        });
      }
    }

    nodes.push(node);
  }

  Ok(ClusterConfig::from_rows(nodes))
}

/// Encode a table and write it to `path`.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so readers never observe a partially written artifact.
pub fn write_config(path: &Path, config: &ClusterConfig) -> Result<(), CodecError> {
  let bytes = encode(config)?;

  let write_err = |source: std::io::Error| CodecError::Write {
    path: path.to_path_buf(),
    source,
  };

  let parent = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };
  std::fs::create_dir_all(parent).map_err(write_err)?;

  let mut temp = NamedTempFile::new_in(parent).map_err(write_err)?;
  temp.write_all(&bytes).map_err(write_err)?;
  temp.persist(path).map_err(|e| write_err(e.error))?;

  info!(path = %path.display(), rows = config.len(), "wrote cluster config");
  Ok(())
}

/// Read and decode an artifact from `path`.
pub fn read_config(path: &Path) -> Result<ClusterConfig, CodecError> {
  let bytes = std::fs::read(path).map_err(|source| CodecError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  decode(&bytes)
}
