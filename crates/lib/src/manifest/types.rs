//! Manifest types for clusterseed.
//!
//! A manifest is the testbed's description of an allocated experiment. Each
//! `node` element is reduced to a [`NodeDescriptor`] carrying the addresses and
//! login coordinates needed to configure and reach that node.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// One allocated cluster member, as described by the manifest.
///
/// Every field is required: a descriptor only exists for a fully specified
/// `node` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
  /// Manifest-assigned `client_id`, unique within a manifest.
  pub name: String,
  /// Private, cluster-facing address (`interface/ip@address`).
  pub intf_ip: String,
  /// Externally routable IPv4 address (`host@ipv4`).
  pub host_ip: String,
  /// Login host (`services/login@hostname`).
  pub hostname: String,
  /// Login user (`services/login@username`).
  pub username: String,
  /// Login port (`services/login@port`). Used to reach the node, never
  /// written into the configuration table.
  pub login_port: u16,
}

impl NodeDescriptor {
  /// `user@host` destination for remote login.
  pub fn destination(&self) -> String {
    format!("{}@{}", self.username, self.hostname)
  }
}

/// Errors produced while reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// The manifest file could not be read.
  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The document is not well-formed XML.
  #[error("malformed manifest XML: {0}")]
  Xml(#[from] roxmltree::Error),

  /// A node lacks a required child element.
  #[error("node {node}: missing <{element}> element")]
  MissingElement { node: String, element: &'static str },

  /// A required attribute is absent.
  #[error("node {node}: <{element}> is missing the `{attribute}` attribute")]
  MissingAttribute {
    node: String,
    element: &'static str,
    attribute: &'static str,
  },

  /// The advertised login port is not a valid port number.
  #[error("node {node}: invalid login port `{value}`")]
  InvalidPort { node: String, value: String },

  /// A login coordinate would be read as a client option.
  #[error("node {node}: login {attribute} `{value}` must not start with `-`")]
  InvalidLogin {
    node: String,
    attribute: &'static str,
    value: String,
  },

  /// Two nodes share the same `client_id`.
  #[error("duplicate node client_id `{0}`")]
  DuplicateNode(String),
}
