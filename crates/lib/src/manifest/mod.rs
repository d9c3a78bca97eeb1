//! Manifest parsing.
//!
//! Reads GENI RSpec v3 manifests and extracts one [`NodeDescriptor`] per
//! top-level `node` element, in document order. Parsing is all-or-nothing: a
//! single incomplete node fails the whole manifest.

mod types;

use std::collections::HashSet;
use std::path::Path;

use roxmltree::{Document, Node};
use tracing::{debug, info};

use crate::consts::RSPEC_NAMESPACE;

pub use types::*;

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Vec<NodeDescriptor>, ManifestError> {
  let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_manifest(&content)
}

/// Parse a manifest document into node descriptors.
///
/// Only `node` elements that are direct children of the root and live in the
/// RSpec namespace are considered.
pub fn parse_manifest(xml: &str) -> Result<Vec<NodeDescriptor>, ManifestError> {
  let doc = Document::parse(xml)?;

  let mut nodes = Vec::new();
  let mut seen = HashSet::new();

  let elements = doc
    .root_element()
    .children()
    .filter(|n| n.has_tag_name((RSPEC_NAMESPACE, "node")));

  for (index, element) in elements.enumerate() {
    let node = parse_node(index, element)?;

    if !seen.insert(node.name.clone()) {
      return Err(ManifestError::DuplicateNode(node.name));
    }

    debug!(
      name = %node.name,
      intf_ip = %node.intf_ip,
      host_ip = %node.host_ip,
      destination = %node.destination(),
      "parsed node"
    );
    nodes.push(node);
  }

  info!(nodes = nodes.len(), "parsed manifest");
  Ok(nodes)
}

fn parse_node(index: usize, element: Node<'_, '_>) -> Result<NodeDescriptor, ManifestError> {
  // Until client_id is known the node is identified by its position.
  let name = element
    .attribute("client_id")
    .ok_or_else(|| ManifestError::MissingAttribute {
      node: format!("#{}", index),
      element: "node",
      attribute: "client_id",
    })?;

  let interface = child(element, "interface", "interface", name)?;
  let ip = child(interface, "ip", "interface/ip", name)?;
  let intf_ip = attribute(ip, "address", "interface/ip", name)?;

  let host = child(element, "host", "host", name)?;
  let host_ip = attribute(host, "ipv4", "host", name)?;

  let services = child(element, "services", "services", name)?;
  let login = child(services, "login", "services/login", name)?;
  let hostname = attribute(login, "hostname", "services/login", name)?;
  let port = attribute(login, "port", "services/login", name)?;
  let username = attribute(login, "username", "services/login", name)?;

  for (field, value) in [("hostname", hostname), ("username", username)] {
    if value.starts_with('-') {
      return Err(ManifestError::InvalidLogin {
        node: name.to_string(),
        attribute: field,
        value: value.to_string(),
      });
    }
  }

  let login_port = port.parse::<u16>().map_err(|_| ManifestError::InvalidPort {
    node: name.to_string(),
    value: port.to_string(),
  })?;

  Ok(NodeDescriptor {
    name: name.to_string(),
    intf_ip: intf_ip.to_string(),
    host_ip: host_ip.to_string(),
    hostname: hostname.to_string(),
    username: username.to_string(),
    login_port,
  })
}

/// First child element with the given local name in the RSpec namespace.
fn child<'a, 'input>(
  parent: Node<'a, 'input>,
  tag: &str,
  path: &'static str,
  node: &str,
) -> Result<Node<'a, 'input>, ManifestError> {
  parent
    .children()
    .find(|c| c.has_tag_name((RSPEC_NAMESPACE, tag)))
    .ok_or_else(|| ManifestError::MissingElement {
      node: node.to_string(),
      element: path,
    })
}

fn attribute<'a>(
  element: Node<'a, '_>,
  name: &'static str,
  path: &'static str,
  node: &str,
) -> Result<&'a str, ManifestError> {
  element
    .attribute(name)
    .ok_or_else(|| ManifestError::MissingAttribute {
      node: node.to_string(),
      element: path,
      attribute: name,
    })
}
