//! clusterseed-lib: Core types and logic for clusterseed
//!
//! This crate turns a testbed resource manifest into a cluster configuration
//! table and pushes it to every node:
//! - `manifest`: parses RSpec documents into `NodeDescriptor`s
//! - `topology`: assigns ids and shared ports, producing a `ClusterConfig`
//! - `codec`: CSV encoding of the configuration table
//! - `credential`: SSH private key loading
//! - `remote`: per-node distribution over remote execution channels

pub mod codec;
pub mod consts;
pub mod credential;
pub mod manifest;
pub mod remote;
pub mod topology;
