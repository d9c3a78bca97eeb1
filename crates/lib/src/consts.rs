//! Well-known names and default values.

/// XML namespace of GENI RSpec v3 manifests.
pub const RSPEC_NAMESPACE: &str = "http://www.geni.net/resources/rspec/3";

pub const DEFAULT_RAFT_PORT: u16 = 8080;
pub const DEFAULT_DB_PORT: u16 = 12345;

/// Default output file of `seed generate`.
pub const DEFAULT_CONFIG_FILENAME: &str = "config.csv";

/// Where the configuration artifact lands on every remote node.
pub const DEFAULT_REMOTE_CONFIG_PATH: &str = "/tmp/clusterseed/config.csv";

/// Client binary used to open remote channels.
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";
