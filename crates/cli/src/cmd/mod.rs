mod distribute;
mod generate;
mod show;

pub use distribute::{DistributeArgs, cmd_distribute};
pub use generate::cmd_generate;
pub use show::cmd_show;

use tracing::info;

use clusterseed_lib::manifest::NodeDescriptor;

/// Log what the manifest yielded before acting on it.
fn log_discovered(nodes: &[NodeDescriptor]) {
  info!(count = nodes.len(), "discovered nodes");
  for node in nodes {
    info!(
      name = %node.name,
      intf_ip = %node.intf_ip,
      host_ip = %node.host_ip,
      login = %node.destination(),
      port = node.login_port,
      "node"
    );
  }
}
