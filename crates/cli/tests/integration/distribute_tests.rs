//! Tests for `seed distribute` against a fake ssh client.
#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;

use super::common::{HEADER, TestEnv, fixture_path, seed_cmd, test_key_path};

const N0_HOST: &str = "pc1.example.org";
const N1_HOST: &str = "pc2.example.org";

fn expected_config() -> String {
  format!(
    "{}{}{}",
    HEADER,
    "n0,10.0.0.1,128.110.96.1,pc1.example.org,alice,0,8080,12345\n",
    "n1,10.0.0.2,128.110.96.2,pc2.example.org,bob,1,8080,12345\n"
  )
}

fn distribute_cmd(env: &TestEnv, refuse: &[&str], manifest: &str) -> Command {
  let mut cmd = seed_cmd();
  cmd
    .arg("distribute")
    .arg("--manifest")
    .arg(fixture_path(manifest))
    .arg("--pvt-key")
    .arg(test_key_path())
    .arg("--ssh-program")
    .arg(env.fake_ssh(refuse))
    .args(["--remote-path", "cluster/config.csv"]);
  cmd
}

#[test]
fn every_node_receives_the_same_config() {
  let env = TestEnv::new();

  distribute_cmd(&env, &[], "two_nodes.xml")
    .assert()
    .success()
    .stdout(predicate::str::contains("Distributed cluster config to 2 node(s)"))
    .stdout(predicate::str::contains("alice@pc1.example.org"))
    .stdout(predicate::str::contains("bob@pc2.example.org"));

  let expected = expected_config();
  assert_eq!(env.remote_file(N0_HOST, "cluster/config.csv").as_deref(), Some(expected.as_str()));
  assert_eq!(env.remote_file(N1_HOST, "cluster/config.csv").as_deref(), Some(expected.as_str()));
  assert!(env.remote_file(N0_HOST, "cluster/config.csv.tmp").is_none());

  let log = env.ssh_log();
  assert_eq!(log.len(), 4, "one probe and one write per node: {log:?}");
  assert_eq!(log[0], format!("{N0_HOST} true"));
}

#[test]
fn custom_ports_reach_remote_nodes() {
  let env = TestEnv::new();

  distribute_cmd(&env, &[], "two_nodes.xml")
    .args(["--raft-port", "9000", "--db-port", "9100"])
    .assert()
    .success();

  let content = env.remote_file(N1_HOST, "cluster/config.csv").unwrap();
  assert!(content.lines().skip(1).all(|row| row.ends_with(",9000,9100")));
}

#[test]
fn parallel_distribution_reaches_every_node() {
  let env = TestEnv::new();

  distribute_cmd(&env, &[], "two_nodes.xml")
    .args(["--parallelism", "2"])
    .assert()
    .success();

  assert!(env.remote_file(N0_HOST, "cluster/config.csv").is_some());
  assert!(env.remote_file(N1_HOST, "cluster/config.csv").is_some());
}

#[test]
fn huge_parallelism_still_reaches_every_node() {
  let env = TestEnv::new();

  distribute_cmd(&env, &[], "two_nodes.xml")
    .arg("--parallelism")
    .arg(usize::MAX.to_string())
    .assert()
    .success();

  assert!(env.remote_file(N0_HOST, "cluster/config.csv").is_some());
  assert!(env.remote_file(N1_HOST, "cluster/config.csv").is_some());
}

#[test]
fn unreachable_node_fails_the_run_but_not_its_peers() {
  let env = TestEnv::new();

  distribute_cmd(&env, &[N0_HOST], "two_nodes.xml")
    .assert()
    .failure()
    .stderr(predicate::str::contains("n0 (alice@pc1.example.org)"))
    .stderr(predicate::str::contains("Connection refused"))
    .stderr(predicate::str::contains("Distribution failed on 1 of 2 node(s): n0"));

  assert!(env.remote_file(N0_HOST, "cluster/config.csv").is_none());
  assert_eq!(env.remote_file(N1_HOST, "cluster/config.csv"), Some(expected_config()));
}

#[test]
fn all_nodes_unreachable() {
  let env = TestEnv::new();

  distribute_cmd(&env, &[N0_HOST, N1_HOST], "two_nodes.xml")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Distribution failed on 2 of 2 node(s): n0, n1"));
}

#[test]
fn empty_manifest_opens_no_connections() {
  let env = TestEnv::new();

  distribute_cmd(&env, &[], "empty.xml")
    .assert()
    .success()
    .stderr(predicate::str::contains("nothing to distribute"));

  assert!(env.ssh_log().is_empty());
}

#[test]
fn invalid_manifest_opens_no_connections() {
  let env = TestEnv::new();

  distribute_cmd(&env, &[], "missing_login.xml")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to parse manifest"));

  assert!(env.ssh_log().is_empty());
}

#[test]
fn missing_key_fails_before_connecting() {
  let env = TestEnv::new();

  seed_cmd()
    .arg("distribute")
    .arg("--manifest")
    .arg(fixture_path("two_nodes.xml"))
    .arg("--pvt-key")
    .arg(env.path("no_such_key"))
    .arg("--ssh-program")
    .arg(env.fake_ssh(&[]))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load private key"));

  assert!(env.ssh_log().is_empty());
}

#[test]
fn malformed_key_fails_before_reading_manifest() {
  let env = TestEnv::new();
  let key = env.path("id_bogus");
  std::fs::write(&key, "not a key\n").unwrap();

  seed_cmd()
    .arg("distribute")
    .arg("--manifest")
    .arg(env.path("no_such_manifest.xml"))
    .arg("--pvt-key")
    .arg(&key)
    .arg("--ssh-program")
    .arg(env.fake_ssh(&[]))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load private key"))
    .stderr(predicate::str::contains("Failed to parse manifest").not());

  assert!(env.ssh_log().is_empty());
}

#[test]
fn missing_ssh_program_reports_every_node() {
  let env = TestEnv::new();

  seed_cmd()
    .arg("distribute")
    .arg("--manifest")
    .arg(fixture_path("two_nodes.xml"))
    .arg("--pvt-key")
    .arg(test_key_path())
    .arg("--ssh-program")
    .arg(env.path("no-such-ssh"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to spawn"))
    .stderr(predicate::str::contains("Distribution failed on 2 of 2 node(s)"));
}
