//! Tests for `seed generate`.

use predicates::prelude::*;

use super::common::{HEADER, TestEnv, fixture_path, read, seed_cmd};

#[test]
fn two_node_manifest_writes_expected_rows() {
  let env = TestEnv::new();
  let output = env.path("config.csv");

  seed_cmd()
    .env_remove("RUST_LOG")
    .arg("generate")
    .arg("--manifest")
    .arg(fixture_path("two_nodes.xml"))
    .arg("--output")
    .arg(&output)
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote cluster config for 2 node(s)"))
    .stderr(predicate::str::contains("discovered nodes"));

  assert_eq!(
    read(&output),
    format!(
      "{}{}{}",
      HEADER,
      "n0,10.0.0.1,128.110.96.1,pc1.example.org,alice,0,8080,12345\n",
      "n1,10.0.0.2,128.110.96.2,pc2.example.org,bob,1,8080,12345\n"
    )
  );
}

#[test]
fn custom_ports_apply_to_every_row() {
  let env = TestEnv::new();
  let output = env.path("out/cluster.csv");

  seed_cmd()
    .arg("generate")
    .arg("--manifest")
    .arg(fixture_path("two_nodes.xml"))
    .args(["--raft-port", "9000", "--db-port", "9100"])
    .arg("--output")
    .arg(&output)
    .assert()
    .success();

  let content = read(&output);
  let rows: Vec<_> = content.lines().skip(1).collect();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|row| row.ends_with(",9000,9100")));
}

#[test]
fn default_output_is_config_csv_in_working_directory() {
  let env = TestEnv::new();

  seed_cmd()
    .current_dir(env.temp.path())
    .arg("generate")
    .arg("--manifest")
    .arg(fixture_path("two_nodes.xml"))
    .assert()
    .success();

  assert!(env.path("config.csv").exists());
}

#[test]
fn empty_manifest_writes_header_only() {
  let env = TestEnv::new();
  let output = env.path("config.csv");

  seed_cmd()
    .arg("generate")
    .arg("--manifest")
    .arg(fixture_path("empty.xml"))
    .arg("--output")
    .arg(&output)
    .assert()
    .success()
    .stdout(predicate::str::contains("0 node(s)"));

  assert_eq!(read(&output), HEADER);
}

#[test]
fn missing_login_fails_without_writing() {
  let env = TestEnv::new();
  let output = env.path("config.csv");

  seed_cmd()
    .arg("generate")
    .arg("--manifest")
    .arg(fixture_path("missing_login.xml"))
    .arg("--output")
    .arg(&output)
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to parse manifest"))
    .stderr(predicate::str::contains("services/login"));

  assert!(!output.exists());
}

#[test]
fn malformed_manifest_fails() {
  let env = TestEnv::new();
  let manifest = env.path("broken.xml");
  std::fs::write(&manifest, "<rspec><node").unwrap();

  seed_cmd()
    .arg("generate")
    .arg("--manifest")
    .arg(&manifest)
    .arg("--output")
    .arg(env.path("config.csv"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("malformed manifest XML"));

  assert!(!env.path("config.csv").exists());
}
