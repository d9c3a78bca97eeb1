//! Tests for `seed show`.

use predicates::prelude::*;

use super::common::{HEADER, TestEnv, fixture_path, seed_cmd};

fn generated(env: &TestEnv) -> std::path::PathBuf {
  let output = env.path("config.csv");
  seed_cmd()
    .arg("generate")
    .arg("--manifest")
    .arg(fixture_path("two_nodes.xml"))
    .arg("--output")
    .arg(&output)
    .assert()
    .success();
  output
}

#[test]
fn shows_nodes_with_endpoints() {
  let env = TestEnv::new();
  let config = generated(&env);

  seed_cmd()
    .arg("show")
    .arg(&config)
    .assert()
    .success()
    .stdout(predicate::str::contains("2 node(s)"))
    .stdout(predicate::str::contains("[0] n0 raft=10.0.0.1:8080 db=10.0.0.1:12345 login=alice@pc1.example.org"))
    .stdout(predicate::str::contains("[1] n1 raft=10.0.0.2:8080 db=10.0.0.2:12345 login=bob@pc2.example.org"));
}

#[test]
fn shows_json() {
  let env = TestEnv::new();
  let config = generated(&env);

  let output = seed_cmd()
    .arg("show")
    .arg(&config)
    .args(["--format", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let nodes = value["nodes"].as_array().unwrap();
  assert_eq!(nodes.len(), 2);
  assert_eq!(nodes[0]["name"], "n0");
  assert_eq!(nodes[0]["id"], 0);
  assert_eq!(nodes[1]["raft_addr"], "10.0.0.2:8080");
  assert_eq!(nodes[1]["db_port"], 12345);
}

#[test]
fn shows_empty_config() {
  let env = TestEnv::new();
  let config = env.path("config.csv");
  std::fs::write(&config, HEADER).unwrap();

  seed_cmd()
    .arg("show")
    .arg(&config)
    .assert()
    .success()
    .stdout(predicate::str::contains("No nodes"));
}

#[test]
fn rejects_foreign_csv() {
  let env = TestEnv::new();
  let config = env.path("config.csv");
  std::fs::write(&config, "name,intf_ip,port\nn0,10.0.0.1,22\n").unwrap();

  seed_cmd()
    .arg("show")
    .arg(&config)
    .assert()
    .failure()
    .stderr(predicate::str::contains("unexpected header"));
}
