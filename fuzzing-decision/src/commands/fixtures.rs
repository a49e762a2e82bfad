//! Configuration tree used by command tests

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::Config;

const IMAGESETS: &str = r#"
generic-worker-A:
  workerImplementation: generic-worker
  workerConfig:
    genericWorker:
      config:
        anyKey: anyValue
  aws:
    amis:
      us-west-1: ami-1234
"#;

const CLOUDS: &str = r#"
aws:
  regions:
    us-west-1:
      security_groups: [sg-A]
      subnets:
        us-west-1a: subnet-XXX
"#;

const MACHINES: &str = r#"
aws:
  arm64:
    a1: {cpu: 1, ram: 2}
    a2: {cpu: 2, ram: 8}
    a3: {cpu: 20, ram: 1280}
"#;

const POOL: &str = r#"
name: Amazing fuzzing pool
cloud: aws
platform: linux
cpu: arm64
tasks: 3
cores_per_task: 10
minimum_memory_per_core: 1g
disk_size: 120g
cycle_time: 1h
imageset: generic-worker-A
container: MozillaSecurity/fuzzer:latest
command: [run-fuzzing.sh]
scopes:
  - secrets:get:project/fuzzing/token
"#;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A settings file pointing at one AWS pool named `test`
pub(crate) fn config_tree() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(&root.join("community/imagesets.yml"), IMAGESETS);
    write(&root.join("community/clouds.yml"), CLOUDS);
    write(&root.join("fuzzing/machines.yml"), MACHINES);
    write(&root.join("fuzzing/pools/test.yml"), POOL);
    write(
        &root.join("settings.yml"),
        "community_config_dir: community\nfuzzing_config_dir: fuzzing\n",
    );

    let config = Config {
        configuration: Some(root.join("settings.yml")),
        taskcluster_secret: None,
        taskcluster_url: "http://127.0.0.1:9".to_string(),
    };
    (dir, config)
}
