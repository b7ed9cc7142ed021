use std::collections::BTreeMap;

use crate::common::TestProject;

fn read_cache(project: &TestProject) -> BTreeMap<String, String> {
    let data = std::fs::read(project.cache_path()).unwrap();
    serde_json::from_slice(&data).unwrap()
}

#[test]
fn test_fetched_descriptors_are_cached_under_full_version() {
    let mut project = TestProject::new().unwrap();
    let rostime = project.release_repo("rostime", "0.3.12", &[]).unwrap();
    project.repo_package(&rostime, "0.3.12-0");
    project.write_index().unwrap();

    project.run(&["order", "rostime"]).unwrap().assert_success();

    let cache = read_cache(&project);
    assert_eq!(cache.len(), 1);
    assert!(cache["rostime:0.3.12-0"].contains("<name>rostime</name>"));
}

#[test]
fn test_inline_descriptors_are_not_cached() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &[]);
    project.write_index().unwrap();

    project.run(&["order", "a"]).unwrap().assert_success();
    assert!(!project.cache_path().exists());
}

#[test]
fn test_cache_serves_descriptors_after_repository_is_gone() {
    let mut project = TestProject::new().unwrap();
    let rostime = project.release_repo("rostime", "0.3.12", &[]).unwrap();
    project.repo_package(&rostime, "0.3.12-0");
    project.write_index().unwrap();

    project.run(&["order", "rostime"]).unwrap().assert_success();
    std::fs::remove_dir_all(rostime.git.repo_path()).unwrap();

    let output = project.run(&["order", "rostime"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "rostime");

    project
        .run(&["order", "--ignore-cache", "rostime"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Failed to fetch metadata");
}

#[test]
fn test_ignore_cache_still_refreshes_entries() {
    let mut project = TestProject::new().unwrap();
    let rostime = project.release_repo("rostime", "0.3.12", &[]).unwrap();
    project.repo_package(&rostime, "0.3.12-0");
    project.write_index().unwrap();

    let stale = BTreeMap::from([(
        "rostime:0.3.12-0".to_string(),
        "<package><name>rostime</name><build_depend>ghost</build_depend></package>".to_string(),
    )]);
    std::fs::create_dir_all(project.cache_path().parent().unwrap()).unwrap();
    std::fs::write(project.cache_path(), serde_json::to_vec(&stale).unwrap()).unwrap();

    project.run(&["order", "--ignore-cache", "rostime"]).unwrap().assert_success();
    assert!(!read_cache(&project)["rostime:0.3.12-0"].contains("ghost"));
}

#[test]
fn test_corrupt_cache_is_replaced() {
    let mut project = TestProject::new().unwrap();
    let rostime = project.release_repo("rostime", "0.3.12", &[]).unwrap();
    project.repo_package(&rostime, "0.3.12-0");
    project.write_index().unwrap();

    std::fs::create_dir_all(project.cache_path().parent().unwrap()).unwrap();
    std::fs::write(project.cache_path(), "{ not json").unwrap();

    project.run(&["order", "rostime"]).unwrap().assert_success();
    assert!(read_cache(&project).contains_key("rostime:0.3.12-0"));
}

#[test]
fn test_cache_path_from_environment() {
    let mut project = TestProject::new().unwrap();
    let rostime = project.release_repo("rostime", "0.3.12", &[]).unwrap();
    project.repo_package(&rostime, "0.3.12-0");
    project.write_index().unwrap();

    let elsewhere = project.root().join("env-cache.json");
    let output = project
        .command()
        .env("DEBFORGE_CACHE_PATH", &elsewhere)
        .args([
            "--config",
            project.config_path().to_str().unwrap(),
            "order",
            "--index",
            project.index_path().to_str().unwrap(),
            "rostime",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(elsewhere.exists());
    assert!(!project.cache_path().exists());
}
