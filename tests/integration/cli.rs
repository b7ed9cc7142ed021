use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::TestProject;

fn debforge() -> Command {
    let mut cmd = Command::cargo_bin("debforge").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("DEBFORGE_NO_PROGRESS", "1")
        .env_remove("DEBFORGE_CONFIG")
        .env_remove("DEBFORGE_INDEX")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    debforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("order"))
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_version() {
    debforge().arg("--version").assert().success().stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_packages_are_required() {
    debforge().arg("order").assert().failure().stderr(predicate::str::contains("<PKG>"));
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    debforge().args(["-v", "-q", "order", "a"]).assert().failure();
}

#[test]
fn test_missing_index_is_config_error() {
    let project = TestProject::new().unwrap();
    let config = project.config_path();

    project
        .run_raw(&["--config", config.to_str().unwrap(), "order", "a"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("No distribution index configured");
}

#[test]
fn test_index_from_environment() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &[]);
    project.write_index().unwrap();

    let output = project
        .command()
        .env("DEBFORGE_INDEX", project.index_path())
        .args(["--config", project.config_path().to_str().unwrap(), "order", "a"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "a");
}

#[test]
fn test_index_in_config_file() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &[]);
    project.write_index().unwrap();
    project.write_config(&format!("index = \"{}\"\n", project.index_path().display())).unwrap();

    let config = project.config_path();
    let output = project.run_raw(&["--config", config.to_str().unwrap(), "order", "a"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "a");
}

#[test]
fn test_malformed_index_is_reported() {
    let project = TestProject::new().unwrap();
    std::fs::write(project.index_path(), "packages: [not, a, map").unwrap();

    project
        .run(&["order", "a"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Failed to load distribution index");
}

#[test]
fn test_malformed_config_is_reported() {
    let project = TestProject::new().unwrap();
    std::fs::write(project.config_path(), "fetch_delay_ms = \"soon\"").unwrap();

    project.run(&["order", "a"]).unwrap().assert_failure().assert_stderr_contains("Configuration error");
}

#[cfg(unix)]
#[test]
fn test_build_requires_debian_toolchain() {
    let project = TestProject::new().unwrap();
    let bin = project.root().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let git = which::which("git").unwrap();
    std::os::unix::fs::symlink(git, bin.join("git")).unwrap();

    let output = project.command().env("PATH", &bin).args(["build", "a"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("debuild"));
}
