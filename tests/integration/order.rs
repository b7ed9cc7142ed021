use crate::common::TestProject;

#[test]
fn test_order_dependencies_first() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &[]).inline_package("b", &["a"]).inline_package("c", &["a", "b"]);
    project.write_index().unwrap();

    let output = project.run(&["order", "c"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "a b c");
}

#[test]
fn test_order_is_stable_within_a_layer() {
    let mut project = TestProject::new().unwrap();
    project
        .inline_package("zeta", &[])
        .inline_package("alpha", &[])
        .inline_package("mid", &["zeta", "alpha"]);
    project.write_index().unwrap();

    for _ in 0..3 {
        let output = project.run(&["order", "mid"]).unwrap();
        output.assert_success();
        assert_eq!(output.stdout.trim(), "alpha zeta mid");
    }
}

#[test]
fn test_order_multiple_roots_share_dependencies() {
    let mut project = TestProject::new().unwrap();
    project
        .inline_package("base", &[])
        .inline_package("left", &["base"])
        .inline_package("right", &["base"])
        .inline_package("unrelated", &[]);
    project.write_index().unwrap();

    let output = project.run(&["order", "right", "left"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "base left right");
}

#[test]
fn test_unknown_dependency_is_skipped() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &["libboost-dev", "b"]).inline_package("b", &[]);
    project.write_index().unwrap();

    let output = project.run(&["-v", "order", "a"]).unwrap();
    output.assert_success().assert_stderr_contains("libboost-dev");
    assert_eq!(output.stdout.trim(), "b a");
}

#[test]
fn test_unknown_root_suggests_similar_name() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("rostime", &[]);
    project.write_index().unwrap();

    project
        .run(&["order", "rostiem"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("rostiem")
        .assert_stderr_contains("Did you mean 'rostime'?");
}

#[test]
fn test_cycle_fails_and_names_members() {
    let mut project = TestProject::new().unwrap();
    project
        .inline_package("x", &["z"])
        .inline_package("y", &["x"])
        .inline_package("z", &["y"])
        .inline_package("top", &["x"]);
    project.write_index().unwrap();

    let output = project.run(&["order", "top"]).unwrap();
    output.assert_failure().assert_stderr_contains("Circular dependencies");
    assert!(output.stdout.trim().is_empty());
    for member in ["x", "y", "z"] {
        assert!(output.stderr.contains(member));
    }
}

#[test]
fn test_self_dependency_is_ignored() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &["a"]);
    project.write_index().unwrap();

    let output = project.run(&["order", "a"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "a");
}

#[test]
fn test_order_fetches_from_release_repositories() {
    let mut project = TestProject::new().unwrap();
    let cpp_common = project.release_repo("cpp_common", "0.3.12", &[]).unwrap();
    let rostime = project.release_repo("rostime", "0.3.12", &["cpp_common"]).unwrap();
    project.repo_package(&cpp_common, "0.3.12-0").repo_package(&rostime, "0.3.12-0");
    project.write_index().unwrap();

    let output = project.run(&["order", "rostime"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "cpp_common rostime");
}

#[test]
fn test_unreachable_repository_is_fatal() {
    let mut project = TestProject::new().unwrap();
    let rostime = project.release_repo("rostime", "0.3.12", &[]).unwrap();
    project.repo_package(&rostime, "0.4.0-0");
    project.write_index().unwrap();

    project
        .run(&["order", "rostime"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Failed to fetch metadata for package 'rostime'")
        .assert_stderr_contains("0.4.0-0, 0.4.0");
}
