use crate::common::TestProject;

#[test]
fn test_graph_prints_layers() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &[]).inline_package("b", &["a"]).inline_package("c", &["a", "b"]);
    project.write_index().unwrap();

    let output = project.run(&["graph", "c"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "Layer 0\n  a\nLayer 1\n  b -> a\nLayer 2\n  c -> a, b\n");
}

#[test]
fn test_graph_omits_pruned_dependencies() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &["not-in-index"]);
    project.write_index().unwrap();

    let output = project.run(&["graph", "a"]).unwrap();
    output.assert_success();
    assert!(!output.stdout.contains("not-in-index"));
    assert!(!output.stdout.contains("catkin"));
}

#[test]
fn test_graph_reports_cycles() {
    let mut project = TestProject::new().unwrap();
    project.inline_package("a", &["b"]).inline_package("b", &["a"]);
    project.write_index().unwrap();

    project.run(&["graph", "a"]).unwrap().assert_failure().assert_stderr_contains("Circular dependencies");
}
