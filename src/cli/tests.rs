use super::*;
use clap::Parser;

#[test]
fn test_parse_order() {
    let cli = Cli::try_parse_from(["debforge", "order", "--distro", "hydro", "roscpp", "rospy"]).unwrap();
    let Commands::Order(cmd) = cli.command else {
        panic!("expected order command");
    };
    assert_eq!(cmd.args.distro, "hydro");
    assert_eq!(cmd.args.packages, vec!["roscpp", "rospy"]);
    assert!(!cmd.args.ignore_cache);
}

#[test]
fn test_parse_build_with_options() {
    let cli = Cli::try_parse_from([
        "debforge",
        "--no-progress",
        "build",
        "--workspace",
        "/tmp/ws",
        "--index",
        "https://example.org/index.yaml",
        "--ignore-cache",
        "roscpp",
    ])
    .unwrap();
    assert!(cli.no_progress);
    let Commands::Build(cmd) = cli.command else {
        panic!("expected build command");
    };
    assert_eq!(cmd.args.workspace.as_deref(), Some(std::path::Path::new("/tmp/ws")));
    assert_eq!(cmd.args.index.as_deref(), Some("https://example.org/index.yaml"));
    assert!(cmd.args.ignore_cache);
    assert_eq!(cmd.args.distro, "groovy");
}

#[test]
fn test_packages_required() {
    assert!(Cli::try_parse_from(["debforge", "order"]).is_err());
    assert!(Cli::try_parse_from(["debforge", "build"]).is_err());
}

#[test]
fn test_verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["debforge", "-v", "-q", "order", "roscpp"]).is_err());
}

#[test]
fn test_build_config_log_level() {
    let cli = Cli::try_parse_from(["debforge", "--verbose", "graph", "roscpp"]).unwrap();
    assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

    let cli = Cli::try_parse_from(["debforge", "--quiet", "graph", "roscpp"]).unwrap();
    assert_eq!(cli.build_config().log_level, None);

    let cli = Cli::try_parse_from(["debforge", "--config", "/etc/debforge.toml", "graph", "roscpp"]).unwrap();
    let config = cli.build_config();
    assert_eq!(config.log_level.as_deref(), Some("info"));
    assert_eq!(config.config_path, Some(std::path::PathBuf::from("/etc/debforge.toml")));
}
