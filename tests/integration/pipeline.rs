//! Library-level runs of resolve, order and checkout against local release repositories.

use tempfile::TempDir;

use debforge::checkout::{CheckoutProvider, Workspace};
use debforge::config::BuildConfig;
use debforge::core::DebianNaming;
use debforge::distro::{DistributionIndex, IndexEntry};
use debforge::metadata::{MetadataCache, MetadataProvider, PackageSource, RemoteFetcher};
use debforge::resolver::{GraphBuilder, toposort};
use debforge::test_utils::{ReleaseRepoFixture, TestGit, init_test_logging};

fn entry(repo: &ReleaseRepoFixture, version: &str) -> IndexEntry {
    IndexEntry {
        url: repo.url(),
        version: version.to_string(),
        short_version: None,
        package_xml: None,
    }
}

#[tokio::test]
async fn test_resolve_order_and_checkout_packaging_tags() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let repos = temp.path().join("repos");
    let naming = DebianNaming::new("groovy", "quantal");

    let cpp_common = ReleaseRepoFixture::create(&repos, "roscpp_core-release", "cpp_common", &[]).unwrap();
    cpp_common.release("0.3.12", &[]).unwrap();
    let cpp_tag = cpp_common.package_release(&naming, "0.3.12-0").unwrap();

    let rostime = ReleaseRepoFixture::create(&repos, "rostime-release", "rostime", &[]).unwrap();
    rostime.release("0.3.12", &["cpp_common"]).unwrap();
    let rostime_tag = rostime.package_release(&naming, "0.3.12-0").unwrap();

    let index = DistributionIndex {
        name: "groovy".to_string(),
        platform: None,
        packages: [
            ("cpp_common".to_string(), entry(&cpp_common, "0.3.12-0")),
            ("rostime".to_string(), entry(&rostime, "0.3.12-0")),
        ]
        .into(),
    };
    let config = BuildConfig {
        fetch_delay_ms: 0,
        ..Default::default()
    };
    let provider = MetadataProvider::new(index, MetadataCache::in_memory(), RemoteFetcher::new(&config), true);

    let graph = GraphBuilder::new(&provider).build_graph(&["rostime".to_string()]).await.unwrap();
    let order = toposort::order(&graph).unwrap();
    assert_eq!(order, vec!["cpp_common".to_string(), "rostime".to_string()]);
    assert_eq!(provider.cache().len().await, 2);

    let workspace = Workspace::new(temp.path().join("workspace")).unwrap();
    for (package, tag, origin) in [("cpp_common", &cpp_tag, &cpp_common), ("rostime", &rostime_tag, &rostime)] {
        let descriptor = provider.descriptor(package).unwrap();
        let path = workspace.checkout(package, &descriptor, tag).await.unwrap();

        assert_eq!(path, workspace.repo_path(&descriptor.url).unwrap());
        assert_eq!(
            TestGit::new(&path).rev_parse_head().unwrap(),
            origin.git.rev_parse(&format!("{tag}^{{commit}}")).unwrap()
        );
        assert!(path.join("debian/changelog").exists());
    }
}

#[tokio::test]
async fn test_checkout_recreates_foreign_working_copy() {
    let temp = TempDir::new().unwrap();
    let naming = DebianNaming::new("groovy", "quantal");

    let rostime = ReleaseRepoFixture::create(&temp.path().join("a"), "rostime-release", "rostime", &[]).unwrap();
    rostime.release("0.3.12", &[]).unwrap();
    let tag = rostime.package_release(&naming, "0.3.12-0").unwrap();

    // Same basename, different origin
    let impostor = ReleaseRepoFixture::create(&temp.path().join("b"), "rostime-release", "rostime", &[]).unwrap();
    impostor.release("0.3.12", &[]).unwrap();

    let workspace = Workspace::new(temp.path().join("workspace")).unwrap();
    let foreign = DistributionIndex {
        name: "groovy".to_string(),
        platform: None,
        packages: [("rostime".to_string(), entry(&impostor, "0.3.12-0"))].into(),
    };
    let descriptor = foreign.checkout_descriptor("rostime").unwrap();
    workspace.reconcile("rostime", &descriptor).await.unwrap();

    let index = DistributionIndex {
        name: "groovy".to_string(),
        platform: None,
        packages: [("rostime".to_string(), entry(&rostime, "0.3.12-0"))].into(),
    };
    let descriptor = index.checkout_descriptor("rostime").unwrap();
    let path = workspace.checkout("rostime", &descriptor, &tag).await.unwrap();

    let local = TestGit::new(&path);
    assert_eq!(local.remote_url().unwrap(), rostime.url());
    assert_eq!(local.rev_parse_head().unwrap(), rostime.git.rev_parse(&format!("{tag}^{{commit}}")).unwrap());
}
