//! Fixture release repositories and descriptors for tests.

use anyhow::Result;
use std::path::Path;

use super::git_helper::TestGit;
use crate::core::DebianNaming;

/// Render a format-1 `package.xml`.
pub fn package_xml(name: &str, version: &str, build_depends: &[&str], run_depends: &[&str]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<package>\n");
    xml.push_str(&format!("  <name>{name}</name>\n"));
    xml.push_str(&format!("  <version>{version}</version>\n"));
    xml.push_str("  <description>fixture</description>\n");
    xml.push_str("  <maintainer email=\"test@debforge.example\">Test</maintainer>\n");
    xml.push_str("  <license>BSD</license>\n");
    xml.push_str("  <buildtool_depend>catkin</buildtool_depend>\n");
    for dep in build_depends {
        xml.push_str(&format!("  <build_depend>{dep}</build_depend>\n"));
    }
    for dep in run_depends {
        xml.push_str(&format!("  <run_depend>{dep}</run_depend>\n"));
    }
    xml.push_str("</package>\n");
    xml
}

/// A git-buildpackage style release repository for one package.
pub struct ReleaseRepoFixture {
    pub git: TestGit,
    pub package: String,
}

impl ReleaseRepoFixture {
    /// Create `root/<repo_name>` holding a `package.xml` for `package` on `main`.
    pub fn create(root: &Path, repo_name: &str, package: &str, depends: &[&str]) -> Result<Self> {
        let git = TestGit::new(root.join(repo_name));
        git.init()?;
        git.write_file("package.xml", &package_xml(package, "0.0.0", depends, &[]))?;
        git.add_all()?;
        git.commit("Initial release repository")?;
        Ok(Self {
            git,
            package: package.to_string(),
        })
    }

    /// Commit a release of `short` with the given dependencies and tag it with the
    /// annotated `short` tag.
    pub fn release(&self, short: &str, depends: &[&str]) -> Result<()> {
        self.git.write_file("package.xml", &package_xml(&self.package, short, depends, &[]))?;
        self.git.add_all()?;
        self.git.commit(&format!("Release {short}"))?;
        self.git.tag(short)
    }

    /// Commit Debian packaging for `full` and tag it with the packaging tag.
    pub fn package_release(&self, naming: &DebianNaming, full: &str) -> Result<String> {
        self.git.write_file("debian/changelog", &format!("{} ({full}) unstable\n", naming.artifact_name(&self.package)))?;
        self.git.add_all()?;
        self.git.commit(&format!("Debian packaging for {full}"))?;
        let tag = naming.packaging_tag(&self.package, full);
        self.git.tag(&tag)?;
        Ok(tag)
    }

    pub fn url(&self) -> String {
        self.git.file_url()
    }
}
