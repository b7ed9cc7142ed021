//! `package.xml` parsing.
//!
//! Both descriptor formats are understood. Format 1 declares `buildtool_depend`,
//! `build_depend` and `run_depend`; format 2 adds `depend` (build and run),
//! `build_export_depend` (build) and `exec_depend` (run). Test and doc
//! dependencies are ignored.

use anyhow::Result;
use roxmltree::{Document, Node};

use super::PackageMetadata;
use crate::core::DebforgeError;

/// Parse a descriptor fetched for `package`.
pub fn parse_package_xml(package: &str, xml: &str) -> Result<PackageMetadata> {
    let invalid = |reason: String| DebforgeError::InvalidPackage {
        package: package.to_string(),
        reason,
    };

    let doc = Document::parse(xml).map_err(|e| invalid(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "package" {
        return Err(invalid(format!(
            "expected root element 'package', found '{}'",
            root.tag_name().name()
        ))
        .into());
    }

    let mut metadata = PackageMetadata::default();
    let mut name = None;

    for child in root.children().filter(|n| n.is_element()) {
        let Some(text) = element_text(&child) else {
            continue;
        };
        match child.tag_name().name() {
            "name" => name = Some(text),
            "version" => metadata.version = Some(text),
            "buildtool_depend" => {
                metadata.buildtool_depends.insert(text);
            }
            "build_depend" | "build_export_depend" => {
                metadata.build_depends.insert(text);
            }
            "run_depend" | "exec_depend" => {
                metadata.run_depends.insert(text);
            }
            "depend" => {
                metadata.build_depends.insert(text.clone());
                metadata.run_depends.insert(text);
            }
            _ => {}
        }
    }

    metadata.name = name.ok_or_else(|| invalid("missing <name> element".to_string()))?;
    Ok(metadata)
}

fn element_text(node: &Node) -> Option<String> {
    node.text().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}
