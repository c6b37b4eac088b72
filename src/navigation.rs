//! Navigation tree (toc.yml) rebuilding.
//!
//! The extractor emits each package's entities as one flat list. This module
//! regroups every package as `[Enums: [...], other entities...]` under a fixed
//! "API reference" root. All I/O happens before: the builder only sees the
//! member lists and a package → enum names index.

use crate::declaration::extract_enum_names;
use crate::model::{NavigationDocument, NavigationNode};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

pub const ROOT_NAME: &str = "API reference";
pub const OVERVIEW_NAME: &str = "API reference overview";
pub const ENUMS_GROUP: &str = "Enums";

/// Enum names per package, keyed by [`package_key`].
pub type EnumIndex = HashMap<String, BTreeSet<String>>;

/// A package and its entities, in navigation order.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMembers {
    pub name: String,
    pub uid: Option<String>,
    pub members: Vec<NavigationNode>,
}

/// Lookup key for a package: lowercase, without the trailing `!` of package
/// uids, so `Excel`, `excel` and `excel!` all match.
pub fn package_key(name: &str) -> String {
    name.trim_end_matches('!').to_lowercase()
}

/// Build the enum index from `(package, declaration source)` pairs.
pub fn index_enums<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> EnumIndex {
    let mut index = EnumIndex::new();
    for (package, source) in sources {
        index
            .entry(package_key(package))
            .or_default()
            .extend(extract_enum_names(source));
    }
    index
}

/// Collect packages from an existing navigation document.
///
/// Packages are nodes with a uid and an item list. Uid-less containers are
/// searched recursively; stray leaves such as the overview are skipped.
pub fn collect_packages(nodes: &[NavigationNode]) -> Vec<PackageMembers> {
    let mut packages = Vec::new();
    for node in nodes {
        if node.items.is_none() {
            continue;
        }
        if node.uid.is_some() {
            packages.push(PackageMembers {
                name: node.name.clone(),
                uid: node.uid.clone(),
                members: flatten_groups(node.children()),
            });
        } else {
            packages.extend(collect_packages(node.children()));
        }
    }
    packages
}

/// Splice the children of identifier-less groups (an earlier "Enums" group)
/// into the member list.
fn flatten_groups(nodes: &[NavigationNode]) -> Vec<NavigationNode> {
    let mut members = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.uid.is_none() && node.href.is_none() && node.items.is_some() {
            members.extend(flatten_groups(node.children()));
        } else {
            members.push(node.clone());
        }
    }
    members
}

/// Whether a (possibly namespace-qualified) display name is a known enum.
pub fn is_enum_member(name: &str, enum_names: &BTreeSet<String>) -> bool {
    if enum_names.contains(name) {
        return true;
    }
    name.rsplit_once('.')
        .is_some_and(|(_, short)| enum_names.contains(short))
}

/// Regroup one package: the "Enums" group first (always present), then the
/// remaining members in their original order.
pub fn build_package(package: &PackageMembers, enum_names: &BTreeSet<String>) -> NavigationNode {
    let (enums, primary): (Vec<NavigationNode>, Vec<NavigationNode>) = package
        .members
        .iter()
        .cloned()
        .partition(|member| is_enum_member(&member.name, enum_names));

    let mut items = Vec::with_capacity(primary.len() + 1);
    items.push(NavigationNode::group(ENUMS_GROUP, enums));
    items.extend(primary);

    NavigationNode {
        name: package.name.clone(),
        href: None,
        uid: package.uid.clone(),
        items: Some(items),
    }
}

/// Assemble the full tree: the overview leaf, then one subtree per package in
/// input order. A package missing from `enums` is built with no enums.
pub fn build_navigation(
    packages: &[PackageMembers],
    enums: &EnumIndex,
    overview_href: &str,
) -> NavigationNode {
    let empty = BTreeSet::new();
    let mut items = Vec::with_capacity(packages.len() + 1);
    items.push(NavigationNode {
        name: OVERVIEW_NAME.to_string(),
        href: Some(overview_href.to_string()),
        ..Default::default()
    });

    for package in packages {
        let enum_names = enums.get(&package_key(&package.name)).unwrap_or_else(|| {
            warn!(package = %package.name, "no enum names for package; grouping without enums");
            &empty
        });
        items.push(build_package(package, enum_names));
    }

    NavigationNode::group(ROOT_NAME, items)
}

/// Rebuild a whole navigation document.
pub fn rebuild(doc: &NavigationDocument, enums: &EnumIndex, overview_href: &str) -> NavigationDocument {
    let packages = collect_packages(&doc.items);
    NavigationDocument {
        items: vec![build_navigation(&packages, enums, overview_href)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> NavigationNode {
        NavigationNode {
            name: name.to_string(),
            uid: Some(format!("excel!{}:class", name)),
            ..Default::default()
        }
    }

    fn names(nodes: &[NavigationNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    fn package(name: &str, members: &[&str]) -> PackageMembers {
        PackageMembers {
            name: name.to_string(),
            uid: Some(format!("{}!", name)),
            members: members.iter().map(|m| leaf(m)).collect(),
        }
    }

    fn enums(package: &str, names: &[&str]) -> EnumIndex {
        let mut index = EnumIndex::new();
        index.insert(
            package_key(package),
            names.iter().map(|n| n.to_string()).collect(),
        );
        index
    }

    #[test]
    fn enums_group_first_and_order_kept() {
        let root = build_navigation(&[package("excel", &["A", "B", "C"])], &enums("excel", &["B"]), "overview.md");
        let pkg = &root.children()[1];
        assert_eq!(names(pkg.children()), vec!["Enums", "A", "C"]);
        assert_eq!(names(pkg.children()[0].children()), vec!["B"]);
        assert_eq!(pkg.children()[0].uid, None);
    }

    #[test]
    fn root_shape() {
        let root = build_navigation(&[package("excel", &["A"]), package("word", &["D"])], &EnumIndex::new(), "overview.md");
        assert_eq!(root.name, ROOT_NAME);
        assert_eq!(names(root.children()), vec![OVERVIEW_NAME, "excel", "word"]);
        assert_eq!(root.children()[0].href.as_deref(), Some("overview.md"));
    }

    #[test]
    fn missing_enum_index_keeps_empty_group() {
        let root = build_navigation(&[package("word", &["A", "B"])], &EnumIndex::new(), "overview.md");
        let pkg = &root.children()[1];
        assert_eq!(names(pkg.children()), vec!["Enums", "A", "B"]);
        assert_eq!(pkg.children()[0].items, Some(Vec::new()));
    }

    #[test]
    fn qualified_names_match_enums() {
        let set: BTreeSet<String> = ["ChartType".to_string()].into_iter().collect();
        assert!(is_enum_member("Excel.ChartType", &set));
        assert!(is_enum_member("ChartType", &set));
        assert!(!is_enum_member("Excel.Chart", &set));
    }

    #[test]
    fn no_member_lost_or_duplicated() {
        let packages = [package("excel", &["A", "B", "C", "D"]), package("word", &["E", "F"])];
        let mut index = enums("excel", &["B", "D"]);
        index.extend(enums("word", &["E"]));
        let root = build_navigation(&packages, &index, "overview.md");

        let mut seen: Vec<&str> = Vec::new();
        for pkg in &root.children()[1..] {
            assert_eq!(pkg.children()[0].name, ENUMS_GROUP);
            for child in pkg.children() {
                if child.name == ENUMS_GROUP {
                    seen.extend(names(child.children()));
                } else {
                    seen.push(&child.name);
                }
            }
        }
        seen.sort();
        assert_eq!(seen, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn rebuild_is_stable() {
        let input = NavigationDocument {
            items: vec![NavigationNode::group(
                ROOT_NAME,
                vec![
                    NavigationNode {
                        name: OVERVIEW_NAME.to_string(),
                        href: Some("overview.md".to_string()),
                        ..Default::default()
                    },
                    NavigationNode {
                        name: "excel".to_string(),
                        uid: Some("excel!".to_string()),
                        items: Some(vec![leaf("A"), leaf("B"), leaf("C")]),
                        ..Default::default()
                    },
                ],
            )],
        };
        let index = enums("excel", &["B"]);
        let once = rebuild(&input, &index, "overview.md");
        assert_eq!(rebuild(&once, &index, "overview.md"), once);
        assert_eq!(collect_packages(&once.items)[0].members.len(), 3);
    }

    #[test]
    fn index_from_sources() {
        let index = index_enums([("Excel", "declare namespace Excel {\n    enum ChartType { line }\n}\n")]);
        assert!(index["excel"].contains("ChartType"));
    }
}
