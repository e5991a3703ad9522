//! Package hierarchy and package-scoped extraction.

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

use super::error::{ExtractError, Result};
use crate::base::schema::{ObjectKind, role};
use crate::base::{ObjectId, normalize_name};
use crate::index::ObjectIndex;

/// A package with its child packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub id: ObjectId,
    /// Name as written in the model, not normalized.
    pub name: String,
    pub children: Vec<Package>,
}

impl Package {
    /// `/`-joined paths of this package and all its descendants, depth first.
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        let path = format!("{prefix}{}", self.name);
        let nested = format!("{path}/");
        paths.push(path);
        for child in &self.children {
            child.collect_paths(&nested, paths);
        }
    }
}

/// Classes and events selected by a package path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageScope {
    pub classes: IndexSet<ObjectId>,
    pub events: IndexSet<ObjectId>,
}

/// Top-level packages with their nested children, in file order.
pub fn package_hierarchy(index: &ObjectIndex<'_>) -> Result<Vec<Package>> {
    let mut children: FxHashMap<&ObjectId, Vec<&ObjectId>> = FxHashMap::default();
    let mut nested: FxHashSet<&ObjectId> = FxHashSet::default();
    for id in index.ids_of_kind(ObjectKind::Package) {
        let version = index.version(id)?;
        let mut list = Vec::new();
        for child in version.targets(role::PACKAGE_TO_PACKAGE_ITEM, ObjectKind::Package) {
            if index.kind_of(child) != Some(ObjectKind::Package) {
                return Err(ExtractError::NotAPackage {
                    parent: id.clone(),
                    child: child.clone(),
                });
            }
            nested.insert(child);
            list.push(child);
        }
        children.insert(id, list);
    }

    let mut roots = Vec::new();
    let mut reached: FxHashSet<&ObjectId> = FxHashSet::default();
    for id in index.ids_of_kind(ObjectKind::Package) {
        if !nested.contains(id) {
            roots.push(build_package(index, &children, id, &mut Vec::new(), &mut reached)?);
        }
    }
    // Packages only reachable through each other form a cycle.
    if let Some(id) = index.ids_of_kind(ObjectKind::Package).find(|id| !reached.contains(*id)) {
        return Err(ExtractError::CycleDetected { id: id.clone() });
    }
    tracing::debug!(packages = roots.len(), "built package hierarchy");
    Ok(roots)
}

fn build_package<'f>(
    index: &ObjectIndex<'f>,
    children: &FxHashMap<&'f ObjectId, Vec<&'f ObjectId>>,
    id: &'f ObjectId,
    ancestors: &mut Vec<&'f ObjectId>,
    reached: &mut FxHashSet<&'f ObjectId>,
) -> Result<Package> {
    if ancestors.contains(&id) {
        return Err(ExtractError::CycleDetected { id: id.clone() });
    }
    reached.insert(id);
    ancestors.push(id);
    let mut nested = Vec::new();
    for child in children.get(id).into_iter().flatten() {
        nested.push(build_package(index, children, child, ancestors, reached)?);
    }
    ancestors.pop();

    Ok(Package {
        id: id.clone(),
        name: index.plain_name(id)?.to_string(),
        children: nested,
    })
}

/// Find the package named by a `/`-delimited path.
///
/// The path is normalized like display names. The first segment matches
/// the first package of that name anywhere in the corpus; the rest descend
/// through child packages.
pub fn find_package<'f>(index: &ObjectIndex<'f>, path: &str) -> Result<&'f ObjectId> {
    let normalized = normalize_name(path);
    let mut segments = normalized.split('/');
    let first = segments.next().unwrap_or_default();

    let mut current = None;
    for id in index.ids_of_kind(ObjectKind::Package) {
        if index.name(id)? == first {
            current = Some(id);
            break;
        }
    }
    let mut current = current.ok_or_else(|| ExtractError::PackageNotFound {
        name: first.to_string(),
    })?;

    for segment in segments {
        current = find_subpackage(index, current, segment)?;
    }
    Ok(current)
}

fn find_subpackage<'f>(index: &ObjectIndex<'f>, parent: &'f ObjectId, name: &str) -> Result<&'f ObjectId> {
    let version = index.version(parent)?;
    for child in version.targets(role::PACKAGE_TO_PACKAGE_ITEM, ObjectKind::Package) {
        if index.name(child)? == name {
            return Ok(child);
        }
    }
    Err(ExtractError::SubpackageNotFound {
        parent: parent.clone(),
        name: name.to_string(),
    })
}

/// Classes and events contained in the package at `path` or any package
/// below it.
pub fn package_scope(index: &ObjectIndex<'_>, path: &str) -> Result<PackageScope> {
    let root = find_package(index, path)?;

    let mut scope = PackageScope::default();
    let mut visited: FxHashSet<&ObjectId> = FxHashSet::default();
    let mut work = vec![root];
    while let Some(package) = work.pop() {
        if !visited.insert(package) {
            return Err(ExtractError::CycleDetected { id: package.clone() });
        }
        let version = index.version(package)?;
        let mut subpackages = Vec::new();
        for (kind, item) in version.relationships(role::PACKAGE_TO_PACKAGE_ITEM) {
            match ObjectKind::from_tag(kind) {
                ObjectKind::Package => subpackages.push(item),
                ObjectKind::Class => {
                    scope.classes.insert(item.clone());
                }
                ObjectKind::Event => {
                    scope.events.insert(item.clone());
                }
                _ => {}
            }
        }
        // Reversed so packages are visited in declaration order.
        work.extend(subpackages.into_iter().rev());
    }

    tracing::debug!(
        path,
        classes = scope.classes.len(),
        events = scope.events.len(),
        "resolved package scope"
    );
    Ok(scope)
}
