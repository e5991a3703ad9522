//! Associations and their multiplicities.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::error::{ExtractError, Result};
use crate::base::ObjectId;
use crate::base::schema::{ObjectKind, attr, role};
use crate::index::ObjectIndex;
use crate::syntax::Detail;

/// Upper bound of a multiplicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpperBound {
    Bounded(u32),
    Unbounded,
}

impl fmt::Display for UpperBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("*"),
        }
    }
}

/// Multiplicity of an association end. An unset lower bound is emitted as
/// an empty literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Multiplicity {
    pub upper: UpperBound,
    pub lower: Option<u32>,
}

impl Multiplicity {
    pub const fn new(upper: UpperBound, lower: Option<u32>) -> Self {
        Self { upper, lower }
    }

    /// Parse a multiplicity literal of the modeling tool.
    pub fn parse(literal: &str) -> Option<Self> {
        use UpperBound::*;
        let multiplicity = match literal {
            "*" | "" => Self::new(Unbounded, None),
            "1" => Self::new(Bounded(1), Some(1)),
            "2" => Self::new(Bounded(2), Some(2)),
            "0..1" => Self::new(Bounded(1), Some(0)),
            "1..*" => Self::new(Unbounded, Some(1)),
            _ => return None,
        };
        Some(multiplicity)
    }

    /// Multiplicity of an end whose literal is absent.
    pub const fn default_for_end(end: usize) -> Self {
        if end == 0 {
            Self::new(UpperBound::Bounded(1), Some(0))
        } else {
            Self::new(UpperBound::Unbounded, None)
        }
    }
}

/// One end of an association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationEnd {
    /// Class owning the role at this end.
    pub owner: ObjectId,
    pub role: ObjectId,
    /// Normalized role name; empty when the role is unnamed.
    pub name: SmolStr,
    pub multiplicity: Multiplicity,
}

/// A binary association between two in-scope classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationInfo {
    pub id: ObjectId,
    pub ends: [AssociationEnd; 2],
}

#[derive(Debug, Default)]
struct PartialEnd {
    owner: Option<ObjectId>,
    role: Option<ObjectId>,
    name: SmolStr,
}

/// Resolve associations whose both ends are owned by classes in `classes`.
pub fn resolve_associations<V>(
    index: &ObjectIndex<'_>,
    classes: &IndexMap<ObjectId, V>,
) -> Result<Vec<AssociationInfo>> {
    let mut multiplicities: IndexMap<&ObjectId, [Multiplicity; 2]> = IndexMap::new();
    let mut ends: FxHashMap<&ObjectId, [PartialEnd; 2]> = FxHashMap::default();

    for id in index.ids_of_kind(ObjectKind::Association) {
        let version = index.version(id)?;
        let mut parsed = [None, None];
        for detail in version.details() {
            let Detail::Attribute { name, value } = detail else {
                continue;
            };
            let end = match name.as_str() {
                attr::END_MULTIPLICITY => 0,
                attr::START_MULTIPLICITY => 1,
                _ => continue,
            };
            let literal = value.first_str().unwrap_or_default();
            parsed[end] = Some(Multiplicity::parse(literal).ok_or_else(|| {
                ExtractError::UnknownMultiplicity {
                    association: id.clone(),
                    literal: literal.to_string(),
                }
            })?);
        }
        multiplicities.insert(
            id,
            [
                parsed[0].unwrap_or(Multiplicity::default_for_end(0)),
                parsed[1].unwrap_or(Multiplicity::default_for_end(1)),
            ],
        );
        ends.insert(id, Default::default());
    }

    // Role → (association, end)
    let mut roles: FxHashMap<&ObjectId, (&ObjectId, usize)> = FxHashMap::default();
    for id in index.ids_of_kind(ObjectKind::Role) {
        let version = index.version(id)?;
        let association = version
            .target(role::ROLE_TO_ASSOCIATION, ObjectKind::Association)
            .ok_or_else(|| ExtractError::RoleWithoutAssociation { role: id.clone() })?;
        let end = match version.attribute_str(attr::ASSOCIATION_END) {
            None => 0,
            Some("0") => 0,
            Some("1") => 1,
            Some(other) => {
                return Err(ExtractError::InvalidAttribute {
                    id: id.clone(),
                    name: attr::ASSOCIATION_END,
                    value: other.to_string(),
                });
            }
        };
        let slot = ends
            .get_mut(association)
            .ok_or_else(|| ExtractError::UnresolvedReference {
                from: id.clone(),
                target: association.clone(),
            })?;
        slot[end].role = Some(id.clone());
        slot[end].name = version.name();
        roles.insert(id, (association, end));
    }

    for class in classes.keys() {
        let version = index.version(class)?;
        for owned in version.targets(role::CLASS_TO_ROLE, ObjectKind::Role) {
            let (association, end) =
                roles
                    .get(owned)
                    .copied()
                    .ok_or_else(|| ExtractError::UnresolvedReference {
                        from: class.clone(),
                        target: owned.clone(),
                    })?;
            if let Some(slot) = ends.get_mut(association) {
                slot[end].owner = Some(class.clone());
            }
        }
    }

    let mut associations = Vec::new();
    for (id, multiplicity) in multiplicities {
        let Some([first, second]) = ends.remove(id) else {
            continue;
        };
        let (Some(a), Some(b)) = (finish_end(first, multiplicity[0]), finish_end(second, multiplicity[1])) else {
            continue;
        };
        if classes.contains_key(&a.owner) && classes.contains_key(&b.owner) {
            associations.push(AssociationInfo {
                id: id.clone(),
                ends: [a, b],
            });
        }
    }

    tracing::debug!(associations = associations.len(), "resolved associations");
    Ok(associations)
}

fn finish_end(end: PartialEnd, multiplicity: Multiplicity) -> Option<AssociationEnd> {
    Some(AssociationEnd {
        owner: end.owner?,
        role: end.role?,
        name: end.name,
        multiplicity,
    })
}
