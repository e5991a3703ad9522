//! Basic types and enumerations.

use smol_str::SmolStr;

use super::diagnostics::DiagnosticCollector;
use super::error::{ExtractError, Result};
use crate::base::ObjectId;
use crate::base::schema::{ObjectKind, attr, role};
use crate::index::ObjectIndex;

/// A predefined type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicTypeInfo {
    pub id: ObjectId,
    pub name: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationLiteralInfo {
    pub id: ObjectId,
    pub name: SmolStr,
}

/// An enumerated Typedef with its literals in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationInfo {
    pub id: ObjectId,
    pub name: SmolStr,
    pub literals: Vec<EnumerationLiteralInfo>,
}

/// How a Typedef builds its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construction {
    Enumeration,
    Alias,
    Sequence,
    Array,
}

impl Construction {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Enumeration),
            "1" => Some(Self::Alias),
            "2" => Some(Self::Sequence),
            "3" => Some(Self::Array),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Enumeration => "enumeration",
            Self::Alias => "alias",
            Self::Sequence => "sequence",
            Self::Array => "array",
        }
    }
}

/// Type catalog of the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    pub basic_types: Vec<BasicTypeInfo>,
    pub enumerations: Vec<EnumerationInfo>,
}

impl TypeCatalog {
    /// Name of a basic type or enumeration.
    pub fn name_of(&self, id: &str) -> Option<&SmolStr> {
        self.basic_types
            .iter()
            .find(|basic| basic.id.as_str() == id)
            .map(|basic| &basic.name)
            .or_else(|| {
                self.enumerations
                    .iter()
                    .find(|enumeration| enumeration.id.as_str() == id)
                    .map(|enumeration| &enumeration.name)
            })
    }
}

/// Collect basic types and enumerations.
///
/// Alias, sequence and array Typedefs are reported and skipped, unknown
/// construction codes are skipped silently. A Typedef without a construction
/// code is an error.
pub fn collect_types(
    index: &ObjectIndex<'_>,
    diagnostics: &mut DiagnosticCollector,
) -> Result<TypeCatalog> {
    let mut catalog = TypeCatalog::default();

    for id in index.ids_of_kind(ObjectKind::BasicType) {
        catalog.basic_types.push(BasicTypeInfo {
            id: id.clone(),
            name: index.name(id)?,
        });
    }

    for id in index.ids_of_kind(ObjectKind::Typedef) {
        let version = index.version(id)?;
        let code = version
            .attribute_str(attr::CONSTRUCTION)
            .ok_or_else(|| ExtractError::MissingAttribute {
                id: id.clone(),
                name: attr::CONSTRUCTION,
            })?;
        let Some(construction) = Construction::from_code(code) else {
            tracing::debug!(typedef = %id, code, "skipping typedef with unknown construction");
            continue;
        };

        if construction != Construction::Enumeration {
            diagnostics.unhandled_typedef(id, construction.describe(), &version.name());
            continue;
        }

        let mut literals = Vec::new();
        for literal in version.targets(
            role::ENUMERATION_TO_ENUMERATION_LITERAL,
            ObjectKind::EnumerationLiteral,
        ) {
            literals.push(EnumerationLiteralInfo {
                id: literal.clone(),
                name: index.name(literal)?,
            });
        }
        catalog.enumerations.push(EnumerationInfo {
            id: id.clone(),
            name: version.name(),
            literals,
        });
    }

    tracing::debug!(
        basic = catalog.basic_types.len(),
        enumerations = catalog.enumerations.len(),
        "collected types"
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::diagnostics::codes;
    use crate::syntax::{Detail, OdlFile, RawObject};

    fn typedef(id: &str, name: &str, construction: Option<&str>, literals: &[&str]) -> RawObject {
        let mut details: Vec<Detail> = construction
            .map(|code| Detail::attribute(attr::CONSTRUCTION, code))
            .into_iter()
            .collect();
        details.extend(literals.iter().map(|literal| {
            Detail::relationship(
                role::ENUMERATION_TO_ENUMERATION_LITERAL,
                ObjectKind::EnumerationLiteral,
                *literal,
            )
        }));
        RawObject::of_kind(ObjectKind::Typedef, id).with_version(format!("Type: {name}"), details)
    }

    fn literal(id: &str, name: &str) -> RawObject {
        RawObject::of_kind(ObjectKind::EnumerationLiteral, id).with_version(format!("Lit:  {name}"), vec![])
    }

    #[test]
    fn test_enumerations_and_basic_types() {
        let file = OdlFile::new()
            .with_object(RawObject::of_kind(ObjectKind::BasicType, "b1").with_version("Type: integer", vec![]))
            .with_object(typedef("t1", "Door State", Some("0"), &["l1", "l2"]))
            .with_object(literal("l1", "open"))
            .with_object(literal("l2", "half-closed"))
            .with_object(typedef("t2", "Speed", Some("1"), &[]))
            .with_object(typedef("t3", "Samples", Some("2"), &[]));
        let index = ObjectIndex::new(&file);
        let mut diagnostics = DiagnosticCollector::new();

        let catalog = collect_types(&index, &mut diagnostics).unwrap();
        assert_eq!(catalog.basic_types.len(), 1);
        assert_eq!(catalog.enumerations.len(), 1);
        let enumeration = &catalog.enumerations[0];
        assert_eq!(enumeration.name, "Door_State");
        let names: Vec<_> = enumeration.literals.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["open", "half_closed"]);
        assert_eq!(catalog.name_of("b1").map(SmolStr::as_str), Some("integer"));
        assert_eq!(diagnostics.with_code(codes::UNHANDLED_TYPEDEF).count(), 2);
    }

    #[test]
    fn test_typedef_without_construction_is_fatal() {
        let file = OdlFile::new().with_object(typedef("t1", "Broken", None, &[]));
        let index = ObjectIndex::new(&file);

        let err = collect_types(&index, &mut DiagnosticCollector::new()).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingAttribute { name, .. } if name == attr::CONSTRUCTION
        ));
    }
}
