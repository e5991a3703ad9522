//! Raw object graph produced by the parser.
//!
//! An [`OdlFile`] is a flat, identifier-keyed arena of [`RawObject`]s. Nothing
//! here is resolved: relationships are plain identifier strings and every
//! object keeps its details exactly as they appeared in the corpus.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::ObjectId;
use crate::base::schema::ObjectKind;

/// Top-level keyword that introduced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Object,
    Configuration,
}

/// The parsed contents of an ODL file, keyed by object identifier.
///
/// Iteration follows file order. A later entry with the same identifier
/// replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdlFile {
    pub objects: IndexMap<ObjectId, RawObject>,
}

impl OdlFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, returning the entry it replaced.
    pub fn insert(&mut self, object: RawObject) -> Option<RawObject> {
        self.objects.insert(object.id.clone(), object)
    }

    /// Builder form of [`OdlFile::insert`].
    pub fn with_object(mut self, object: RawObject) -> Self {
        self.insert(object);
        self
    }

    pub fn get(&self, id: &str) -> Option<&RawObject> {
        self.objects.get(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawObject> {
        self.objects.values()
    }
}

/// One top-level entry of an ODL file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObject {
    pub id: ObjectId,
    /// Kind tag as written in the corpus (e.g. `_Art1_Class`).
    pub tag: SmolStr,
    pub kind: ObjectKind,
    pub declaration: Declaration,
    pub details: Vec<Detail>,
}

impl RawObject {
    /// Create an `Object` entry with no details.
    pub fn new(tag: impl Into<SmolStr>, id: impl Into<ObjectId>) -> Self {
        let tag = tag.into();
        Self {
            id: id.into(),
            kind: ObjectKind::from_tag(&tag),
            tag,
            declaration: Declaration::Object,
            details: Vec::new(),
        }
    }

    /// Create an `Object` entry of a known kind.
    pub fn of_kind(kind: ObjectKind, id: impl Into<ObjectId>) -> Self {
        let tag = kind.tag().unwrap_or("Other");
        Self::new(tag, id)
    }

    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declaration = declaration;
        self
    }

    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.details.push(detail);
        self
    }

    /// Append a Version record with the given label and details.
    pub fn with_version(self, label: impl Into<String>, details: Vec<Detail>) -> Self {
        self.with_detail(Detail::version(label, details))
    }

    /// All Version records of this object, in order.
    pub fn versions(&self) -> impl Iterator<Item = (&str, &[Detail])> {
        self.details.iter().filter_map(|detail| match detail {
            Detail::Version { label, details } => Some((label.as_str(), details.as_slice())),
            _ => None,
        })
    }
}

/// A detail record inside an object or a Version.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Attribute {
        name: SmolStr,
        value: AttributeValue,
    },
    Relationship {
        role: SmolStr,
        target_kind: SmolStr,
        target: ObjectId,
    },
    Version {
        label: String,
        details: Vec<Detail>,
    },
    /// Nested `Configuration` entry (three strings, no body).
    Configuration {
        kind: SmolStr,
        name: String,
        id: ObjectId,
    },
    /// `File Operation Copy` marker.
    File,
}

impl Detail {
    /// Attribute holding a single string.
    pub fn attribute(name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: AttributeValue::Strings(vec![value.into()]),
        }
    }

    /// Attribute with an arbitrary value.
    pub fn attribute_value(name: impl Into<SmolStr>, value: AttributeValue) -> Self {
        Self::Attribute {
            name: name.into(),
            value,
        }
    }

    pub fn relationship(
        role: impl Into<SmolStr>,
        target_kind: ObjectKind,
        target: impl Into<ObjectId>,
    ) -> Self {
        Self::Relationship {
            role: role.into(),
            target_kind: target_kind.tag().unwrap_or("Other").into(),
            target: target.into(),
        }
    }

    pub fn version(label: impl Into<String>, details: Vec<Detail>) -> Self {
        Self::Version {
            label: label.into(),
            details,
        }
    }
}

/// Value of an attribute record.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    /// One or more comma-separated strings.
    Strings(Vec<String>),
    /// A string followed by a nested detail list.
    Nested { value: String, details: Vec<Detail> },
}

impl AttributeValue {
    /// The leading string of the value, if it has one.
    pub fn first_str(&self) -> Option<&str> {
        match self {
            Self::Bool(_) => None,
            Self::Strings(values) => values.first().map(String::as_str),
            Self::Nested { value, .. } => Some(value),
        }
    }

    /// Number of components in the value (one for booleans).
    pub fn arity(&self) -> usize {
        match self {
            Self::Bool(_) => 1,
            Self::Strings(values) => values.len(),
            Self::Nested { .. } => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::schema::role;

    #[test]
    fn test_later_object_replaces_earlier_in_place() {
        let mut file = OdlFile::new()
            .with_object(RawObject::of_kind(ObjectKind::Class, "a"))
            .with_object(RawObject::of_kind(ObjectKind::Class, "b"));
        let replaced = file.insert(RawObject::of_kind(ObjectKind::State, "a"));

        assert_eq!(replaced.unwrap().kind, ObjectKind::Class);
        let order: Vec<_> = file.iter().map(|o| (o.id.as_str(), o.kind)).collect();
        assert_eq!(order, vec![("a", ObjectKind::State), ("b", ObjectKind::Class)]);
    }

    #[test]
    fn test_relationship_builder_uses_kind_tag() {
        let detail = Detail::relationship(role::CLASS_TO_ROLE, ObjectKind::Role, "r1");
        match detail {
            Detail::Relationship { target_kind, .. } => assert_eq!(target_kind, "_Art1_Role"),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_attribute_value_arity() {
        assert_eq!(AttributeValue::Strings(vec!["a".into()]).arity(), 1);
        let nested = AttributeValue::Nested {
            value: "x.rtf".into(),
            details: vec![Detail::File],
        };
        assert_eq!(nested.arity(), 2);
        assert_eq!(nested.first_str(), Some("x.rtf"));
        assert_eq!(AttributeValue::Bool(true).first_str(), None);
    }
}
