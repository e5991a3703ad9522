//! Typed access to a Version record.

use smol_str::SmolStr;

use crate::base::schema::{ObjectKind, VERSION_LABEL_HEADER_LEN};
use crate::base::{ObjectId, normalize_name};
use crate::syntax::{AttributeValue, Detail};

/// Borrowed view of an object's Version record.
#[derive(Clone, Copy, Debug)]
pub struct VersionView<'f> {
    id: &'f ObjectId,
    label: &'f str,
    details: &'f [Detail],
}

impl<'f> VersionView<'f> {
    pub(crate) fn new(id: &'f ObjectId, label: &'f str, details: &'f [Detail]) -> Self {
        Self { id, label, details }
    }

    /// Identifier of the owning object.
    pub fn id(&self) -> &'f ObjectId {
        self.id
    }

    pub fn label(&self) -> &'f str {
        self.label
    }

    pub fn details(&self) -> &'f [Detail] {
        self.details
    }

    /// The label without its fixed-width header.
    pub fn plain_name(&self) -> &'f str {
        match self.label.char_indices().nth(VERSION_LABEL_HEADER_LEN) {
            Some((offset, _)) => &self.label[offset..],
            None => "",
        }
    }

    /// The normalized display name.
    pub fn name(&self) -> SmolStr {
        normalize_name(self.plain_name())
    }

    /// Value of the first attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&'f AttributeValue> {
        self.details.iter().find_map(|detail| match detail {
            Detail::Attribute { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    /// Leading string of the first attribute with the given name.
    pub fn attribute_str(&self, name: &str) -> Option<&'f str> {
        self.attribute(name).and_then(AttributeValue::first_str)
    }

    /// All relationships with the given role as `(target kind tag, target)`.
    pub fn relationships<'a>(
        &'a self,
        role: &'a str,
    ) -> impl Iterator<Item = (&'f str, &'f ObjectId)> + 'a {
        self.details.iter().filter_map(move |detail| match detail {
            Detail::Relationship {
                role: r,
                target_kind,
                target,
            } if r == role => Some((target_kind.as_str(), target)),
            _ => None,
        })
    }

    /// Targets of relationships with the given role and target kind.
    pub fn targets<'a>(
        &'a self,
        role: &'a str,
        kind: ObjectKind,
    ) -> impl Iterator<Item = &'f ObjectId> + 'a {
        let tag = kind.tag();
        self.relationships(role)
            .filter(move |(target_kind, _)| Some(*target_kind) == tag)
            .map(|(_, target)| target)
    }

    /// Last target with the given role and target kind.
    ///
    /// Single-valued relationships that appear more than once resolve to the
    /// last occurrence.
    pub fn target(&self, role: &str, kind: ObjectKind) -> Option<&'f ObjectId> {
        self.targets(role, kind).last()
    }

    /// First relationship with any of the given roles, as `(target kind tag, target)`.
    pub fn first_of_roles(&self, roles: &[&str]) -> Option<(&'f str, &'f ObjectId)> {
        self.details.iter().find_map(|detail| match detail {
            Detail::Relationship {
                role,
                target_kind,
                target,
            } if roles.contains(&role.as_str()) => Some((target_kind.as_str(), target)),
            _ => None,
        })
    }
}
