//! Classes, inheritance and attributes.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::batch::map_in_order;
use super::diagnostics::DiagnosticCollector;
use super::error::{ExtractError, Result};
use super::text::TextResolver;
use crate::base::ObjectId;
use crate::base::schema::{DEFAULT_VALUE_PROPERTY, ObjectKind, attr, role};
use crate::index::{ObjectIndex, VersionView};

/// Reference to the declared type of an attribute or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Kind tag of the type object as written in the corpus.
    pub kind: SmolStr,
    pub id: ObjectId,
}

/// A class attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub id: ObjectId,
    pub name: SmolStr,
    /// Resolved default value text.
    pub default: Option<String>,
    pub ty: Option<TypeRef>,
}

/// A class with its inheritance links and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub id: ObjectId,
    pub name: SmolStr,
    /// Superclass identifier → generalization identifier.
    pub superclasses: IndexMap<ObjectId, ObjectId>,
    pub attributes: Vec<AttributeInfo>,
    /// Roles owned by this class, in declaration order.
    pub roles: Vec<ObjectId>,
}

/// All classes of the corpus, optionally restricted to `scope`.
///
/// The result maps class identifiers to their normalized names, in file order.
pub fn collect_classes(
    index: &ObjectIndex<'_>,
    scope: Option<&IndexSet<ObjectId>>,
) -> Result<IndexMap<ObjectId, SmolStr>> {
    let mut classes = IndexMap::new();
    for id in index.ids_of_kind(ObjectKind::Class) {
        if scope.is_some_and(|scope| !scope.contains(id)) {
            continue;
        }
        classes.insert(id.clone(), index.name(id)?);
    }
    Ok(classes)
}

/// Resolve the superclasses of every class in `classes`.
///
/// A superclass reaches its subclass in three hops: the superclass owns a
/// Generalization object, which references a Specialization anchor, which the
/// subclass owns. The anchor's identifier is recorded as the generalization
/// identifier. Superclasses outside `classes` are dropped with a warning.
pub fn resolve_superclasses(
    index: &ObjectIndex<'_>,
    classes: &IndexMap<ObjectId, SmolStr>,
    diagnostics: &mut DiagnosticCollector,
) -> Result<FxHashMap<ObjectId, IndexMap<ObjectId, ObjectId>>> {
    // Generalization object → superclass
    let mut general: FxHashMap<&ObjectId, &ObjectId> = FxHashMap::default();
    for class in index.ids_of_kind(ObjectKind::Class) {
        let version = index.version(class)?;
        for generalization in version.targets(role::CLASS_TO_GENERALIZATION, ObjectKind::Generalization) {
            general.insert(generalization, class);
        }
    }

    // Specialization anchor → Generalization object
    let mut special_gen: FxHashMap<&ObjectId, &ObjectId> = FxHashMap::default();
    for generalization in index.ids_of_kind(ObjectKind::Generalization) {
        let version = index.version(generalization)?;
        for special in version.targets(role::GENERALIZATION_TO_SPECIALIZATION, ObjectKind::Specialization) {
            special_gen.insert(special, generalization);
        }
    }

    let mut superclasses = FxHashMap::default();
    for class in classes.keys() {
        let version = index.version(class)?;
        let mut supers = IndexMap::new();
        for special in version.targets(role::CLASS_TO_SPECIALIZATION, ObjectKind::Specialization) {
            let generalization =
                special_gen
                    .get(special)
                    .ok_or_else(|| ExtractError::UnresolvedReference {
                        from: class.clone(),
                        target: special.clone(),
                    })?;
            let superclass =
                general
                    .get(generalization)
                    .ok_or_else(|| ExtractError::UnresolvedReference {
                        from: special.clone(),
                        target: (*generalization).clone(),
                    })?;
            if !classes.contains_key(*superclass) {
                diagnostics.superclass_out_of_scope(class, superclass);
                continue;
            }
            supers.insert((*superclass).clone(), special.clone());
        }
        superclasses.insert(class.clone(), supers);
    }

    tracing::debug!(classes = classes.len(), "resolved generalizations");
    Ok(superclasses)
}

/// Build every class in scope with its superclasses, attributes and roles.
pub fn resolve_classes<'f>(
    index: &ObjectIndex<'f>,
    text: &TextResolver<'_, 'f>,
    scope: Option<&IndexSet<ObjectId>>,
    parallel: bool,
    diagnostics: &mut DiagnosticCollector,
) -> Result<IndexMap<ObjectId, ClassInfo>> {
    let names = collect_classes(index, scope)?;
    let mut superclasses = resolve_superclasses(index, &names, diagnostics)?;
    let mut attributes = resolve_attributes(index, text, &names, parallel, diagnostics)?;

    let mut classes = IndexMap::with_capacity(names.len());
    for (id, name) in names {
        let roles = index
            .version(&id)?
            .targets(role::CLASS_TO_ROLE, ObjectKind::Role)
            .cloned()
            .collect();
        let info = ClassInfo {
            id: id.clone(),
            name,
            superclasses: superclasses.remove(&id).unwrap_or_default(),
            attributes: attributes.remove(&id).unwrap_or_default(),
            roles,
        };
        classes.insert(id, info);
    }
    tracing::debug!(classes = classes.len(), "resolved classes");
    Ok(classes)
}

/// Declared type of an attribute or parameter: the first typed relationship.
pub fn declared_type(version: &VersionView<'_>) -> Option<TypeRef> {
    version
        .first_of_roles(&[role::TYPED_ATTRIBUTE_TO_DATA_TYPE, role::TYPED_PARAMETER_TO_DATA_TYPE])
        .map(|(kind, id)| TypeRef {
            kind: kind.into(),
            id: id.clone(),
        })
}

/// Resolve the attributes of every class, in class then declaration order.
pub fn resolve_attributes<'f>(
    index: &ObjectIndex<'f>,
    text: &TextResolver<'_, 'f>,
    classes: &IndexMap<ObjectId, SmolStr>,
    parallel: bool,
    diagnostics: &mut DiagnosticCollector,
) -> Result<FxHashMap<ObjectId, Vec<AttributeInfo>>> {
    let mut work = Vec::new();
    for class in classes.keys() {
        let version = index.version(class)?;
        for attribute in version.targets(role::CLASS_TO_ATTRIBUTE, ObjectKind::Attribute) {
            work.push((class, attribute));
        }
    }

    let resolved = map_in_order(&work, parallel, diagnostics, |(class, attribute), diagnostics| {
        resolve_attribute(index, text, class, attribute, diagnostics)
    })?;

    let mut attributes: FxHashMap<ObjectId, Vec<AttributeInfo>> =
        classes.keys().map(|class| (class.clone(), Vec::new())).collect();
    for ((class, _), info) in work.into_iter().zip(resolved) {
        if let Some(list) = attributes.get_mut(class) {
            list.push(info);
        }
    }
    Ok(attributes)
}

fn resolve_attribute<'f>(
    index: &ObjectIndex<'f>,
    text: &TextResolver<'_, 'f>,
    class: &ObjectId,
    attribute: &ObjectId,
    diagnostics: &mut DiagnosticCollector,
) -> Result<AttributeInfo> {
    let version = index.version(attribute)?;
    let ty = declared_type(&version);
    if ty.is_none() {
        diagnostics.missing_attribute_type(attribute, version.plain_name(), index.plain_name(class)?);
    }

    Ok(AttributeInfo {
        id: attribute.clone(),
        name: version.name(),
        default: default_value(index, text, &version, class, diagnostics)?,
        ty,
    })
}

/// Text of the custom property named "Default Value", if the attribute has one.
fn default_value<'f>(
    index: &ObjectIndex<'f>,
    text: &TextResolver<'_, 'f>,
    version: &VersionView<'f>,
    class: &ObjectId,
    diagnostics: &mut DiagnosticCollector,
) -> Result<Option<String>> {
    for property in version.targets(
        role::MODEL_OBJECT_TO_CUSTOM_PROPERTY_TEXT_OBJECT,
        ObjectKind::CustomPropertyTextObject,
    ) {
        let property = index.version(property)?;
        if property.attribute_str(attr::CUSTOM_PROPERTY_NAME) == Some(DEFAULT_VALUE_PROPERTY) {
            return text.resolve(&property, class, diagnostics).map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::diagnostics::codes;
    use crate::hir::text::{MemoryContent, PlainText};
    use crate::syntax::{Detail, OdlFile, RawObject};

    fn class(id: &str, name: &str, details: Vec<Detail>) -> RawObject {
        RawObject::of_kind(ObjectKind::Class, id).with_version(format!("Name: {name}"), details)
    }

    /// Animal <- Dog, via generalization `g1` and specialization anchor `s1`.
    fn inheritance() -> Vec<RawObject> {
        vec![
            class(
                "animal",
                "Animal",
                vec![Detail::relationship(role::CLASS_TO_GENERALIZATION, ObjectKind::Generalization, "g1")],
            ),
            class(
                "dog",
                "Dog",
                vec![Detail::relationship(role::CLASS_TO_SPECIALIZATION, ObjectKind::Specialization, "s1")],
            ),
            RawObject::of_kind(ObjectKind::Generalization, "g1").with_version(
                "Gen:  ",
                vec![Detail::relationship(
                    role::GENERALIZATION_TO_SPECIALIZATION,
                    ObjectKind::Specialization,
                    "s1",
                )],
            ),
            RawObject::of_kind(ObjectKind::Specialization, "s1").with_version("Spec: ", vec![]),
        ]
    }

    fn file_of(objects: Vec<RawObject>) -> OdlFile {
        objects.into_iter().fold(OdlFile::new(), OdlFile::with_object)
    }

    #[test]
    fn test_three_hop_generalization() {
        let file = file_of(inheritance());
        let index = ObjectIndex::new(&file);
        let classes = collect_classes(&index, None).unwrap();
        let mut diagnostics = DiagnosticCollector::new();

        let supers = resolve_superclasses(&index, &classes, &mut diagnostics).unwrap();
        let dog = &supers[&ObjectId::from("dog")];
        assert_eq!(dog.get("animal").map(ObjectId::as_str), Some("s1"));
        assert!(supers[&ObjectId::from("animal")].is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_generalization_is_order_independent() {
        let mut objects = inheritance();
        objects.reverse();
        let file = file_of(objects);
        let index = ObjectIndex::new(&file);
        let classes = collect_classes(&index, None).unwrap();

        let supers = resolve_superclasses(&index, &classes, &mut DiagnosticCollector::new()).unwrap();
        assert_eq!(supers[&ObjectId::from("dog")].get("animal").map(ObjectId::as_str), Some("s1"));
    }

    #[test]
    fn test_dangling_specialization_is_fatal() {
        let mut objects = inheritance();
        objects.retain(|object| object.id.as_str() != "g1");
        let file = file_of(objects);
        let index = ObjectIndex::new(&file);
        let classes = collect_classes(&index, None).unwrap();

        let err = resolve_superclasses(&index, &classes, &mut DiagnosticCollector::new()).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::UnresolvedReference { from, target }
                if from.as_str() == "dog" && target.as_str() == "s1"
        ));
    }

    #[test]
    fn test_superclass_out_of_scope_is_dropped() {
        let file = file_of(inheritance());
        let index = ObjectIndex::new(&file);
        let scope = IndexSet::from([ObjectId::from("dog")]);
        let classes = collect_classes(&index, Some(&scope)).unwrap();
        let mut diagnostics = DiagnosticCollector::new();

        let supers = resolve_superclasses(&index, &classes, &mut diagnostics).unwrap();
        assert!(supers[&ObjectId::from("dog")].is_empty());
        assert_eq!(diagnostics.with_code(codes::SUPERCLASS_OUT_OF_SCOPE).count(), 1);
    }

    #[test]
    fn test_attributes_with_type_and_default() {
        let file = file_of(vec![
            class(
                "c",
                "Counter",
                vec![
                    Detail::relationship(role::CLASS_TO_ATTRIBUTE, ObjectKind::Attribute, "a1"),
                    Detail::relationship(role::CLASS_TO_ATTRIBUTE, ObjectKind::Attribute, "a2"),
                ],
            ),
            RawObject::of_kind(ObjectKind::Attribute, "a1").with_version(
                "Attr: count",
                vec![
                    Detail::relationship(role::TYPED_ATTRIBUTE_TO_DATA_TYPE, ObjectKind::BasicType, "int"),
                    Detail::relationship(
                        role::MODEL_OBJECT_TO_CUSTOM_PROPERTY_TEXT_OBJECT,
                        ObjectKind::CustomPropertyTextObject,
                        "p1",
                    ),
                ],
            ),
            RawObject::of_kind(ObjectKind::Attribute, "a2").with_version("Attr: /total", vec![]),
            RawObject::of_kind(ObjectKind::CustomPropertyTextObject, "p1").with_version(
                "Prop: ",
                vec![
                    Detail::attribute(attr::CUSTOM_PROPERTY_NAME, DEFAULT_VALUE_PROPERTY),
                    Detail::attribute(attr::RTF, "0"),
                ],
            ),
        ]);
        let index = ObjectIndex::new(&file);
        let content = MemoryContent::new();
        let text = TextResolver::new(&index, &content, &PlainText);
        let classes = collect_classes(&index, None).unwrap();
        let mut diagnostics = DiagnosticCollector::new();

        let attributes = resolve_attributes(&index, &text, &classes, true, &mut diagnostics).unwrap();
        let list = &attributes[&ObjectId::from("c")];
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "count");
        assert_eq!(list[0].default.as_deref(), Some("0"));
        assert_eq!(
            list[0].ty,
            Some(TypeRef {
                kind: "_Art1_BasicType".into(),
                id: "int".into()
            })
        );
        assert_eq!(list[1].name, "/total");
        assert_eq!(list[1].ty, None);
        assert_eq!(diagnostics.with_code(codes::MISSING_TYPE).count(), 1);
    }
}
