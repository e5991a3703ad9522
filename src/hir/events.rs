//! Signal events, their parameters, and the time/change events of transitions.

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use super::classes::{TypeRef, declared_type};
use super::diagnostics::DiagnosticCollector;
use super::error::Result;
use super::transitions::{TransitionEvent, TransitionInfo};
use crate::base::ObjectId;
use crate::base::schema::{ObjectKind, role};
use crate::index::ObjectIndex;

/// Identifier of the synthetic event that destroys an instance.
pub const DESTROY_EVENT_ID: &str = "__destroy__";

/// Name of the synthetic destroy event.
pub const DESTROY_EVENT_NAME: &str = "<<Destroy>>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub id: ObjectId,
    pub name: SmolStr,
    pub ty: Option<TypeRef>,
}

/// A signal event with its parameters in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInfo {
    pub id: ObjectId,
    pub name: SmolStr,
    pub parameters: Vec<ParameterInfo>,
}

impl EventInfo {
    /// The synthetic destroy event.
    pub fn destroy() -> Self {
        Self {
            id: ObjectId::from(DESTROY_EVENT_ID),
            name: SmolStr::new_static(DESTROY_EVENT_NAME),
            parameters: Vec::new(),
        }
    }

    pub fn is_destroy(&self) -> bool {
        self.id.as_str() == DESTROY_EVENT_ID
    }
}

/// Signal events known to the model, keyed by identifier.
///
/// The destroy event is always present and comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCatalog {
    events: IndexMap<ObjectId, EventInfo>,
}

impl Default for EventCatalog {
    fn default() -> Self {
        let destroy = EventInfo::destroy();
        Self {
            events: IndexMap::from([(destroy.id.clone(), destroy)]),
        }
    }
}

impl EventCatalog {
    pub fn get(&self, id: &str) -> Option<&EventInfo> {
        self.events.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.events.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventInfo> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Add an event, replacing any event with the same identifier.
    pub fn insert(&mut self, event: EventInfo) {
        self.events.insert(event.id.clone(), event);
    }
}

/// Collect signal events, optionally restricted to `scope`.
pub fn collect_events(
    index: &ObjectIndex<'_>,
    scope: Option<&IndexSet<ObjectId>>,
    diagnostics: &mut DiagnosticCollector,
) -> Result<EventCatalog> {
    let mut catalog = EventCatalog::default();
    for id in index.ids_of_kind(ObjectKind::Event) {
        if scope.is_some_and(|scope| !scope.contains(id)) {
            continue;
        }
        catalog.insert(resolve_event(index, id, diagnostics)?);
    }
    tracing::debug!(events = catalog.len(), "collected events");
    Ok(catalog)
}

/// Add signal events that transitions use but the catalog lacks.
///
/// Each addition is reported, since it means the selected package refers
/// to an event declared elsewhere.
pub fn complete_signal_events(
    index: &ObjectIndex<'_>,
    catalog: &mut EventCatalog,
    transitions: &[TransitionInfo],
    diagnostics: &mut DiagnosticCollector,
) -> Result<()> {
    for transition in transitions {
        let Some(event) = transition.event.signal() else {
            continue;
        };
        if catalog.contains(event) {
            continue;
        }
        let info = resolve_event(index, event, diagnostics)?;
        diagnostics.unlinked_signal_event(event, index.plain_name(event)?);
        catalog.insert(info);
    }
    Ok(())
}

fn resolve_event(
    index: &ObjectIndex<'_>,
    id: &ObjectId,
    diagnostics: &mut DiagnosticCollector,
) -> Result<EventInfo> {
    let version = index.version(id)?;
    let mut parameters = Vec::new();
    for parameter in version.targets(role::EVENT_TO_PARAMETER, ObjectKind::Parameter) {
        let parameter_version = index.version(parameter)?;
        let ty = declared_type(&parameter_version);
        if ty.is_none() {
            diagnostics.missing_parameter_type(parameter, parameter_version.plain_name(), version.plain_name());
        }
        parameters.push(ParameterInfo {
            id: parameter.clone(),
            name: parameter_version.name(),
            ty,
        });
    }
    Ok(EventInfo {
        id: id.clone(),
        name: version.name(),
        parameters,
    })
}

/// A time event triggering a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEventInfo {
    pub transition: ObjectId,
    pub expression: String,
}

/// A change event triggering a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEventInfo {
    pub transition: ObjectId,
    pub expression: String,
}

/// Time and change events, one per transition that uses them, in transition order.
pub fn timed_events(transitions: &[TransitionInfo]) -> (Vec<TimeEventInfo>, Vec<ChangeEventInfo>) {
    let mut times = Vec::new();
    let mut changes = Vec::new();
    for transition in transitions {
        match &transition.event {
            TransitionEvent::Time(expression) => times.push(TimeEventInfo {
                transition: transition.id.clone(),
                expression: expression.clone(),
            }),
            TransitionEvent::Change(expression) => changes.push(ChangeEventInfo {
                transition: transition.id.clone(),
                expression: expression.clone(),
            }),
            _ => {}
        }
    }
    (times, changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::diagnostics::codes;
    use crate::syntax::{Detail, OdlFile, RawObject};

    fn file() -> OdlFile {
        OdlFile::new()
            .with_object(RawObject::of_kind(ObjectKind::Event, "go").with_version(
                "Event:Go",
                vec![
                    Detail::relationship(role::EVENT_TO_PARAMETER, ObjectKind::Parameter, "p1"),
                    Detail::relationship(role::EVENT_TO_PARAMETER, ObjectKind::Parameter, "p2"),
                ],
            ))
            .with_object(RawObject::of_kind(ObjectKind::Event, "stop").with_version("Event:Stop", vec![]))
            .with_object(RawObject::of_kind(ObjectKind::Parameter, "p1").with_version(
                "Param:speed",
                vec![Detail::relationship(role::TYPED_PARAMETER_TO_DATA_TYPE, ObjectKind::BasicType, "int")],
            ))
            .with_object(RawObject::of_kind(ObjectKind::Parameter, "p2").with_version("Param:note", vec![]))
    }

    #[test]
    fn test_catalog_starts_with_destroy() {
        let file = file();
        let index = ObjectIndex::new(&file);
        let mut diagnostics = DiagnosticCollector::new();

        let catalog = collect_events(&index, None, &mut diagnostics).unwrap();
        let names: Vec<_> = catalog.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["<<Destroy>>", "Go", "Stop"]);
        assert!(catalog.iter().next().unwrap().is_destroy());
    }

    #[test]
    fn test_parameters_with_types() {
        let file = file();
        let index = ObjectIndex::new(&file);
        let mut diagnostics = DiagnosticCollector::new();

        let catalog = collect_events(&index, None, &mut diagnostics).unwrap();
        let go = catalog.get("go").unwrap();
        assert_eq!(go.parameters.len(), 2);
        assert_eq!(go.parameters[0].ty.as_ref().map(|t| t.id.as_str()), Some("int"));
        assert_eq!(go.parameters[1].ty, None);
        assert_eq!(diagnostics.with_code(codes::MISSING_TYPE).count(), 1);
    }

    #[test]
    fn test_scope_restricts_events() {
        let file = file();
        let index = ObjectIndex::new(&file);
        let scope = IndexSet::from([ObjectId::from("stop")]);

        let catalog = collect_events(&index, Some(&scope), &mut DiagnosticCollector::new()).unwrap();
        assert!(catalog.contains("stop"));
        assert!(!catalog.contains("go"));
        assert!(catalog.contains(DESTROY_EVENT_ID));
    }
}
