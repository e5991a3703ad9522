//! Read-only views over a reconstructed [`Model`].
//!
//! Serializers walk the model through these queries instead of re-deriving
//! structure from the raw records.

use indexmap::IndexSet;

use super::events::EventInfo;
use super::model::Model;
use super::states::StateInfo;
use super::transitions::TransitionInfo;
use crate::base::ObjectId;

/// A transition together with its position among the transitions of its region.
///
/// Entry and exit behaviours take a position too, so numbering matches the
/// region's full transition list.
#[derive(Debug, Clone, Copy)]
pub struct NumberedTransition<'m> {
    pub number: usize,
    pub transition: &'m TransitionInfo,
}

impl Model {
    /// Class name by identifier.
    pub fn class_name(&self, id: &str) -> Option<&str> {
        self.classes.get(id).map(|class| class.name.as_str())
    }

    /// States of `class` without a parent, in file order.
    pub fn outer_states(&self, class: &str) -> Vec<&StateInfo> {
        self.states
            .values()
            .filter(|state| state.class.as_str() == class && state.parent.is_none())
            .collect()
    }

    /// Transitions leaving any of `sources`, excluding entry and exit behaviours.
    pub fn region_transitions<'m>(&'m self, sources: &[&ObjectId]) -> Vec<NumberedTransition<'m>> {
        self.transitions
            .iter()
            .filter(|transition| sources.contains(&&transition.source))
            .enumerate()
            .filter(|(_, transition)| !transition.event.is_behaviour())
            .map(|(number, transition)| NumberedTransition { number, transition })
            .collect()
    }

    /// Entry and exit behaviours of `state`, in transition order.
    pub fn entry_exit(&self, state: &str) -> Vec<&TransitionInfo> {
        self.transitions
            .iter()
            .filter(|transition| transition.source.as_str() == state && transition.event.is_behaviour())
            .collect()
    }

    /// Distinct signal events received by `class`, in order of first use.
    pub fn receptions(&self, class: &str) -> Vec<&EventInfo> {
        let mut seen = IndexSet::new();
        for transition in &self.transitions {
            if transition.class.as_str() != class {
                continue;
            }
            if let Some(event) = transition.event.signal_event() {
                seen.insert(event);
            }
        }
        seen.into_iter().filter_map(|event| self.events.get(event)).collect()
    }

    /// Signal events received by any class, in catalog order.
    pub fn used_signals(&self) -> Vec<&EventInfo> {
        let used: IndexSet<&str> = self
            .transitions
            .iter()
            .filter(|transition| self.classes.contains_key(&transition.class))
            .filter_map(|transition| transition.event.signal_event())
            .collect();
        self.events
            .iter()
            .filter(|event| used.contains(event.id.as_str()))
            .collect()
    }

    /// Substates of `state`, resolved.
    pub fn substates<'m>(&'m self, state: &StateInfo) -> Vec<&'m StateInfo> {
        state
            .substates
            .iter()
            .filter_map(|id| self.states.get(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::classes::ClassInfo;
    use crate::hir::diagnostics::DiagnosticCollector;
    use crate::hir::events::{DESTROY_EVENT_ID, EventCatalog};
    use crate::hir::model::ModelHeader;
    use crate::hir::states::StateKind;
    use crate::hir::transitions::TransitionEvent;
    use crate::hir::types::TypeCatalog;
    use indexmap::IndexMap;

    fn state(id: &str, parent: Option<&str>, substates: &[&str]) -> (ObjectId, StateInfo) {
        (
            id.into(),
            StateInfo {
                id: id.into(),
                name: id.into(),
                kind: StateKind::State,
                class: "c".into(),
                substates: substates.iter().map(|s| ObjectId::from(*s)).collect(),
                parallel: false,
                parent: parent.map(ObjectId::from),
            },
        )
    }

    fn transition(id: &str, source: &str, target: &str, event: TransitionEvent) -> TransitionInfo {
        TransitionInfo {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            class: "c".into(),
            event,
            guard: None,
            action: String::new(),
        }
    }

    fn model() -> Model {
        let class = ClassInfo {
            id: "c".into(),
            name: "Lift".into(),
            superclasses: IndexMap::new(),
            attributes: Vec::new(),
            roles: Vec::new(),
        };
        Model {
            header: ModelHeader {
                id: "1".into(),
                name: "m".into(),
            },
            classes: IndexMap::from([(class.id.clone(), class)]),
            associations: Vec::new(),
            types: TypeCatalog::default(),
            events: EventCatalog::default(),
            states: [
                state("idle", None, &[]),
                state("moving", None, &["up"]),
                state("up", Some("moving"), &[]),
            ]
            .into_iter()
            .collect(),
            transitions: vec![
                transition("entry", "idle", "idle", TransitionEvent::Entry),
                transition("t1", "idle", "moving", TransitionEvent::Signal("go".into())),
                transition("t2", "moving", "idle", TransitionEvent::Destroy),
                transition("t3", "up", "up", TransitionEvent::Signal("go".into())),
            ],
            time_events: Vec::new(),
            change_events: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    #[test]
    fn test_outer_states_and_regions() {
        let model = model();
        let outer: Vec<_> = model.outer_states("c").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(outer, vec!["idle", "moving"]);

        let ids: Vec<_> = model.outer_states("c").into_iter().map(|s| &s.id).collect();
        let numbered: Vec<_> = model
            .region_transitions(&ids)
            .into_iter()
            .map(|n| (n.number, n.transition.id.as_str()))
            .collect();
        assert_eq!(numbered, vec![(1, "t1"), (2, "t2")]);
    }

    #[test]
    fn test_entry_exit_behaviours() {
        let model = model();
        let behaviours: Vec<_> = model.entry_exit("idle").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(behaviours, vec!["entry"]);
        assert!(model.entry_exit("moving").is_empty());
    }

    #[test]
    fn test_receptions_are_distinct() {
        let model = model();
        // "go" is not in the catalog, only the destroy event is.
        let receptions: Vec<_> = model.receptions("c").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(receptions, vec![DESTROY_EVENT_ID]);
        assert_eq!(model.used_signals().len(), 1);
    }

    #[test]
    fn test_substates() {
        let model = model();
        let moving = &model.states["moving"];
        let subs: Vec<_> = model.substates(moving).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(subs, vec!["up"]);
    }
}
