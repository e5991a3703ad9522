//! State hierarchy of the per-class state machines.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::error::{ExtractError, Result};
use crate::base::ObjectId;
use crate::base::schema::{ObjectKind, attr, role};
use crate::index::ObjectIndex;

/// Visual kind of a state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StateKind {
    #[default]
    State,
    Pseudostate,
    FinalState,
}

impl StateKind {
    fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("0") => Self::Pseudostate,
            Some("1") => Self::FinalState,
            _ => Self::State,
        }
    }

    /// UML metaclass of the kind.
    pub fn uml_type(&self) -> &'static str {
        match self {
            Self::State => "uml:State",
            Self::Pseudostate => "uml:Pseudostate",
            Self::FinalState => "uml:FinalState",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInfo {
    pub id: ObjectId,
    pub name: SmolStr,
    pub kind: StateKind,
    /// Class whose state machine contains the state.
    pub class: ObjectId,
    pub substates: Vec<ObjectId>,
    /// Whether the substates are orthogonal regions.
    pub parallel: bool,
    pub parent: Option<ObjectId>,
}

struct Draft {
    name: SmolStr,
    kind: StateKind,
    class: Option<ObjectId>,
    substates: Vec<ObjectId>,
    parallel: bool,
    parent: Option<ObjectId>,
}

/// Build the states of the classes in `classes`, in file order.
///
/// Simple nesting comes from SuperState→SubStates. A state that is also
/// bound to a composite through ConcurrentStates→CompositeState moves under
/// that composite, which becomes parallel.
pub fn resolve_states<V>(
    index: &ObjectIndex<'_>,
    classes: &IndexMap<ObjectId, V>,
) -> Result<IndexMap<ObjectId, StateInfo>> {
    let mut drafts: IndexMap<ObjectId, Draft> = IndexMap::new();
    for id in index.ids_of_kind(ObjectKind::State) {
        let version = index.version(id)?;
        drafts.insert(
            id.clone(),
            Draft {
                name: version.name(),
                kind: StateKind::from_code(version.attribute_str(attr::STATE_TYPE)),
                class: version.target(role::STATES_TO_CLASS, ObjectKind::Class).cloned(),
                substates: version
                    .targets(role::SUPER_STATE_TO_SUB_STATES, ObjectKind::State)
                    .cloned()
                    .collect(),
                parallel: false,
                parent: None,
            },
        );
    }

    let nesting: Vec<(ObjectId, ObjectId)> = drafts
        .iter()
        .flat_map(|(id, draft)| draft.substates.iter().map(move |sub| (id.clone(), sub.clone())))
        .collect();
    for (parent, sub) in nesting {
        let draft = drafts.get_mut(&sub).ok_or_else(|| ExtractError::UnresolvedReference {
            from: parent.clone(),
            target: sub.clone(),
        })?;
        draft.parent = Some(parent);
    }

    for id in index.ids_of_kind(ObjectKind::State) {
        let version = index.version(id)?;
        for composite in version.targets(role::CONCURRENT_STATES_TO_COMPOSITE_STATE, ObjectKind::State) {
            if !drafts.contains_key(composite) {
                return Err(ExtractError::UnresolvedReference {
                    from: id.clone(),
                    target: composite.clone(),
                });
            }
            reparent(&mut drafts, id, composite);
        }
    }

    let states: IndexMap<ObjectId, StateInfo> = drafts
        .into_iter()
        .filter_map(|(id, draft)| {
            let class = draft.class.filter(|class| classes.contains_key(class))?;
            Some((
                id.clone(),
                StateInfo {
                    id,
                    name: draft.name,
                    kind: draft.kind,
                    class,
                    substates: draft.substates,
                    parallel: draft.parallel,
                    parent: draft.parent,
                },
            ))
        })
        .collect();

    check_acyclic(&states)?;
    tracing::debug!(states = states.len(), "resolved states");
    Ok(states)
}

/// Move `state` under the parallel `composite`.
fn reparent(drafts: &mut IndexMap<ObjectId, Draft>, state: &ObjectId, composite: &ObjectId) {
    let previous = drafts.get(state).and_then(|draft| draft.parent.clone());
    if let Some(previous) = previous.filter(|previous| previous != composite) {
        if let Some(draft) = drafts.get_mut(&previous) {
            draft.substates.retain(|sub| sub != state);
        }
    }
    if let Some(draft) = drafts.get_mut(composite) {
        if !draft.substates.contains(state) {
            draft.substates.push(state.clone());
        }
        draft.parallel = true;
    }
    if let Some(draft) = drafts.get_mut(state) {
        draft.parent = Some(composite.clone());
    }
}

fn check_acyclic(states: &IndexMap<ObjectId, StateInfo>) -> Result<()> {
    for start in states.keys() {
        let mut seen = FxHashSet::default();
        let mut current = Some(start);
        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(ExtractError::StateCycle { id: id.clone() });
            }
            current = states.get(id).and_then(|state| state.parent.as_ref());
        }
    }
    Ok(())
}
