//! Transitions and the event-action blocks that decorate them.

use indexmap::IndexMap;

use super::batch::map_in_order;
use super::diagnostics::DiagnosticCollector;
use super::error::{ExtractError, Result};
use super::events::DESTROY_EVENT_ID;
use super::states::StateInfo;
use super::text::TextResolver;
use crate::base::ObjectId;
use crate::base::schema::{ObjectKind, attr, role};
use crate::index::{ObjectIndex, VersionView};

/// Action text of a destroy transition.
pub const DESTROY_ACTION: &str = "delete self";

/// What triggers a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransitionEvent {
    /// Completion transition.
    #[default]
    None,
    /// Behaviour executed on entering the state.
    Entry,
    /// Behaviour executed on leaving the state.
    Exit,
    Signal(ObjectId),
    /// A signal handled in place, without leaving the state.
    SignalInternal(ObjectId),
    Time(String),
    Change(String),
    Destroy,
}

impl TransitionEvent {
    /// Event of a signal-triggered transition.
    pub fn signal(&self) -> Option<&ObjectId> {
        match self {
            Self::Signal(event) | Self::SignalInternal(event) => Some(event),
            _ => None,
        }
    }

    /// Signal event that triggers the transition, including the synthetic
    /// destroy event.
    pub fn signal_event(&self) -> Option<&str> {
        match self {
            Self::Destroy => Some(DESTROY_EVENT_ID),
            other => other.signal().map(ObjectId::as_str),
        }
    }

    /// Whether the event is executed as state behaviour rather than a transition.
    pub fn is_behaviour(&self) -> bool {
        matches!(self, Self::Entry | Self::Exit)
    }

    fn from_code(code: Option<i64>) -> Option<Self> {
        match code {
            None | Some(8) => Some(Self::None),
            Some(4) => Some(Self::Entry),
            Some(5) => Some(Self::Exit),
            Some(7) => Some(Self::Destroy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub id: ObjectId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionInfo {
    pub id: ObjectId,
    pub source: ObjectId,
    pub target: ObjectId,
    /// Class owning the source state.
    pub class: ObjectId,
    pub event: TransitionEvent,
    pub guard: Option<Guard>,
    pub action: String,
}

#[derive(Default)]
struct Draft {
    source: Option<ObjectId>,
    target: Option<ObjectId>,
    class: Option<ObjectId>,
}

/// Decoration an event-action block contributes to one transition.
struct Decoration {
    transition: ObjectId,
    event: TransitionEvent,
    guard: Option<Guard>,
    action: String,
}

/// Build the transitions between `states`.
///
/// Transition objects contribute their target, the source state the
/// source and class. Every event-action block attached directly to a
/// state adds a self-transition named after the block. Only transitions
/// whose endpoints are both in `states` are kept. Event-action blocks then
/// decorate their transition in file order; a later block wins.
pub fn resolve_transitions<'f>(
    index: &ObjectIndex<'f>,
    text: &TextResolver<'_, 'f>,
    states: &IndexMap<ObjectId, StateInfo>,
    parallel: bool,
    diagnostics: &mut DiagnosticCollector,
) -> Result<Vec<TransitionInfo>> {
    let mut drafts: IndexMap<ObjectId, Draft> = IndexMap::new();
    for id in index.ids_of_kind(ObjectKind::Transition) {
        let version = index.version(id)?;
        drafts.insert(
            id.clone(),
            Draft {
                target: version.target(role::TRANSITION_END_TO_END_STATE, ObjectKind::State).cloned(),
                ..Draft::default()
            },
        );
    }

    for (id, state) in states {
        let version = index.version(id)?;
        for transition in version.targets(role::START_STATE_TO_TRANSITION_START, ObjectKind::Transition) {
            let draft = drafts
                .get_mut(transition)
                .ok_or_else(|| ExtractError::UnresolvedReference {
                    from: id.clone(),
                    target: transition.clone(),
                })?;
            draft.source = Some(id.clone());
            draft.class = Some(state.class.clone());
        }
        for block in version.targets(role::STATE_TO_EVENT_ACTION_BLOCK, ObjectKind::EventActionBlock) {
            drafts.insert(
                block.clone(),
                Draft {
                    source: Some(id.clone()),
                    target: Some(id.clone()),
                    class: Some(state.class.clone()),
                },
            );
        }
    }

    let mut transitions: IndexMap<ObjectId, TransitionInfo> = drafts
        .into_iter()
        .filter_map(|(id, draft)| {
            let target = draft.target.filter(|target| states.contains_key(target))?;
            Some((
                id.clone(),
                TransitionInfo {
                    id,
                    source: draft.source?,
                    target,
                    class: draft.class?,
                    event: TransitionEvent::None,
                    guard: None,
                    action: String::new(),
                },
            ))
        })
        .collect();

    let mut blocks = Vec::new();
    for id in index.ids_of_kind(ObjectKind::EventActionBlock) {
        let version = index.version(id)?;
        let decorated = version
            .target(role::EVENT_ACTION_BLOCK_TO_TRANSITION, ObjectKind::Transition)
            .unwrap_or(id);
        if let Some(transition) = transitions.get(decorated) {
            blocks.push((version, transition.id.clone(), transition.class.clone()));
        }
    }

    let decorations = map_in_order(&blocks, parallel, diagnostics, |(block, transition, class), diagnostics| {
        decorate(index, text, block, transition, class, diagnostics)
    })?;
    for decoration in decorations {
        if let Some(transition) = transitions.get_mut(&decoration.transition) {
            transition.event = decoration.event;
            transition.guard = decoration.guard;
            transition.action = decoration.action;
        }
    }

    tracing::debug!(transitions = transitions.len(), "resolved transitions");
    Ok(transitions.into_values().collect())
}

fn decorate<'f>(
    index: &ObjectIndex<'f>,
    text: &TextResolver<'_, 'f>,
    block: &VersionView<'f>,
    transition: &ObjectId,
    class: &ObjectId,
    diagnostics: &mut DiagnosticCollector,
) -> Result<Decoration> {
    let code = match block.attribute_str(attr::EVENT_TYPE) {
        Some(code) => Some(code.trim().parse::<i64>().map_err(|_| ExtractError::InvalidAttribute {
            id: block.id().clone(),
            name: attr::EVENT_TYPE,
            value: code.to_string(),
        })?),
        None => None,
    };

    let guard = match block.target(role::EVENT_ACTION_BLOCK_TO_GUARD_CONDITION, ObjectKind::GuardCondition) {
        Some(id) => Some(Guard {
            id: id.clone(),
            text: text.resolve(&index.version(id)?, class, diagnostics)?,
        }),
        None => None,
    };

    let event = match code {
        Some(0) => {
            let event = required(block, role::EVENT_ACTION_BLOCK_TO_SIGNAL_EVENT, ObjectKind::Event)?;
            if block.id() == transition {
                TransitionEvent::SignalInternal(event.clone())
            } else {
                TransitionEvent::Signal(event.clone())
            }
        }
        Some(code @ (2 | 3)) => {
            let change = required(block, role::EVENT_ACTION_BLOCK_TO_CHANGE_EVENT, ObjectKind::ChangeEvent)?;
            let expression = text.resolve(&index.version(change)?, class, diagnostics)?;
            if code == 2 {
                TransitionEvent::Time(expression)
            } else {
                TransitionEvent::Change(expression)
            }
        }
        other => TransitionEvent::from_code(other).ok_or_else(|| ExtractError::UnknownEventType {
            block: block.id().clone(),
            code: other.unwrap_or_default(),
        })?,
    };

    let action = if event == TransitionEvent::Destroy {
        DESTROY_ACTION.to_string()
    } else {
        text.resolve(block, class, diagnostics)?
    };

    Ok(Decoration {
        transition: transition.clone(),
        event,
        guard,
        action,
    })
}

fn required<'f>(block: &VersionView<'f>, role: &'static str, kind: ObjectKind) -> Result<&'f ObjectId> {
    block.target(role, kind).ok_or_else(|| ExtractError::MissingRelationship {
        id: block.id().clone(),
        role,
    })
}
