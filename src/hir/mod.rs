//! High-level IR (HIR): the reconstructed class and state-machine model.
//!
//! Every stage reads the shared [`ObjectIndex`](crate::index::ObjectIndex)
//! and produces new, disjoint output. No stage mutates another stage's
//! result; warnings travel in an explicit [`DiagnosticCollector`].
//!
//! ## Stages
//!
//! ```text
//! OdlFile ──▶ ObjectIndex
//!                 │
//!                 ├─▶ model_header
//!                 ├─▶ package_scope (optional)
//!                 ├─▶ collect_types
//!                 ├─▶ resolve_classes      ◀── TextResolver (defaults)
//!                 ├─▶ resolve_associations
//!                 ├─▶ collect_events
//!                 ├─▶ resolve_states
//!                 └─▶ resolve_transitions  ◀── TextResolver (guards, actions)
//!                         │
//!                         ▼
//!                       Model ──▶ views
//! ```

mod associations;
mod batch;
mod classes;
mod diagnostics;
mod error;
mod events;
mod model;
mod packages;
mod states;
mod text;
mod transitions;
mod types;
mod views;

pub use associations::{AssociationEnd, AssociationInfo, Multiplicity, UpperBound, resolve_associations};
pub use classes::{
    AttributeInfo, ClassInfo, TypeRef, collect_classes, declared_type, resolve_attributes,
    resolve_classes, resolve_superclasses,
};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use error::{ExtractError, Result};
pub use events::{
    ChangeEventInfo, DESTROY_EVENT_ID, DESTROY_EVENT_NAME, EventCatalog, EventInfo, ParameterInfo,
    TimeEventInfo, collect_events, complete_signal_events, timed_events,
};
pub use model::{ExtractOptions, Model, ModelHeader, model_header, reconstruct, reconstruct_source};
pub use packages::{Package, PackageScope, find_package, package_hierarchy, package_scope};
pub use states::{StateInfo, StateKind, resolve_states};
pub use text::{
    ContentSource, DecodeError, MemoryContent, PlainText, RichTextDecoder, TextResolver, TextToken,
    substitute_tokens,
};
pub use transitions::{DESTROY_ACTION, Guard, TransitionEvent, TransitionInfo, resolve_transitions};
pub use types::{
    BasicTypeInfo, Construction, EnumerationInfo, EnumerationLiteralInfo, TypeCatalog, collect_types,
};
pub use views::NumberedTransition;
