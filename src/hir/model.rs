//! Model assembly: runs every stage over one object index.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::associations::{AssociationInfo, resolve_associations};
use super::classes::{ClassInfo, resolve_classes};
use super::diagnostics::DiagnosticCollector;
use super::error::{ExtractError, Result};
use super::events::{
    ChangeEventInfo, EventCatalog, TimeEventInfo, collect_events, complete_signal_events,
    timed_events,
};
use super::packages::{PackageScope, package_scope};
use super::states::{StateInfo, resolve_states};
use super::text::{ContentSource, RichTextDecoder, TextResolver};
use super::transitions::{TransitionInfo, resolve_transitions};
use super::types::{TypeCatalog, collect_types};
use crate::base::schema::{ObjectKind, attr};
use crate::base::{ObjectId, normalize_name};
use crate::index::ObjectIndex;
use crate::syntax::{Detail, OdlFile};

/// Options controlling a reconstruction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    package: Option<String>,
    parallel: bool,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict classes and events to the package at `path` and its subpackages.
    pub fn with_package(mut self, path: impl Into<String>) -> Self {
        self.package = Some(path.into());
        self
    }

    /// Resolve attribute defaults and transition texts on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

/// Identity of the model as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHeader {
    /// Value of the Model object's `Id` attribute.
    pub id: String,
    /// Normalized identifier of the Model object.
    pub name: SmolStr,
}

/// A fully resolved model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub header: ModelHeader,
    pub classes: IndexMap<ObjectId, ClassInfo>,
    pub associations: Vec<AssociationInfo>,
    pub types: TypeCatalog,
    pub events: EventCatalog,
    pub states: IndexMap<ObjectId, StateInfo>,
    pub transitions: Vec<TransitionInfo>,
    pub time_events: Vec<TimeEventInfo>,
    pub change_events: Vec<ChangeEventInfo>,
    pub diagnostics: DiagnosticCollector,
}

/// Header of the first Model object in the corpus.
pub fn model_header(index: &ObjectIndex<'_>) -> Result<ModelHeader> {
    let object = index
        .objects_of_kind(ObjectKind::Model)
        .first()
        .ok_or(ExtractError::MissingModel)?;
    let id = object
        .details
        .iter()
        .find_map(|detail| match detail {
            Detail::Attribute { name, value } if name == attr::ID => value.first_str(),
            _ => None,
        })
        .ok_or_else(|| ExtractError::MissingAttribute {
            id: object.id.clone(),
            name: attr::ID,
        })?;
    Ok(ModelHeader {
        id: id.to_string(),
        name: normalize_name(object.id.as_str()),
    })
}

/// Reconstruct the model of a parsed corpus.
///
/// Rich text is read from `content` and decoded with `decoder`. A model is
/// returned only if every stage succeeds.
pub fn reconstruct(
    file: &OdlFile,
    content: &dyn ContentSource,
    decoder: &dyn RichTextDecoder,
    options: &ExtractOptions,
) -> Result<Model> {
    let index = ObjectIndex::new(file);
    let text = TextResolver::new(&index, content, decoder);
    let mut diagnostics = DiagnosticCollector::new();

    let header = model_header(&index)?;
    let scope = match options.package() {
        Some(path) => Some(package_scope(&index, path)?),
        None => None,
    };
    let PackageScope { classes: class_scope, events: event_scope } = scope.unwrap_or_default();
    let scoped = options.package().is_some();

    let types = collect_types(&index, &mut diagnostics)?;
    let classes = resolve_classes(
        &index,
        &text,
        scoped.then_some(&class_scope),
        options.parallel(),
        &mut diagnostics,
    )?;
    let associations = resolve_associations(&index, &classes)?;
    let mut events = collect_events(&index, scoped.then_some(&event_scope), &mut diagnostics)?;
    let states = resolve_states(&index, &classes)?;
    let transitions = resolve_transitions(&index, &text, &states, options.parallel(), &mut diagnostics)?;
    complete_signal_events(&index, &mut events, &transitions, &mut diagnostics)?;
    let (time_events, change_events) = timed_events(&transitions);

    tracing::info!(
        model = %header.name,
        classes = classes.len(),
        states = states.len(),
        transitions = transitions.len(),
        warnings = diagnostics.warning_count(),
        "model reconstructed"
    );

    Ok(Model {
        header,
        classes,
        associations,
        types,
        events,
        states,
        transitions,
        time_events,
        change_events,
        diagnostics,
    })
}

/// Parse `source` and reconstruct its model.
///
/// Syntax errors do not stop reconstruction; they lead the model's
/// diagnostics.
pub fn reconstruct_source(
    source: &str,
    content: &dyn ContentSource,
    decoder: &dyn RichTextDecoder,
    options: &ExtractOptions,
) -> Result<Model> {
    let parse = crate::parser::parse(source);
    let mut model = reconstruct(&parse.file, content, decoder, options)?;

    let mut diagnostics = DiagnosticCollector::new();
    diagnostics.syntax_errors(&parse.errors);
    diagnostics.extend(model.diagnostics);
    model.diagnostics = diagnostics;
    Ok(model)
}
