//! XMI 2.1 writer for reconstructed models.
//!
//! Produces a UML2 document with one `uml:Class` per class (carrying its
//! generalizations, attributes, navigable association ends, receptions and
//! state machine), followed by associations, signals, signal events, time
//! events, change events and the two primitive types every attribute and
//! parameter is typed with.

use std::cell::Cell;
use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rustc_hash::FxHashMap;

use super::InterchangeError;
use crate::base::ObjectId;
use crate::hir::{
    AssociationEnd, AssociationInfo, ClassInfo, EventInfo, Model, NumberedTransition, StateInfo,
    TransitionEvent, TransitionInfo,
};

pub const XMI_NAMESPACE: &str = "http://schema.omg.org/spec/XMI/2.1";
pub const UML_NAMESPACE: &str = "http://www.eclipse.org/uml2/2.1.0/UML";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Primitive type of derived attributes (names starting with `/`).
pub const DERIVED_ATTRIBUTE_TYPE: &str = "_brobQF6WEd-1BtN3LP_f7A";
/// Primitive type of all other attributes and of parameters.
pub const INTEGER_TYPE: &str = "_cD-CwF6WEd-1BtN3LP_f7A";

/// Body language of opaque behaviours and expressions.
const ACTION_LANGUAGE: &str = "xuml";

/// How identifiers are minted for elements without a corpus identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum IdStyle {
    #[default]
    Random,
    Sequential,
}

/// XMI document writer.
#[derive(Debug, Clone, Default)]
pub struct XmiWriter {
    ids: IdStyle,
}

impl XmiWriter {
    /// Writer that mints random v4 UUIDs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer that mints `id1`, `id2`, ... in document order, for
    /// reproducible output.
    pub fn with_sequential_ids() -> Self {
        Self {
            ids: IdStyle::Sequential,
        }
    }

    pub fn write(&self, model: &Model) -> Result<Vec<u8>, InterchangeError> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(model, &mut buffer)?;
        let mut output = buffer.into_inner();
        output.push(b'\n');
        Ok(output)
    }

    pub fn write_to<W: Write>(&self, model: &Model, out: W) -> Result<(), InterchangeError> {
        let mut emitter = Emitter::new(Writer::new_with_indent(out, b' ', 2), model, self.ids);
        emitter.document()?;
        tracing::debug!(
            classes = model.classes.len(),
            associations = model.associations.len(),
            signals = emitter.signals.len(),
            "wrote XMI document"
        );
        Ok(())
    }
}

struct Emitter<'m, W: Write> {
    writer: Writer<W>,
    model: &'m Model,
    style: IdStyle,
    counter: Cell<u64>,
    /// Signal event identifier → minted signal identifier, for used signals.
    signals: FxHashMap<&'m str, String>,
    /// Transition identifier → minted time or change event identifier.
    timed: FxHashMap<&'m ObjectId, String>,
}

impl<'m, W: Write> Emitter<'m, W> {
    fn new(writer: Writer<W>, model: &'m Model, style: IdStyle) -> Self {
        let mut emitter = Self {
            writer,
            model,
            style,
            counter: Cell::new(0),
            signals: FxHashMap::default(),
            timed: FxHashMap::default(),
        };
        for event in model.used_signals() {
            let id = emitter.mint();
            emitter.signals.insert(event.id.as_str(), id);
        }
        for event in &model.time_events {
            let id = emitter.mint();
            emitter.timed.insert(&event.transition, id);
        }
        for event in &model.change_events {
            let id = emitter.mint();
            emitter.timed.insert(&event.transition, id);
        }
        emitter
    }

    fn mint(&self) -> String {
        match self.style {
            IdStyle::Random => uuid::Uuid::new_v4().to_string(),
            IdStyle::Sequential => {
                let next = self.counter.get() + 1;
                self.counter.set(next);
                format!("id{next}")
            }
        }
    }

    /// A fresh `_`-prefixed reference.
    fn fresh(&self) -> String {
        reference(&self.mint())
    }

    // ------------------------------------------------------------------
    // Low-level event helpers
    // ------------------------------------------------------------------

    fn event(&mut self, event: Event<'_>) -> Result<(), InterchangeError> {
        self.writer
            .write_event(event)
            .map_err(|e| InterchangeError::xml(format!("Write error: {e}")))
    }

    fn start(&mut self, element: BytesStart<'_>) -> Result<(), InterchangeError> {
        self.event(Event::Start(element))
    }

    fn end(&mut self, name: &str) -> Result<(), InterchangeError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, element: BytesStart<'_>) -> Result<(), InterchangeError> {
        self.event(Event::Empty(element))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), InterchangeError> {
        self.start(BytesStart::new(name))?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// `<language>xuml</language><body>…</body>`
    fn opaque_body(&mut self, body: &str) -> Result<(), InterchangeError> {
        self.text_element("language", ACTION_LANGUAGE)?;
        self.text_element("body", body)
    }

    // ------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------

    fn document(&mut self) -> Result<(), InterchangeError> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let header = &self.model.header;
        let mut root = BytesStart::new("uml:Model");
        root.push_attribute(("xmi:version", "2.1"));
        root.push_attribute(("xmlns:xmi", XMI_NAMESPACE));
        root.push_attribute(("xmlns:uml", UML_NAMESPACE));
        root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        root.push_attribute(("xmi:id", reference(&header.id).as_str()));
        root.push_attribute(("name", header.name.as_str()));
        self.start(root)?;

        let model = self.model;
        for class in model.classes.values() {
            self.class(class)?;
        }
        for association in &model.associations {
            self.association(association)?;
        }
        self.signals()?;
        self.time_events()?;
        self.change_events()?;
        self.primitive_types()?;

        self.end("uml:Model")
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    fn class(&mut self, class: &'m ClassInfo) -> Result<(), InterchangeError> {
        let mut element = packaged("uml:Class", &class.id);
        element.push_attribute(("name", class.name.as_str()));
        element.push_attribute(("isActive", "true"));
        self.start(element)?;

        for (superclass, generalization) in &class.superclasses {
            let mut element = BytesStart::new("generalization");
            element.push_attribute(("xmi:id", reference(generalization).as_str()));
            element.push_attribute(("general", reference(superclass).as_str()));
            self.empty(element)?;
        }

        self.attributes(class)?;
        self.navigable_ends(class)?;
        self.receptions(class)?;
        self.state_machine(class)?;

        self.end("packagedElement")
    }

    fn attributes(&mut self, class: &ClassInfo) -> Result<(), InterchangeError> {
        for attribute in &class.attributes {
            let ty = if attribute.name.starts_with('/') {
                DERIVED_ATTRIBUTE_TYPE
            } else {
                INTEGER_TYPE
            };
            let mut element = BytesStart::new("ownedAttribute");
            element.push_attribute(("xmi:id", reference(&attribute.id).as_str()));
            element.push_attribute(("name", attribute.name.as_str()));
            element.push_attribute(("type", ty));
            element.push_attribute(("isUnique", "false"));

            let Some(default) = &attribute.default else {
                self.empty(element)?;
                continue;
            };
            self.start(element)?;
            let mut value = BytesStart::new("defaultValue");
            value.push_attribute(("xmi:type", "uml:OpaqueExpression"));
            value.push_attribute(("xmi:id", self.fresh().as_str()));
            self.start(value)?;
            self.opaque_body(default)?;
            self.end("defaultValue")?;
            self.end("ownedAttribute")?;
        }
        Ok(())
    }

    /// Association ends navigable from `class`: the far end of every
    /// association the class takes part in, when that end has a role name.
    fn navigable_ends(&mut self, class: &ClassInfo) -> Result<(), InterchangeError> {
        let model = self.model;
        for association in &model.associations {
            let [near, far] = &association.ends;
            if near.owner == class.id && !far.name.is_empty() {
                self.association_end("ownedAttribute", association, far, far.name.as_str())?;
            }
            if far.owner == class.id && !near.name.is_empty() {
                self.association_end("ownedAttribute", association, near, near.name.as_str())?;
            }
        }
        Ok(())
    }

    fn association_end(
        &mut self,
        tag: &str,
        association: &AssociationInfo,
        end: &AssociationEnd,
        name: &str,
    ) -> Result<(), InterchangeError> {
        let mut element = BytesStart::new(tag);
        element.push_attribute(("xmi:id", reference(&end.role).as_str()));
        element.push_attribute(("name", name));
        element.push_attribute(("type", reference(&end.owner).as_str()));
        element.push_attribute(("isUnique", "false"));
        element.push_attribute(("association", reference(&association.id).as_str()));
        self.start(element)?;

        let upper = end.multiplicity.upper.to_string();
        self.value("upperValue", "uml:LiteralUnlimitedNatural", Some(&upper))?;
        let lower = end.multiplicity.lower.map(|lower| lower.to_string());
        self.value("lowerValue", "uml:LiteralInteger", lower.as_deref())?;

        self.end(tag)
    }

    fn value(&mut self, tag: &str, ty: &str, value: Option<&str>) -> Result<(), InterchangeError> {
        let mut element = BytesStart::new(tag);
        element.push_attribute(("xmi:type", ty));
        element.push_attribute(("xmi:id", self.fresh().as_str()));
        if let Some(value) = value {
            element.push_attribute(("value", value));
        }
        self.empty(element)
    }

    fn receptions(&mut self, class: &ClassInfo) -> Result<(), InterchangeError> {
        let model = self.model;
        for (number, event) in model.receptions(&class.id).into_iter().enumerate() {
            let signal = self.signal_ref(event)?;
            let mut element = BytesStart::new("ownedReception");
            element.push_attribute(("xmi:id", self.fresh().as_str()));
            element.push_attribute(("name", format!("Reception_{number}").as_str()));
            element.push_attribute(("signal", signal.as_str()));

            if event.parameters.is_empty() {
                self.empty(element)?;
                continue;
            }
            self.start(element)?;
            for parameter in &event.parameters {
                self.parameter(parameter.name.as_str())?;
            }
            self.end("ownedReception")?;
        }
        Ok(())
    }

    fn parameter(&mut self, name: &str) -> Result<(), InterchangeError> {
        let mut element = BytesStart::new("ownedParameter");
        element.push_attribute(("xmi:id", self.fresh().as_str()));
        element.push_attribute(("name", name));
        element.push_attribute(("type", INTEGER_TYPE));
        self.start(element)?;

        self.value("upperValue", "uml:LiteralUnlimitedNatural", None)?;
        self.value("lowerValue", "uml:LiteralInteger", None)?;

        let mut default = BytesStart::new("defaultValue");
        default.push_attribute(("xmi:type", "uml:LiteralString"));
        default.push_attribute(("xmi:id", self.fresh().as_str()));
        self.start(default)?;
        let mut nil = BytesStart::new("value");
        nil.push_attribute(("xsi:nil", "true"));
        self.empty(nil)?;
        self.end("defaultValue")?;

        self.end("ownedParameter")
    }

    fn signal_ref(&self, event: &EventInfo) -> Result<String, InterchangeError> {
        self.signals
            .get(event.id.as_str())
            .map(|id| reference(id))
            .ok_or_else(|| InterchangeError::xml(format!("No signal for event {}", event.id)))
    }

    // ------------------------------------------------------------------
    // State machines
    // ------------------------------------------------------------------

    fn state_machine(&mut self, class: &ClassInfo) -> Result<(), InterchangeError> {
        let model = self.model;
        let outer = model.outer_states(&class.id);
        if outer.is_empty() {
            return Ok(());
        }

        let mut machine = BytesStart::new("ownedBehavior");
        machine.push_attribute(("xmi:type", "uml:StateMachine"));
        machine.push_attribute(("xmi:id", self.fresh().as_str()));
        machine.push_attribute(("name", class.name.as_str()));
        self.start(machine)?;

        let ids: Vec<&ObjectId> = outer.iter().map(|state| &state.id).collect();
        self.region(class.name.as_str(), &outer, &ids)?;

        self.end("ownedBehavior")
    }

    /// A region holding `states` and the transitions leaving them.
    fn region(&mut self, name: &str, states: &[&'m StateInfo], ids: &[&ObjectId]) -> Result<(), InterchangeError> {
        let mut region = BytesStart::new("region");
        region.push_attribute(("xmi:id", self.fresh().as_str()));
        region.push_attribute(("name", name));
        self.start(region)?;

        for state in states {
            self.state(state)?;
        }
        let model = self.model;
        for numbered in model.region_transitions(ids) {
            self.transition(numbered)?;
        }

        self.end("region")
    }

    /// Region named after `state`, holding its substates.
    fn state_region(&mut self, state: &'m StateInfo) -> Result<(), InterchangeError> {
        let model = self.model;
        let substates = model.substates(state);
        let ids: Vec<&ObjectId> = state.substates.iter().collect();
        self.region(state.name.as_str(), &substates, &ids)
    }

    fn state(&mut self, state: &'m StateInfo) -> Result<(), InterchangeError> {
        let model = self.model;
        let behaviours = model.entry_exit(&state.id);

        let mut element = BytesStart::new("subvertex");
        element.push_attribute(("xmi:type", state.kind.uml_type()));
        element.push_attribute(("xmi:id", reference(&state.id).as_str()));
        element.push_attribute(("name", state.name.as_str()));

        if state.substates.is_empty() && behaviours.is_empty() {
            return self.empty(element);
        }
        self.start(element)?;

        if !state.substates.is_empty() {
            if state.parallel {
                for substate in model.substates(state) {
                    self.state_region(substate)?;
                }
            } else {
                self.state_region(state)?;
            }
        }
        for behaviour in behaviours {
            self.behaviour(behaviour)?;
        }

        self.end("subvertex")
    }

    fn behaviour(&mut self, transition: &TransitionInfo) -> Result<(), InterchangeError> {
        let (tag, name) = match transition.event {
            TransitionEvent::Entry => ("entry", "Entry"),
            TransitionEvent::Exit => ("exit", "Exit"),
            _ => return Ok(()),
        };
        let mut element = BytesStart::new(tag);
        element.push_attribute(("xmi:type", "uml:OpaqueBehavior"));
        element.push_attribute(("xmi:id", reference(&transition.id).as_str()));
        element.push_attribute(("name", name));
        self.start(element)?;
        self.opaque_body(&transition.action)?;
        self.end(tag)
    }

    fn transition(&mut self, numbered: NumberedTransition<'m>) -> Result<(), InterchangeError> {
        let model = self.model;
        let transition = numbered.transition;
        let state_name = |id: &ObjectId| model.states.get(id).map(|state| state.name.as_str()).unwrap_or_default();

        let mut element = BytesStart::new("transition");
        element.push_attribute(("xmi:id", reference(&transition.id).as_str()));
        let name = format!(
            "From_{}_to_{}_Transition_{}",
            state_name(&transition.source),
            state_name(&transition.target),
            numbered.number
        );
        element.push_attribute(("name", name.as_str()));
        element.push_attribute(("target", reference(&transition.target).as_str()));
        element.push_attribute(("source", reference(&transition.source).as_str()));

        let guard = transition.guard.as_ref().filter(|guard| !guard.text.is_empty());
        if transition.event == TransitionEvent::None && guard.is_none() && transition.action.is_empty() {
            return self.empty(element);
        }
        if let Some(guard) = guard {
            element.push_attribute(("guard", reference(&guard.id).as_str()));
        }
        if matches!(transition.event, TransitionEvent::SignalInternal(_)) {
            element.push_attribute(("kind", "internal"));
        }
        self.start(element)?;

        if let Some(event) = self.trigger_event(transition) {
            let mut trigger = BytesStart::new("trigger");
            trigger.push_attribute(("xmi:id", self.fresh().as_str()));
            trigger.push_attribute(("name", "Trigger_0"));
            trigger.push_attribute(("event", event.as_str()));
            self.empty(trigger)?;
        }

        if let Some(guard) = guard {
            let mut rule = BytesStart::new("ownedRule");
            rule.push_attribute(("xmi:id", reference(&guard.id).as_str()));
            rule.push_attribute(("name", "Guard"));
            self.start(rule)?;
            let mut specification = BytesStart::new("specification");
            specification.push_attribute(("xmi:type", "uml:LiteralString"));
            specification.push_attribute(("xmi:id", self.fresh().as_str()));
            specification.push_attribute(("value", guard.text.as_str()));
            self.empty(specification)?;
            self.end("ownedRule")?;
        }

        if !transition.action.is_empty() {
            let mut effect = BytesStart::new("effect");
            effect.push_attribute(("xmi:type", "uml:OpaqueBehavior"));
            effect.push_attribute(("xmi:id", self.fresh().as_str()));
            effect.push_attribute(("name", "Effect"));
            self.start(effect)?;
            self.opaque_body(&transition.action)?;
            self.end("effect")?;
        }

        self.end("transition")
    }

    /// Reference to the event triggering `transition`, if any.
    fn trigger_event(&self, transition: &TransitionInfo) -> Option<String> {
        match &transition.event {
            TransitionEvent::Time(_) | TransitionEvent::Change(_) => {
                self.timed.get(&transition.id).map(|id| reference(id))
            }
            event => event.signal_event().map(reference),
        }
    }

    // ------------------------------------------------------------------
    // Associations and events
    // ------------------------------------------------------------------

    fn association(&mut self, association: &AssociationInfo) -> Result<(), InterchangeError> {
        let model = self.model;
        let [first, second] = &association.ends;
        let owner_name = |end: &AssociationEnd| model.class_name(&end.owner).unwrap_or_default();

        let mut element = packaged("uml:Association", &association.id);
        let name = format!("A_{}_{}", owner_name(first), owner_name(second));
        element.push_attribute(("name", name.as_str()));
        let members = format!("{} {}", reference(&second.role), reference(&first.role));
        element.push_attribute(("memberEnd", members.as_str()));

        if !first.name.is_empty() && !second.name.is_empty() {
            return self.empty(element);
        }
        self.start(element)?;
        for end in [first, second] {
            if end.name.is_empty() {
                self.association_end("ownedEnd", association, end, owner_name(end))?;
            }
        }
        self.end("packagedElement")
    }

    fn signals(&mut self) -> Result<(), InterchangeError> {
        let model = self.model;
        let used = model.used_signals();
        for event in &used {
            let mut element = BytesStart::new("packagedElement");
            element.push_attribute(("xmi:type", "uml:Signal"));
            element.push_attribute(("xmi:id", self.signal_ref(event)?.as_str()));
            element.push_attribute(("name", event.name.as_str()));
            self.empty(element)?;
        }
        for (number, event) in used.iter().enumerate() {
            let mut element = packaged("uml:SignalEvent", &event.id);
            element.push_attribute(("name", format!("SignalEvent_{number}").as_str()));
            element.push_attribute(("signal", self.signal_ref(event)?.as_str()));
            self.empty(element)?;
        }
        Ok(())
    }

    fn time_events(&mut self) -> Result<(), InterchangeError> {
        let model = self.model;
        for (number, event) in model.time_events.iter().enumerate() {
            let mut element = BytesStart::new("packagedElement");
            element.push_attribute(("xmi:type", "uml:TimeEvent"));
            element.push_attribute(("xmi:id", self.timed_ref(&event.transition)?.as_str()));
            element.push_attribute(("name", format!("TimeEvent_{number}").as_str()));
            self.start(element)?;

            let mut when = BytesStart::new("when");
            when.push_attribute(("xmi:id", self.fresh().as_str()));
            self.start(when)?;
            let mut expr = BytesStart::new("expr");
            expr.push_attribute(("xmi:type", "uml:LiteralString"));
            expr.push_attribute(("xmi:id", self.fresh().as_str()));
            let value = format!("after( {} )", event.expression.trim_matches(['\n', '\r']));
            expr.push_attribute(("value", value.as_str()));
            self.empty(expr)?;
            self.end("when")?;

            self.end("packagedElement")?;
        }
        Ok(())
    }

    fn change_events(&mut self) -> Result<(), InterchangeError> {
        let model = self.model;
        for (number, event) in model.change_events.iter().enumerate() {
            let mut element = BytesStart::new("packagedElement");
            element.push_attribute(("xmi:type", "uml:ChangeEvent"));
            element.push_attribute(("xmi:id", self.timed_ref(&event.transition)?.as_str()));
            element.push_attribute(("name", format!("ChangeEvent_{}", number + 1).as_str()));
            self.start(element)?;

            let mut expression = BytesStart::new("changeExpression");
            expression.push_attribute(("xmi:type", "uml:LiteralString"));
            expression.push_attribute(("xmi:id", self.fresh().as_str()));
            expression.push_attribute(("value", event.expression.as_str()));
            self.empty(expression)?;

            self.end("packagedElement")?;
        }
        Ok(())
    }

    fn timed_ref(&self, transition: &ObjectId) -> Result<String, InterchangeError> {
        self.timed
            .get(transition)
            .map(|id| reference(id))
            .ok_or_else(|| InterchangeError::xml(format!("No event for transition {transition}")))
    }

    fn primitive_types(&mut self) -> Result<(), InterchangeError> {
        for (id, name) in [(DERIVED_ATTRIBUTE_TYPE, "DerivedAttribute"), (INTEGER_TYPE, "Integer")] {
            let mut element = BytesStart::new("packagedElement");
            element.push_attribute(("xmi:type", "uml:PrimitiveType"));
            element.push_attribute(("xmi:id", id));
            element.push_attribute(("name", name));
            self.empty(element)?;
        }
        Ok(())
    }
}

/// XMI reference to an identifier: the identifier with a leading `_`.
fn reference(id: &str) -> String {
    format!("_{id}")
}

fn packaged<'a>(ty: &str, id: &str) -> BytesStart<'a> {
    let mut element = BytesStart::new("packagedElement");
    element.push_attribute(("xmi:type", ty));
    element.push_attribute(("xmi:id", reference(id).as_str()));
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{
        AttributeInfo, DiagnosticCollector, EventCatalog, Guard, ModelHeader, Multiplicity, ParameterInfo,
        StateKind, TimeEventInfo, TypeCatalog, UpperBound,
    };
    use indexmap::IndexMap;

    fn class(id: &str, name: &str) -> ClassInfo {
        ClassInfo {
            id: id.into(),
            name: name.into(),
            superclasses: IndexMap::new(),
            attributes: Vec::new(),
            roles: Vec::new(),
        }
    }

    fn state(id: &str, class: &str, parent: Option<&str>, substates: &[&str]) -> (ObjectId, StateInfo) {
        (
            id.into(),
            StateInfo {
                id: id.into(),
                name: id.into(),
                kind: StateKind::State,
                class: class.into(),
                substates: substates.iter().map(|s| ObjectId::from(*s)).collect(),
                parallel: false,
                parent: parent.map(ObjectId::from),
            },
        )
    }

    fn transition(id: &str, source: &str, target: &str, event: TransitionEvent, action: &str) -> TransitionInfo {
        TransitionInfo {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            class: "lift".into(),
            event,
            guard: None,
            action: action.into(),
        }
    }

    fn end(owner: &str, role: &str, name: &str, multiplicity: Multiplicity) -> AssociationEnd {
        AssociationEnd {
            owner: owner.into(),
            role: role.into(),
            name: name.into(),
            multiplicity,
        }
    }

    fn model() -> Model {
        let mut lift = class("lift", "Lift");
        lift.attributes.push(AttributeInfo {
            id: "floor".into(),
            name: "floor".into(),
            default: Some("0".into()),
            ty: None,
        });
        lift.attributes.push(AttributeInfo {
            id: "load".into(),
            name: "/load".into(),
            default: None,
            ty: None,
        });
        let mut door = class("door", "Door");
        door.superclasses.insert("lift".into(), "spec1".into());

        let mut events = EventCatalog::default();
        events.insert(EventInfo {
            id: "go".into(),
            name: "Go".into(),
            parameters: vec![ParameterInfo {
                id: "p".into(),
                name: "floor".into(),
                ty: None,
            }],
        });
        events.insert(EventInfo {
            id: "unused".into(),
            name: "Unused".into(),
            parameters: Vec::new(),
        });

        let mut guarded = transition("t1", "idle", "moving", TransitionEvent::Signal("go".into()), "");
        guarded.guard = Some(Guard {
            id: "g1".into(),
            text: "x > 0".into(),
        });

        Model {
            header: ModelHeader {
                id: "42".into(),
                name: "Lifts".into(),
            },
            classes: [lift, door].into_iter().map(|c| (c.id.clone(), c)).collect(),
            associations: vec![AssociationInfo {
                id: "a1".into(),
                ends: [
                    end("lift", "r0", "", Multiplicity::new(UpperBound::Bounded(1), Some(1))),
                    end("door", "r1", "doors", Multiplicity::new(UpperBound::Unbounded, None)),
                ],
            }],
            types: TypeCatalog::default(),
            events,
            states: [
                state("idle", "lift", None, &[]),
                state("moving", "lift", None, &["up"]),
                state("up", "lift", Some("moving"), &[]),
            ]
            .into_iter()
            .collect(),
            transitions: vec![
                transition("e1", "idle", "idle", TransitionEvent::Entry, "init"),
                guarded,
                transition("t2", "moving", "idle", TransitionEvent::Time("5\n".into()), ""),
                transition("t3", "up", "up", TransitionEvent::None, ""),
            ],
            time_events: vec![TimeEventInfo {
                transition: "t2".into(),
                expression: "5\n".into(),
            }],
            change_events: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn render(model: &Model) -> String {
        let bytes = XmiWriter::with_sequential_ids().write(model).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_header_and_footer() {
        let xml = render(&model());
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"xmi:id="_42" name="Lifts""#));
        assert!(xml.contains(r#"xmlns:uml="http://www.eclipse.org/uml2/2.1.0/UML""#));
        assert!(xml.contains(r#"xmi:id="_cD-CwF6WEd-1BtN3LP_f7A" name="Integer""#));
        assert!(xml.trim_end().ends_with("</uml:Model>"));
    }

    #[test]
    fn test_class_members() {
        let xml = render(&model());
        assert!(xml.contains(r#"<packagedElement xmi:type="uml:Class" xmi:id="_lift" name="Lift" isActive="true">"#));
        assert!(xml.contains(r#"<generalization xmi:id="_spec1" general="_lift"/>"#));
        assert!(xml.contains(r#"name="floor" type="_cD-CwF6WEd-1BtN3LP_f7A""#));
        assert!(xml.contains(r#"name="/load" type="_brobQF6WEd-1BtN3LP_f7A" isUnique="false"/>"#));
        assert!(xml.contains("<body>0</body>"));
        // Lift navigates to the named far end only.
        assert!(xml.contains(r#"<ownedAttribute xmi:id="_r1" name="doors" type="_door" isUnique="false" association="_a1">"#));
    }

    #[test]
    fn test_association_with_unnamed_end() {
        let xml = render(&model());
        assert!(xml.contains(r#"name="A_Lift_Door" memberEnd="_r1 _r0">"#));
        assert!(xml.contains(r#"<ownedEnd xmi:id="_r0" name="Lift" type="_lift""#));
        assert!(xml.contains(r#"value="*"/>"#));
    }

    #[test]
    fn test_state_machine() {
        let xml = render(&model());
        assert!(xml.contains(r#"<subvertex xmi:type="uml:State" xmi:id="_idle" name="idle">"#));
        assert!(xml.contains(r#"<entry xmi:type="uml:OpaqueBehavior" xmi:id="_e1" name="Entry">"#));
        assert!(xml.contains("<body>init</body>"));
        assert!(xml.contains(r#"name="From_idle_to_moving_Transition_1" target="_moving" source="_idle" guard="_g1">"#));
        assert!(xml.contains(r#"value="x &gt; 0"/>"#));
        // Inner region of the composite state, with its own numbering.
        assert!(xml.contains(r#"<transition xmi:id="_t3" name="From_up_to_up_Transition_0" target="_up" source="_up"/>"#));
        assert!(!xml.contains(r#"xmi:id="_e1" name="From"#));
    }

    #[test]
    fn test_events() {
        let xml = render(&model());
        assert!(xml.contains(r#"xmi:type="uml:Signal""#));
        assert!(xml.contains(r#"name="Go""#));
        assert!(!xml.contains("Unused"));
        assert!(xml.contains(r#"xmi:id="_go" name="SignalEvent_0""#));
        assert!(xml.contains(r#"name="Reception_0""#));
        assert!(xml.contains(r#"<value xsi:nil="true"/>"#));
        assert!(xml.contains(r#"name="TimeEvent_0""#));
        assert!(xml.contains(r#"value="after( 5 )""#));
    }

    #[test]
    fn test_trigger_references_minted_ids() {
        let model = model();
        let xml = render(&model);
        // Signal id minted first, then the time event id.
        assert!(xml.contains(r#"xmi:type="uml:Signal" xmi:id="_id1" name="Go""#));
        assert!(xml.contains(r#"xmi:type="uml:TimeEvent" xmi:id="_id2""#));
        assert!(xml.contains(r#"name="Trigger_0" event="_go"/>"#));
        assert!(xml.contains(r#"name="Trigger_0" event="_id2"/>"#));
    }

    #[test]
    fn test_random_ids_are_unique() {
        let model = model();
        let a = String::from_utf8(XmiWriter::new().write(&model).unwrap()).unwrap();
        let b = String::from_utf8(XmiWriter::new().write(&model).unwrap()).unwrap();
        assert_ne!(a, b);
    }
}
