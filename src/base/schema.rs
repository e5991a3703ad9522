//! Vocabulary of the ODL corpus.
//!
//! The exporting tool prefixes every kind tag, relationship role and
//! attribute name with [`TAG_PREFIX`]. The constants here carry the full,
//! prefixed spelling so they can be compared against raw records directly.

/// Prefix of every tool-defined tag.
pub const TAG_PREFIX: &str = "_Art1_";

/// Number of header characters in a Version label before the display name.
pub const VERSION_LABEL_HEADER_LEN: usize = 6;

/// Kind of an ODL object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Model,
    Package,
    Class,
    Attribute,
    Association,
    Role,
    Generalization,
    Specialization,
    Event,
    Parameter,
    State,
    Transition,
    EventActionBlock,
    ChangeEvent,
    GuardCondition,
    Typedef,
    BasicType,
    EnumerationLiteral,
    ModelObjectToken,
    CustomPropertyTextObject,
    /// Any tag outside the set the reconstruction understands.
    Other,
}

impl ObjectKind {
    const ALL: [ObjectKind; 20] = [
        Self::Model,
        Self::Package,
        Self::Class,
        Self::Attribute,
        Self::Association,
        Self::Role,
        Self::Generalization,
        Self::Specialization,
        Self::Event,
        Self::Parameter,
        Self::State,
        Self::Transition,
        Self::EventActionBlock,
        Self::ChangeEvent,
        Self::GuardCondition,
        Self::Typedef,
        Self::BasicType,
        Self::EnumerationLiteral,
        Self::ModelObjectToken,
        Self::CustomPropertyTextObject,
    ];

    /// The full tag used in the corpus, `None` for [`ObjectKind::Other`].
    pub fn tag(&self) -> Option<&'static str> {
        let tag = match self {
            Self::Model => "_Art1_Model",
            Self::Package => "_Art1_Package",
            Self::Class => "_Art1_Class",
            Self::Attribute => "_Art1_Attribute",
            Self::Association => "_Art1_Association",
            Self::Role => "_Art1_Role",
            Self::Generalization => "_Art1_Generalization",
            Self::Specialization => "_Art1_Specialization",
            Self::Event => "_Art1_Event",
            Self::Parameter => "_Art1_Parameter",
            Self::State => "_Art1_State",
            Self::Transition => "_Art1_Transition",
            Self::EventActionBlock => "_Art1_EventActionBlock",
            Self::ChangeEvent => "_Art1_ChangeEvent",
            Self::GuardCondition => "_Art1_GuardCondition",
            Self::Typedef => "_Art1_Typedef",
            Self::BasicType => "_Art1_BasicType",
            Self::EnumerationLiteral => "_Art1_EnumerationLiteral",
            Self::ModelObjectToken => "_Art1_ModelObjectToken",
            Self::CustomPropertyTextObject => "_Art1_CustomPropertyTextObject",
            Self::Other => return None,
        };
        Some(tag)
    }

    /// Classify a raw kind tag.
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == Some(tag))
            .unwrap_or(Self::Other)
    }

    /// Kind name without the tool prefix.
    pub fn name(&self) -> &'static str {
        match self.tag() {
            Some(tag) => &tag[TAG_PREFIX.len()..],
            None => "Other",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Relationship role names.
pub mod role {
    pub const CLASS_TO_GENERALIZATION: &str = "_Art1_Class_To_Generalization";
    pub const CLASS_TO_SPECIALIZATION: &str = "_Art1_Class_To_Specialization";
    pub const GENERALIZATION_TO_SPECIALIZATION: &str = "_Art1_Generalization_To_Specialization";
    pub const CLASS_TO_ATTRIBUTE: &str = "_Art1_Class_To_Attribute";
    pub const CLASS_TO_ROLE: &str = "_Art1_Class_To_Role";
    pub const ROLE_TO_ASSOCIATION: &str = "_Art1_Role_To_Association";
    pub const MODEL_OBJECT_TO_CUSTOM_PROPERTY_TEXT_OBJECT: &str =
        "_Art1_ModelObject_To_CustomPropertyTextObject";
    pub const TYPED_ATTRIBUTE_TO_DATA_TYPE: &str = "_Art1_TypedAttribute_To_DataType";
    pub const TYPED_PARAMETER_TO_DATA_TYPE: &str = "_Art1_TypedParameter_To_DataType";
    pub const EVENT_TO_PARAMETER: &str = "_Art1_Event_To_Parameter";
    pub const ENUMERATION_TO_ENUMERATION_LITERAL: &str = "_Art1_Enumeration_To_EnumerationLiteral";
    pub const STATES_TO_CLASS: &str = "_Art1_States_To_Class";
    pub const SUPER_STATE_TO_SUB_STATES: &str = "_Art1_SuperState_To_SubStates";
    pub const CONCURRENT_STATES_TO_COMPOSITE_STATE: &str =
        "_Art1_ConcurrentStates_To_CompositeState";
    pub const STATE_TO_EVENT_ACTION_BLOCK: &str = "_Art1_State_To_EventActionBlock";
    pub const START_STATE_TO_TRANSITION_START: &str = "_Art1_StartState_To_TransitionStart";
    pub const TRANSITION_END_TO_END_STATE: &str = "_Art1_TransitionEnd_To_EndState";
    pub const EVENT_ACTION_BLOCK_TO_TRANSITION: &str = "_Art1_EventActionBlock_To_Transition";
    pub const EVENT_ACTION_BLOCK_TO_SIGNAL_EVENT: &str = "_Art1_EventActionBlock_To_SignalEvent";
    pub const EVENT_ACTION_BLOCK_TO_CHANGE_EVENT: &str = "_Art1_EventActionBlock_To_ChangeEvent";
    pub const EVENT_ACTION_BLOCK_TO_GUARD_CONDITION: &str =
        "_Art1_EventActionBlock_To_GuardCondition";
    pub const TEXT_OBJECT_TO_MODEL_OBJECT_TOKEN: &str = "_Art1_TextObject_To_ModelObjectToken";
    pub const MODEL_OBJECT_TOKEN_TO_MODEL_OBJECT: &str = "_Art1_ModelObjectToken_To_ModelObject";
    pub const PACKAGE_TO_PACKAGE_ITEM: &str = "_Art1_Package_To_PackageItem";
}

/// Attribute names.
pub mod attr {
    pub const ID: &str = "_Art1_Id";
    pub const RTF: &str = "_Art1_RTF";
    pub const CONSTRUCTION: &str = "_Art1_Construction";
    pub const CUSTOM_PROPERTY_NAME: &str = "_Art1_CustomPropertyName";
    pub const END_MULTIPLICITY: &str = "_Art1_EndMultiplicityUml";
    pub const START_MULTIPLICITY: &str = "_Art1_StartMultiplicityUml";
    pub const ASSOCIATION_END: &str = "_Art1_AssociationEnd";
    pub const STATE_TYPE: &str = "_Art1_StateType";
    pub const EVENT_TYPE: &str = "_Art1_EventType";
    pub const TOKEN_START: &str = "_Art1_TokenStart";
    pub const LAST_NAME_TEXT: &str = "_Art1_LastNameText";
}

/// Custom property name marking an attribute's default value text.
pub const DEFAULT_VALUE_PROPERTY: &str = "Default Value";
