use serde::Serialize;
use std::fmt;

/// The canonical, fully-decoded form of a flow document. Produced once by
/// the schema stage; every later stage reads it and none mutates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowDocument {
    pub id: String,
    pub name: String,
    pub domain: Domain,
    pub steps: Vec<Step>,
}

impl FlowDocument {
    /// The flow's entry point: the step with the lowest `sequence` value.
    pub fn entry_step(&self) -> Option<&Step> {
        self.steps.iter().min_by_key(|s| s.sequence)
    }
}

/// Product category a flow belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Visa,
    Enrollment,
    Consultation,
    Payment,
    Document,
}

impl Domain {
    pub const ALL: &'static [&'static str] =
        &["visa", "enrollment", "consultation", "payment", "document"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visa" => Some(Domain::Visa),
            "enrollment" => Some(Domain::Enrollment),
            "consultation" => Some(Domain::Consultation),
            "payment" => Some(Domain::Payment),
            "document" => Some(Domain::Document),
            _ => None,
        }
    }
}

/// One stage within a flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub sequence: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub final_step: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_proceed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Form,
    Process,
    Decision,
    Payment,
    Document,
}

impl StepKind {
    pub const ALL: &'static [&'static str] =
        &["form", "process", "decision", "payment", "document"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "form" => Some(StepKind::Form),
            "process" => Some(StepKind::Process),
            "decision" => Some(StepKind::Decision),
            "payment" => Some(StepKind::Payment),
            "document" => Some(StepKind::Document),
            _ => None,
        }
    }
}

/// One input element within a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependent_on: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    TextInput,
    File,
    Dropdown,
    DatePicker,
    Checkbox,
    RadioGroup,
    Textarea,
    Display,
}

impl FieldKind {
    pub const ALL: &'static [&'static str] = &[
        "text_input",
        "file",
        "dropdown",
        "date_picker",
        "checkbox",
        "radio_group",
        "textarea",
        "display",
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text_input" => Some(FieldKind::TextInput),
            "file" => Some(FieldKind::File),
            "dropdown" => Some(FieldKind::Dropdown),
            "date_picker" => Some(FieldKind::DatePicker),
            "checkbox" => Some(FieldKind::Checkbox),
            "radio_group" => Some(FieldKind::RadioGroup),
            "textarea" => Some(FieldKind::Textarea),
            "display" => Some(FieldKind::Display),
            _ => None,
        }
    }
}

/// Declarative constraints attached to a field.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.min_value.is_none()
            && self.max_value.is_none()
    }
}

/// A conditional transition attached to a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub condition: String,
    #[serde(rename = "then")]
    pub target: RuleTarget,
}

/// Decoded transition target. The wire format encodes targets as a string
/// convention (`"proceed_to_<step_id>"`); it is decoded here exactly once,
/// during schema validation. Later stages match on the variants and never
/// parse strings again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleTarget {
    Proceed { step_id: String },
    Terminate,
    Other { raw: String },
}

impl RuleTarget {
    const PROCEED_PREFIX: &'static str = "proceed_to_";

    pub fn decode(raw: &str) -> Self {
        if let Some(step_id) = raw.strip_prefix(Self::PROCEED_PREFIX) {
            RuleTarget::Proceed {
                step_id: step_id.to_string(),
            }
        } else if raw == "terminate" || raw == "complete" {
            RuleTarget::Terminate
        } else {
            RuleTarget::Other {
                raw: raw.to_string(),
            }
        }
    }
}

impl fmt::Display for RuleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleTarget::Proceed { step_id } => {
                write!(f, "{}{}", Self::PROCEED_PREFIX, step_id)
            }
            RuleTarget::Terminate => f.write_str("terminate"),
            RuleTarget::Other { raw } => f.write_str(raw),
        }
    }
}
