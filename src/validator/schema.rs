use crate::flow::{
    Domain, Field, FieldKind, FieldValidation, FlowDocument, Rule, RuleTarget, Step, StepKind,
};
use crate::report::{Diagnostic, DiagnosticCode, Diagnostics, Location, StageReport};
use crate::validator::syntax::type_name;
use ahash::AHashMap;
use serde_json::{Map, Value, json};

/// Stage 2: type and structural correctness against the declarative flow
/// schema, plus the uniqueness constraints a schema table cannot express.
///
/// On success this stage is the single point where the raw JSON is decoded
/// into the typed [`FlowDocument`], including the one-time decode of rule
/// targets from the `proceed_to_<step_id>` string convention into
/// [`RuleTarget`]. Later stages never touch JSON again.
#[derive(Debug)]
pub struct SchemaValidator {
    schema: FlowSchema,
}

/// The fixed declarative schema: one spec table per record type. Built once
/// per validator and shared by reference across validation calls.
#[derive(Debug)]
pub(crate) struct FlowSchema {
    root: &'static [FieldSpec],
    step: &'static [FieldSpec],
    field: &'static [FieldSpec],
    rule: &'static [FieldSpec],
    validation: &'static [FieldSpec],
}

#[derive(Debug)]
pub(crate) struct FieldSpec {
    key: &'static str,
    required: bool,
    kind: ValueKind,
}

/// What a schema-conformant value looks like. String length bounds are
/// inclusive and counted in characters.
#[derive(Debug)]
pub(crate) enum ValueKind {
    Str { min: usize, max: usize },
    Ident { max: usize },
    Enum(&'static [&'static str]),
    Bool,
    UInt { min: u64, max: u64 },
    Number,
    StrArray,
    Array,
    Object,
}

const ROOT_SPECS: &[FieldSpec] = &[
    FieldSpec {
        key: "id",
        required: true,
        kind: ValueKind::Str { min: 1, max: 64 },
    },
    FieldSpec {
        key: "name",
        required: true,
        kind: ValueKind::Str { min: 1, max: 120 },
    },
    FieldSpec {
        key: "domain",
        required: true,
        kind: ValueKind::Enum(Domain::ALL),
    },
    FieldSpec {
        key: "steps",
        required: true,
        kind: ValueKind::Array,
    },
];

const STEP_SPECS: &[FieldSpec] = &[
    FieldSpec {
        key: "id",
        required: true,
        kind: ValueKind::Ident { max: 64 },
    },
    FieldSpec {
        key: "name",
        required: true,
        kind: ValueKind::Str { min: 1, max: 120 },
    },
    FieldSpec {
        key: "type",
        required: true,
        kind: ValueKind::Enum(StepKind::ALL),
    },
    FieldSpec {
        key: "sequence",
        required: true,
        // The decoded model stores sequences as u32; anything above that
        // range must fail here rather than truncate during decode.
        kind: ValueKind::UInt {
            min: 1,
            max: u32::MAX as u64,
        },
    },
    FieldSpec {
        key: "fields",
        required: false,
        kind: ValueKind::Array,
    },
    FieldSpec {
        key: "rules",
        required: false,
        kind: ValueKind::Array,
    },
    FieldSpec {
        key: "depends_on",
        required: false,
        kind: ValueKind::StrArray,
    },
    FieldSpec {
        key: "final_step",
        required: false,
        kind: ValueKind::Bool,
    },
    FieldSpec {
        key: "auto_proceed",
        required: false,
        kind: ValueKind::Bool,
    },
];

const FIELD_SPECS: &[FieldSpec] = &[
    FieldSpec {
        key: "id",
        required: true,
        kind: ValueKind::Ident { max: 64 },
    },
    FieldSpec {
        key: "name",
        required: true,
        kind: ValueKind::Str { min: 1, max: 120 },
    },
    FieldSpec {
        key: "type",
        required: true,
        kind: ValueKind::Enum(FieldKind::ALL),
    },
    FieldSpec {
        key: "required",
        required: true,
        kind: ValueKind::Bool,
    },
    FieldSpec {
        key: "validation",
        required: false,
        kind: ValueKind::Object,
    },
    FieldSpec {
        key: "dependent_on",
        required: false,
        kind: ValueKind::Ident { max: 64 },
    },
];

const RULE_SPECS: &[FieldSpec] = &[
    FieldSpec {
        key: "condition",
        required: true,
        kind: ValueKind::Str { min: 0, max: 500 },
    },
    FieldSpec {
        key: "then",
        required: true,
        kind: ValueKind::Str { min: 1, max: 120 },
    },
];

const VALIDATION_SPECS: &[FieldSpec] = &[
    FieldSpec {
        key: "pattern",
        required: false,
        kind: ValueKind::Str { min: 1, max: 500 },
    },
    FieldSpec {
        key: "min_length",
        required: false,
        kind: ValueKind::UInt {
            min: 0,
            max: u64::MAX,
        },
    },
    FieldSpec {
        key: "max_length",
        required: false,
        kind: ValueKind::UInt {
            min: 0,
            max: u64::MAX,
        },
    },
    FieldSpec {
        key: "min_value",
        required: false,
        kind: ValueKind::Number,
    },
    FieldSpec {
        key: "max_value",
        required: false,
        kind: ValueKind::Number,
    },
];

impl FlowSchema {
    fn table() -> Self {
        FlowSchema {
            root: ROOT_SPECS,
            step: STEP_SPECS,
            field: FIELD_SPECS,
            rule: RULE_SPECS,
            validation: VALIDATION_SPECS,
        }
    }
}

/// Identifier pattern shared by document, step and field ids: non-empty,
/// lowercase ASCII alphanumerics and underscores only. Case-sensitive.
pub(crate) fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaValidator {
    pub fn new() -> Self {
        SchemaValidator {
            schema: FlowSchema::table(),
        }
    }

    pub fn validate(&self, value: &Value) -> StageReport<FlowDocument> {
        let mut diags = Diagnostics::default();
        let root = Location::root();

        // The syntax stage guarantees an object root before this stage runs.
        let Some(obj) = value.as_object() else {
            diags.push(Diagnostic::new(
                DiagnosticCode::SchemaViolation,
                root,
                format!("Document root must be an object, found {}", type_name(value)),
            ));
            return diags.into_failed_report();
        };

        self.check_record(obj, self.schema.root, &root, &mut diags);

        if let Some(id) = obj.get("id").and_then(Value::as_str)
            && !is_identifier(id)
        {
            diags.push(Diagnostic::new(
                DiagnosticCode::SchemaIdFormat,
                root.key("id"),
                format!(
                    "Document id '{}' must contain only lowercase letters, digits and underscores",
                    id
                ),
            ));
        }

        let mut steps = Vec::new();
        let mut seen_step_ids: AHashMap<&str, usize> = AHashMap::new();
        if let Some(elements) = obj.get("steps").and_then(Value::as_array) {
            let steps_loc = root.key("steps");
            for (idx, element) in elements.iter().enumerate() {
                let step_loc = steps_loc.index(idx);
                let Some(step_obj) = element.as_object() else {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SchemaViolation,
                        step_loc,
                        format!("Each step must be an object, found {}", type_name(element)),
                    ));
                    continue;
                };

                self.check_record(step_obj, self.schema.step, &step_loc, &mut diags);

                if let Some(id) = step_obj.get("id").and_then(Value::as_str) {
                    if let Some(first) = seen_step_ids.get(id) {
                        diags.push(
                            Diagnostic::new(
                                DiagnosticCode::SchemaDuplicateStepId,
                                step_loc.key("id"),
                                format!("Duplicate step id '{}'", id),
                            )
                            .with_details(json!({ "first_occurrence": first })),
                        );
                    } else {
                        seen_step_ids.insert(id, idx);
                    }
                }

                steps.push(self.decode_step(step_obj, &step_loc, &mut diags));
            }
        }

        let document = FlowDocument {
            id: str_of(obj, "id"),
            name: str_of(obj, "name"),
            domain: obj
                .get("domain")
                .and_then(Value::as_str)
                .and_then(Domain::parse)
                .unwrap_or(Domain::Document),
            steps,
        };
        diags.into_report(document)
    }

    fn decode_step(
        &self,
        obj: &Map<String, Value>,
        loc: &Location,
        diags: &mut Diagnostics,
    ) -> Step {
        let mut fields = Vec::new();
        let mut seen_field_ids: AHashMap<&str, usize> = AHashMap::new();
        if let Some(elements) = obj.get("fields").and_then(Value::as_array) {
            let fields_loc = loc.key("fields");
            for (idx, element) in elements.iter().enumerate() {
                let field_loc = fields_loc.index(idx);
                let Some(field_obj) = element.as_object() else {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SchemaViolation,
                        field_loc,
                        format!("Each field must be an object, found {}", type_name(element)),
                    ));
                    continue;
                };

                self.check_record(field_obj, self.schema.field, &field_loc, diags);

                if let Some(id) = field_obj.get("id").and_then(Value::as_str) {
                    if let Some(first) = seen_field_ids.get(id) {
                        diags.push(
                            Diagnostic::new(
                                DiagnosticCode::SchemaDuplicateFieldId,
                                field_loc.key("id"),
                                format!("Duplicate field id '{}' within step", id),
                            )
                            .with_details(json!({ "first_occurrence": first })),
                        );
                    } else {
                        seen_field_ids.insert(id, idx);
                    }
                }

                fields.push(self.decode_field(field_obj, &field_loc, diags));
            }
        }

        let mut rules = Vec::new();
        if let Some(elements) = obj.get("rules").and_then(Value::as_array) {
            let rules_loc = loc.key("rules");
            for (idx, element) in elements.iter().enumerate() {
                let rule_loc = rules_loc.index(idx);
                let Some(rule_obj) = element.as_object() else {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SchemaViolation,
                        rule_loc,
                        format!("Each rule must be an object, found {}", type_name(element)),
                    ));
                    continue;
                };

                self.check_record(rule_obj, self.schema.rule, &rule_loc, diags);

                rules.push(Rule {
                    condition: str_of(rule_obj, "condition"),
                    target: RuleTarget::decode(&str_of(rule_obj, "then")),
                });
            }
        }

        let depends_on = obj
            .get("depends_on")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Step {
            id: str_of(obj, "id"),
            name: str_of(obj, "name"),
            kind: obj
                .get("type")
                .and_then(Value::as_str)
                .and_then(StepKind::parse)
                .unwrap_or(StepKind::Process),
            sequence: obj
                .get("sequence")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            fields,
            rules,
            depends_on,
            final_step: obj
                .get("final_step")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            auto_proceed: obj.get("auto_proceed").and_then(Value::as_bool),
        }
    }

    fn decode_field(
        &self,
        obj: &Map<String, Value>,
        loc: &Location,
        diags: &mut Diagnostics,
    ) -> Field {
        let validation = obj
            .get("validation")
            .and_then(Value::as_object)
            .map(|validation_obj| {
                let validation_loc = loc.key("validation");
                self.check_record(
                    validation_obj,
                    self.schema.validation,
                    &validation_loc,
                    diags,
                );
                FieldValidation {
                    pattern: validation_obj
                        .get("pattern")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    min_length: validation_obj.get("min_length").and_then(Value::as_u64),
                    max_length: validation_obj.get("max_length").and_then(Value::as_u64),
                    min_value: validation_obj.get("min_value").and_then(Value::as_f64),
                    max_value: validation_obj.get("max_value").and_then(Value::as_f64),
                }
            });

        Field {
            id: str_of(obj, "id"),
            name: str_of(obj, "name"),
            kind: obj
                .get("type")
                .and_then(Value::as_str)
                .and_then(FieldKind::parse)
                .unwrap_or(FieldKind::Display),
            required: obj
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            validation,
            dependent_on: obj
                .get("dependent_on")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Runs one spec table over one record, converting every violation into
    /// a `SCHEMA_ERROR` diagnostic at the offending key's location.
    fn check_record(
        &self,
        obj: &Map<String, Value>,
        specs: &[FieldSpec],
        loc: &Location,
        diags: &mut Diagnostics,
    ) {
        for spec in specs {
            let Some(value) = obj.get(spec.key) else {
                if spec.required {
                    diags.push(Diagnostic::new(
                        DiagnosticCode::SchemaViolation,
                        loc.key(spec.key),
                        format!("Missing required key '{}'", spec.key),
                    ));
                }
                continue;
            };
            self.check_value(spec.key, value, &spec.kind, loc, diags);
        }
    }

    fn check_value(
        &self,
        key: &str,
        value: &Value,
        kind: &ValueKind,
        record_loc: &Location,
        diags: &mut Diagnostics,
    ) {
        let loc = record_loc.key(key);
        let violation = |message: String| {
            Diagnostic::new(DiagnosticCode::SchemaViolation, loc.clone(), message)
        };

        match kind {
            ValueKind::Str { min, max } => match value.as_str() {
                None => diags.push(violation(format!(
                    "'{}' must be a string, found {}",
                    key,
                    type_name(value)
                ))),
                Some(s) => {
                    let len = s.chars().count();
                    if len < *min || len > *max {
                        diags.push(violation(format!(
                            "'{}' must be between {} and {} characters, found {}",
                            key, min, max, len
                        )));
                    }
                }
            },
            ValueKind::Ident { max } => match value.as_str() {
                None => diags.push(violation(format!(
                    "'{}' must be a string, found {}",
                    key,
                    type_name(value)
                ))),
                Some(s) => {
                    if !is_identifier(s) {
                        diags.push(violation(format!(
                            "'{}' must contain only lowercase letters, digits and underscores",
                            key
                        )));
                    } else if s.chars().count() > *max {
                        diags.push(violation(format!(
                            "'{}' must be at most {} characters",
                            key, max
                        )));
                    }
                }
            },
            ValueKind::Enum(members) => match value.as_str() {
                None => diags.push(violation(format!(
                    "'{}' must be a string, found {}",
                    key,
                    type_name(value)
                ))),
                Some(s) => {
                    if !members.contains(&s) {
                        diags.push(violation(format!(
                            "'{}' must be one of: {}",
                            key,
                            members.join(", ")
                        )));
                    }
                }
            },
            ValueKind::Bool => {
                if !value.is_boolean() {
                    diags.push(violation(format!(
                        "'{}' must be a boolean, found {}",
                        key,
                        type_name(value)
                    )));
                }
            }
            ValueKind::UInt { min, max } => match value.as_u64() {
                None => diags.push(violation(format!(
                    "'{}' must be a non-negative integer, found {}",
                    key,
                    type_name(value)
                ))),
                Some(n) => {
                    if n < *min {
                        diags.push(violation(format!("'{}' must be at least {}", key, min)));
                    } else if n > *max {
                        diags.push(violation(format!("'{}' must be at most {}", key, max)));
                    }
                }
            },
            ValueKind::Number => {
                if value.as_f64().is_none() {
                    diags.push(violation(format!(
                        "'{}' must be a number, found {}",
                        key,
                        type_name(value)
                    )));
                }
            }
            ValueKind::StrArray => match value.as_array() {
                None => diags.push(violation(format!(
                    "'{}' must be an array, found {}",
                    key,
                    type_name(value)
                ))),
                Some(entries) => {
                    for (idx, entry) in entries.iter().enumerate() {
                        if !entry.is_string() {
                            diags.push(Diagnostic::new(
                                DiagnosticCode::SchemaViolation,
                                loc.index(idx),
                                format!(
                                    "Entries of '{}' must be strings, found {}",
                                    key,
                                    type_name(entry)
                                ),
                            ));
                        }
                    }
                }
            },
            ValueKind::Array => {
                if !value.is_array() {
                    diags.push(violation(format!(
                        "'{}' must be an array, found {}",
                        key,
                        type_name(value)
                    )));
                }
            }
            ValueKind::Object => {
                if !value.is_object() {
                    diags.push(violation(format!(
                        "'{}' must be an object, found {}",
                        key,
                        type_name(value)
                    )));
                }
            }
        }
    }
}

fn str_of(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
