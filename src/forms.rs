use crate::config::AcceptancePolicy;
use crate::entity::{EntityKind, FieldValue, Fields};
use crate::schema::{schema_for, InputKind};
use crate::validate::{self, ErrorMap};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    FieldChanged { field: String, value: FieldValue },
    SubmitRequested,
    SearchChanged(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Editing,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "errors", rename_all = "camelCase")]
pub enum ValidationState {
    NotRun,
    Valid,
    Invalid(ErrorMap),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{kind} has no field named {field:?}")]
    UnknownField { kind: &'static str, field: String },
    #[error("{kind}.{field} expects a {expected} value")]
    WrongValueType {
        kind: &'static str,
        field: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub entity: EntityKind,
    pub phase: Phase,
    pub draft: Fields,
    pub validation: ValidationState,
    pub search: String,
}

/// What the store has to append after a submit.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub fields: Fields,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: FormState,
    pub accepted: Option<Accepted>,
}

/// Empty text for every text/date input; file inputs stay absent until a
/// file is picked.
pub fn blank_draft(kind: EntityKind) -> Fields {
    schema_for(kind)
        .fields
        .iter()
        .filter(|f| f.input != InputKind::File)
        .map(|f| (f.name.to_string(), FieldValue::text("")))
        .collect()
}

impl FormState {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            entity: kind,
            phase: Phase::Idle,
            draft: blank_draft(kind),
            validation: ValidationState::NotRun,
            search: String::new(),
        }
    }

    pub fn errors(&self) -> ErrorMap {
        match &self.validation {
            ValidationState::Invalid(errors) => errors.clone(),
            ValidationState::NotRun | ValidationState::Valid => ErrorMap::new(),
        }
    }

    pub fn apply(
        &self,
        event: FormEvent,
        policy: AcceptancePolicy,
    ) -> Result<Transition, FormError> {
        match event {
            FormEvent::FieldChanged { field, value } => {
                let next = self.with_field(field, value)?;
                Ok(Transition {
                    state: next,
                    accepted: None,
                })
            }
            FormEvent::SubmitRequested => Ok(self.submit(policy)),
            FormEvent::SearchChanged(term) => Ok(Transition {
                state: FormState {
                    search: term,
                    ..self.clone()
                },
                accepted: None,
            }),
        }
    }

    fn with_field(&self, field: String, value: FieldValue) -> Result<FormState, FormError> {
        let kind = self.entity.as_str();
        let Some(spec) = schema_for(self.entity).field(&field) else {
            return Err(FormError::UnknownField { kind, field });
        };
        let type_ok = match (&value, spec.input) {
            (FieldValue::File(_), InputKind::File) => true,
            (FieldValue::File(_), _) => false,
            // Clearing a file input arrives as empty text.
            (FieldValue::Text(s), InputKind::File) => s.is_empty(),
            (FieldValue::Text(_), _) => true,
        };
        if !type_ok {
            let expected = if spec.input == InputKind::File {
                "file"
            } else {
                "text"
            };
            return Err(FormError::WrongValueType {
                kind,
                field,
                expected,
            });
        }

        let mut draft = self.draft.clone();
        if spec.input == InputKind::File && value.is_empty() {
            draft.remove(&field);
        } else {
            draft.insert(field, value);
        }
        Ok(FormState {
            phase: Phase::Editing,
            draft,
            ..self.clone()
        })
    }

    fn submit(&self, policy: AcceptancePolicy) -> Transition {
        let schema = schema_for(self.entity);
        let outcome = validate::validate(schema, &self.draft);
        let valid = outcome.is_ok();
        let validation = match outcome {
            Ok(()) => ValidationState::Valid,
            Err(errors) => ValidationState::Invalid(errors),
        };

        let store_it = match policy {
            AcceptancePolicy::Gated => valid,
            // Forms with an attachment only ever appended once a file was picked.
            AcceptancePolicy::Optimistic => schema
                .attachment_field()
                .map(|f| self.draft.contains_key(f.name))
                .unwrap_or(true),
        };

        if !store_it {
            return Transition {
                state: FormState {
                    phase: Phase::Editing,
                    validation,
                    ..self.clone()
                },
                accepted: None,
            };
        }

        Transition {
            state: FormState {
                entity: self.entity,
                phase: Phase::Submitted,
                draft: blank_draft(self.entity),
                validation,
                search: self.search.clone(),
            },
            accepted: Some(Accepted {
                fields: self.draft.clone(),
                valid,
            }),
        }
    }
}
