use crate::entity::{EntityKind, FieldValue, Fields};
use crate::filter::filter_view;
use crate::forms::{FormError, FormEvent, FormState};
use crate::ipc::error::{err, internal, ok};
use crate::ipc::helpers::{entity_param, merge_object, optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::schema::schema_for;
use crate::store;
use crate::validate;
use serde_json::json;

const SUBMITTED_MESSAGE: &str = "Formulaire soumis avec succès!";

fn form_error(req: &Request, e: FormError) -> serde_json::Value {
    let code = match e {
        FormError::UnknownField { .. } => "unknown_field",
        FormError::WrongValueType { .. } => "bad_params",
    };
    err(&req.id, code, e.to_string(), None)
}

/// Form snapshot plus the filter view the table renders under it.
fn form_view(
    state: &AppState,
    req: &Request,
    form: &FormState,
    extra: serde_json::Value,
) -> serde_json::Value {
    let records = match store::list_records(&state.db, form.entity) {
        Ok(v) => v,
        Err(e) => return internal(&req.id, "db_query_failed", e),
    };
    let rows = filter_view(&records, &form.search);
    let mut result = json!({
        "form": form,
        "rows": rows,
        "total": records.len(),
    });
    merge_object(&mut result, extra);
    ok(&req.id, result)
}

fn handle_schema_describe(_state: &mut AppState, req: &Request) -> serde_json::Value {
    match entity_param(req) {
        Ok(kind) => ok(&req.id, schema_for(kind).describe()),
        Err(resp) => resp,
    }
}

fn handle_validate(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match entity_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let schema = schema_for(kind);
    let Some(raw) = req.params.get("fields").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "missing fields object", None);
    };

    let mut fields = Fields::new();
    for (name, value) in raw {
        if schema.field(name).is_none() {
            return form_error(
                req,
                FormError::UnknownField {
                    kind: kind.as_str(),
                    field: name.clone(),
                },
            );
        }
        let Some(v) = FieldValue::from_json(value) else {
            return err(
                &req.id,
                "bad_params",
                format!("unsupported value for {name}"),
                None,
            );
        };
        fields.insert(name.clone(), v);
    }

    let found = validate::violations(schema, &fields);
    ok(
        &req.id,
        json!({
            "valid": found.is_empty(),
            "errors": validate::error_map(&found),
            "violations": found,
        }),
    )
}

fn handle_forms_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match entity_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let form = state.form(kind);
    form_view(state, req, &form, json!({}))
}

fn handle_forms_change(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match entity_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let field = match required_str(req, "field") {
        Ok(f) => f.to_string(),
        Err(resp) => return resp,
    };
    let raw = req.params.get("value").unwrap_or(&serde_json::Value::Null);
    let Some(value) = FieldValue::from_json(raw) else {
        return err(
            &req.id,
            "bad_params",
            "value must be text, a number, or {name, size}",
            None,
        );
    };
    let policy = match state.acceptance() {
        Ok(p) => p,
        Err(e) => return internal(&req.id, "db_query_failed", e),
    };

    let form = state.form(kind);
    match form.apply(FormEvent::FieldChanged { field, value }, policy) {
        Ok(t) => {
            state.forms.insert(kind, t.state.clone());
            ok(&req.id, json!({ "form": t.state }))
        }
        Err(e) => form_error(req, e),
    }
}

fn handle_forms_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match entity_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let policy = match state.acceptance() {
        Ok(p) => p,
        Err(e) => return internal(&req.id, "db_query_failed", e),
    };

    let form = state.form(kind);
    let t = match form.apply(FormEvent::SubmitRequested, policy) {
        Ok(t) => t,
        Err(e) => return form_error(req, e),
    };

    let mut record = None;
    if let Some(accepted) = &t.accepted {
        match store::append_record(&state.db, kind, &accepted.fields, accepted.valid) {
            Ok(r) => {
                tracing::info!(
                    entity = kind.as_str(),
                    id = %r.id,
                    valid = r.valid,
                    policy = policy.as_str(),
                    "record accepted"
                );
                record = Some(r);
            }
            // The form keeps its draft when the store refuses the record.
            Err(e) => return internal(&req.id, "db_insert_failed", e),
        }
    }

    let errors = t.state.errors();
    let message = if errors.is_empty() {
        Some(SUBMITTED_MESSAGE)
    } else {
        None
    };
    state.forms.insert(kind, t.state.clone());
    form_view(
        state,
        req,
        &t.state,
        json!({
            "accepted": record.is_some(),
            "record": record,
            "valid": errors.is_empty(),
            "errors": errors,
            "message": message,
        }),
    )
}

fn handle_forms_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match entity_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let term = optional_str(req, "term").to_string();
    let policy = match state.acceptance() {
        Ok(p) => p,
        Err(e) => return internal(&req.id, "db_query_failed", e),
    };
    let form = state.form(kind);
    match form.apply(FormEvent::SearchChanged(term), policy) {
        Ok(t) => {
            state.forms.insert(kind, t.state.clone());
            form_view(state, req, &t.state, json!({}))
        }
        Err(e) => form_error(req, e),
    }
}

fn handle_records_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind: EntityKind = match entity_param(req) {
        Ok(k) => k,
        Err(resp) => return resp,
    };
    let search = optional_str(req, "search");
    match store::list_records(&state.db, kind) {
        Ok(records) => {
            let rows = filter_view(&records, search);
            ok(
                &req.id,
                json!({ "entity": kind, "rows": rows, "total": records.len() }),
            )
        }
        Err(e) => internal(&req.id, "db_query_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schema.describe" => Some(handle_schema_describe(state, req)),
        "validate" => Some(handle_validate(state, req)),
        "forms.open" => Some(handle_forms_open(state, req)),
        "forms.change" => Some(handle_forms_change(state, req)),
        "forms.submit" => Some(handle_forms_submit(state, req)),
        "forms.search" => Some(handle_forms_search(state, req)),
        "records.list" => Some(handle_records_list(state, req)),
        _ => None,
    }
}
