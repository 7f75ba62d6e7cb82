use crate::filter::filter_view;
use crate::ipc::error::{err, internal, ok};
use crate::ipc::helpers::{merge_object, optional_str, required_str, text_param};
use crate::ipc::types::{AppState, Request};
use crate::payments::{PaymentEvent, PaymentField, PaymentForm, PaymentLookup};
use crate::store;
use serde_json::json;

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Payment form snapshot with the payments table narrowed by its search box.
fn payment_view(
    state: &AppState,
    req: &Request,
    extra: serde_json::Value,
) -> serde_json::Value {
    let payments = match store::list_payments(&state.db) {
        Ok(v) => v,
        Err(e) => return internal(&req.id, "db_query_failed", e),
    };
    let rows = filter_view(&payments, &state.payment_form.search);
    let mut result = json!({
        "form": state.payment_form,
        "rows": rows,
        "total": payments.len(),
    });
    merge_object(&mut result, extra);
    ok(&req.id, result)
}

fn apply_event(state: &mut AppState, req: &Request, event: PaymentEvent) -> serde_json::Value {
    let roster = match store::list_roster(&state.db) {
        Ok(v) => v,
        Err(e) => return internal(&req.id, "db_query_failed", e),
    };
    let submitted = event == PaymentEvent::SubmitRequested;
    let t = state.payment_form.apply(event, &roster, today());

    if let Some(payment) = &t.recorded {
        if let Err(e) = store::append_payment(&state.db, payment) {
            return internal(&req.id, "db_insert_failed", e);
        }
        tracing::info!(
            matricule = %payment.matricule,
            montant = %payment.montant,
            "payment recorded"
        );
    } else if let Some(status) = t.state.status.as_ref().filter(|s| submitted && !s.ok) {
        tracing::warn!(student = %t.state.student, reason = %status.message, "payment refused");
    }

    let recorded = t.recorded.clone();
    state.payment_form = t.state;
    payment_view(
        state,
        req,
        json!({
            "recorded": recorded.is_some(),
            "payment": recorded,
        }),
    )
}

fn handle_payments_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(raw) = req.params.get("lookup").and_then(|v| v.as_str()) {
        let Some(lookup) = PaymentLookup::parse(raw) else {
            return err(
                &req.id,
                "bad_params",
                "lookup must be \"name\" or \"matricule\"",
                None,
            );
        };
        if lookup != state.payment_form.lookup {
            state.payment_form = PaymentForm {
                search: state.payment_form.search.clone(),
                ..PaymentForm::new(lookup)
            };
        }
    }
    payment_view(state, req, json!({}))
}

fn handle_payments_change(state: &mut AppState, req: &Request) -> serde_json::Value {
    let field = match required_str(req, "field") {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let Some(field) = PaymentField::parse(field) else {
        return err(
            &req.id,
            "unknown_field",
            format!("payment form has no field named {field:?}"),
            None,
        );
    };
    let value = match text_param(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    apply_event(state, req, PaymentEvent::FieldChanged { field, value })
}

fn handle_payments_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    apply_event(state, req, PaymentEvent::SubmitRequested)
}

fn handle_payments_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let term = optional_str(req, "term").to_string();
    apply_event(state, req, PaymentEvent::SearchChanged(term))
}

fn handle_payments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let search = optional_str(req, "search");
    match store::list_payments(&state.db) {
        Ok(payments) => {
            let rows = filter_view(&payments, search);
            ok(&req.id, json!({ "rows": rows, "total": payments.len() }))
        }
        Err(e) => internal(&req.id, "db_query_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "payments.open" => Some(handle_payments_open(state, req)),
        "payments.change" => Some(handle_payments_change(state, req)),
        "payments.submit" => Some(handle_payments_submit(state, req)),
        "payments.search" => Some(handle_payments_search(state, req)),
        "payments.list" => Some(handle_payments_list(state, req)),
        _ => None,
    }
}
