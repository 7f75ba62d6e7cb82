use crate::filter::filter_view;
use crate::ipc::error::{err, internal, ok};
use crate::ipc::helpers::optional_str;
use crate::ipc::types::{AppState, Request};
use crate::matricule;
use crate::roster::{self, RegistrationError};
use crate::store;
use serde_json::json;

fn handle_matricule_generate(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({ "matricule": matricule::generate(&mut state.rng) }),
    )
}

fn handle_registrations_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = optional_str(req, "name");
    let age = match req.params.get("age") {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => match v
            .as_u64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
            .and_then(|n| u32::try_from(n).ok())
        {
            Some(n) => Some(n),
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    "age must be a non-negative whole number",
                    None,
                )
            }
        },
    };

    let roster_now = match store::list_roster(&state.db) {
        Ok(v) => v,
        Err(e) => return internal(&req.id, "db_query_failed", e),
    };
    let rng = &mut state.rng;
    let registration = match roster::register(&roster_now, name, age, || matricule::generate(rng)) {
        Ok(r) => r,
        Err(RegistrationError::EmptyName) => {
            return ok(
                &req.id,
                json!({
                    "registered": false,
                    "status": { "ok": false, "message": "Le nom de l'élève est requis." },
                }),
            )
        }
        Err(e @ RegistrationError::MatriculeExhausted { .. }) => {
            tracing::warn!(error = %e, "registration failed");
            return err(&req.id, "matricule_exhausted", e.to_string(), None);
        }
    };

    if let Err(e) = store::append_roster(&state.db, &registration.entry) {
        return internal(&req.id, "db_insert_failed", e);
    }
    tracing::info!(
        matricule = %registration.entry.matricule,
        "student registered"
    );
    ok(
        &req.id,
        json!({
            "registered": true,
            "entry": registration.entry,
            "status": { "ok": true, "message": registration.status },
        }),
    )
}

fn handle_registrations_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let search = optional_str(req, "search");
    match store::list_roster(&state.db) {
        Ok(roster) => {
            let rows = filter_view(&roster, search);
            ok(&req.id, json!({ "rows": rows, "total": roster.len() }))
        }
        Err(e) => internal(&req.id, "db_query_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "matricule.generate" => Some(handle_matricule_generate(state, req)),
        "registrations.create" => Some(handle_registrations_create(state, req)),
        "registrations.list" => Some(handle_registrations_list(state, req)),
        _ => None,
    }
}
