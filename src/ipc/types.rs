use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use serde::Deserialize;

use crate::config::{AcceptancePolicy, DaemonConfig};
use crate::db;
use crate::entity::EntityKind;
use crate::forms::FormState;
use crate::payments::PaymentForm;

pub const ACCEPTANCE_KEY: &str = "forms.acceptance";

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: DaemonConfig,
    pub db: Connection,
    pub forms: HashMap<EntityKind, FormState>,
    pub payment_form: PaymentForm,
    pub rng: StdRng,
}

impl AppState {
    pub fn new(config: DaemonConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            db: db::open_session_db()?,
            forms: HashMap::new(),
            payment_form: PaymentForm::default(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Drops every store and form, like reloading the page.
    pub fn reset(&mut self) -> anyhow::Result<()> {
        self.db = db::open_session_db()?;
        self.forms.clear();
        self.payment_form = PaymentForm::default();
        Ok(())
    }

    pub fn form(&self, kind: EntityKind) -> FormState {
        self.forms
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| FormState::new(kind))
    }

    /// Runtime setting first, then the value the daemon was started with.
    pub fn acceptance(&self) -> anyhow::Result<AcceptancePolicy> {
        let stored = db::settings_get_json(&self.db, ACCEPTANCE_KEY)?;
        Ok(stored
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(AcceptancePolicy::parse)
            .unwrap_or(self.config.acceptance))
    }
}
