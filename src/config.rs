pub const LOG_ENV: &str = "SCHOOLD_LOG";
pub const ACCEPTANCE_ENV: &str = "SCHOOLD_ACCEPTANCE";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Whether a submitted form reaches its record store before or only after
/// validation passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptancePolicy {
    /// Store only records that pass validation; invalid drafts stay in the form.
    #[default]
    Gated,
    /// Store on submit and report validation afterwards.
    Optimistic,
}

impl AcceptancePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "gated" => Some(Self::Gated),
            "optimistic" => Some(Self::Optimistic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gated => "gated",
            Self::Optimistic => "optimistic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub log_filter: String,
    pub acceptance: AcceptancePolicy,
    /// Problems found while reading the environment, logged once tracing is up.
    pub warnings: Vec<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            acceptance: AcceptancePolicy::default(),
            warnings: Vec::new(),
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(filter) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            cfg.log_filter = filter;
        }
        if let Some(raw) = lookup(ACCEPTANCE_ENV) {
            match AcceptancePolicy::parse(&raw) {
                Some(p) => cfg.acceptance = p,
                None => cfg.warnings.push(format!(
                    "ignoring {}={:?}: expected gated or optimistic",
                    ACCEPTANCE_ENV, raw
                )),
            }
        }
        cfg
    }
}
