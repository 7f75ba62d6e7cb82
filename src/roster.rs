use crate::filter::Searchable;
use crate::matricule;
use serde::Serialize;

/// Re-draws allowed before registration gives up on finding a free matricule.
pub const MAX_DRAWS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub matricule: String,
}

impl Searchable for RosterEntry {
    fn search_values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.matricule.as_str()]
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("student name must not be empty")]
    EmptyName,
    #[error("no free matricule after {attempts} draws")]
    MatriculeExhausted { attempts: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub entry: RosterEntry,
    pub status: String,
}

pub fn success_message(name: &str) -> String {
    format!("L'élève {} a été inscrit avec succès !", name)
}

/// Builds the roster entry for a new student. `draw` yields candidate
/// matricules; malformed ones and ones already on the roster are skipped.
pub fn register<F>(
    roster: &[RosterEntry],
    name: &str,
    age: Option<u32>,
    mut draw: F,
) -> Result<Registration, RegistrationError>
where
    F: FnMut() -> String,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistrationError::EmptyName);
    }
    for _ in 0..MAX_DRAWS {
        let candidate = draw();
        if !matricule::is_well_formed(&candidate)
            || roster.iter().any(|e| e.matricule == candidate)
        {
            continue;
        }
        return Ok(Registration {
            entry: RosterEntry {
                name: name.to_string(),
                age,
                matricule: candidate,
            },
            status: success_message(name),
        });
    }
    Err(RegistrationError::MatriculeExhausted {
        attempts: MAX_DRAWS,
    })
}
