use crate::filter::Searchable;
use crate::roster::RosterEntry;
use chrono::NaiveDate;
use serde::Serialize;

pub const AMOUNT_REQUIRED: &str = "Le montant est requis.";
pub const AMOUNT_NOT_NUMERIC: &str = "Le montant doit être un nombre.";

/// How the payment form identifies the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentLookup {
    /// Selector listing registered students by display name.
    Name,
    /// Free text holding the student's matricule.
    #[default]
    Matricule,
}

impl PaymentLookup {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "matricule" => Some(Self::Matricule),
            _ => None,
        }
    }

    fn find<'a>(self, roster: &'a [RosterEntry], reference: &str) -> Option<&'a RosterEntry> {
        match self {
            Self::Name => roster.iter().find(|s| s.name == reference),
            Self::Matricule => roster.iter().find(|s| s.matricule == reference),
        }
    }

    fn not_found_message(self) -> &'static str {
        match self {
            Self::Name => "Veuillez inscrire cet élève avant de procéder au paiement.",
            Self::Matricule => "L'élève n'est pas inscrit.",
        }
    }

    fn success_message(self, payment: &Payment) -> String {
        match self {
            Self::Name => format!(
                "Paiement de {} pour {} effectué avec succès !",
                payment.montant, payment.nom
            ),
            Self::Matricule => "Paiement réussi.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    Student,
    Amount,
}

impl PaymentField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "amount" => Some(Self::Amount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    FieldChanged { field: PaymentField, value: String },
    SubmitRequested,
    SearchChanged(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub nom: String,
    pub matricule: String,
    pub montant: String,
    pub date: String,
}

impl Searchable for Payment {
    fn search_values(&self) -> Vec<&str> {
        vec![self.nom.as_str(), self.matricule.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    pub lookup: PaymentLookup,
    pub student: String,
    pub amount: String,
    pub status: Option<PaymentStatus>,
    pub search: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentTransition {
    pub state: PaymentForm,
    pub recorded: Option<Payment>,
}

pub fn format_payment_date(day: NaiveDate) -> String {
    day.format("%d/%m/%Y").to_string()
}

fn amount_problem(amount: &str) -> Option<&'static str> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Some(AMOUNT_REQUIRED);
    }
    match amount.parse::<f64>() {
        Ok(v) if v.is_finite() => None,
        _ => Some(AMOUNT_NOT_NUMERIC),
    }
}

impl PaymentForm {
    pub fn new(lookup: PaymentLookup) -> Self {
        Self {
            lookup,
            ..Self::default()
        }
    }

    pub fn apply(
        &self,
        event: PaymentEvent,
        roster: &[RosterEntry],
        today: NaiveDate,
    ) -> PaymentTransition {
        match event {
            PaymentEvent::FieldChanged { field, value } => {
                let mut next = self.clone();
                match field {
                    PaymentField::Student => next.student = value,
                    PaymentField::Amount => next.amount = value,
                }
                PaymentTransition {
                    state: next,
                    recorded: None,
                }
            }
            PaymentEvent::SearchChanged(term) => PaymentTransition {
                state: PaymentForm {
                    search: term,
                    ..self.clone()
                },
                recorded: None,
            },
            PaymentEvent::SubmitRequested => self.submit(roster, today),
        }
    }

    fn submit(&self, roster: &[RosterEntry], today: NaiveDate) -> PaymentTransition {
        let failed = |message: &str| PaymentTransition {
            state: PaymentForm {
                status: Some(PaymentStatus {
                    ok: false,
                    message: message.to_string(),
                }),
                ..self.clone()
            },
            recorded: None,
        };

        if let Some(problem) = amount_problem(&self.amount) {
            return failed(problem);
        }
        let Some(student) = self.lookup.find(roster, self.student.trim()) else {
            return failed(self.lookup.not_found_message());
        };

        let payment = Payment {
            nom: student.name.clone(),
            matricule: student.matricule.clone(),
            montant: self.amount.trim().to_string(),
            date: format_payment_date(today),
        };
        let mut next = PaymentForm {
            amount: String::new(),
            status: Some(PaymentStatus {
                ok: true,
                message: self.lookup.success_message(&payment),
            }),
            ..self.clone()
        };
        if self.lookup == PaymentLookup::Name {
            next.student.clear();
        }
        PaymentTransition {
            state: next,
            recorded: Some(payment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<RosterEntry> {
        vec![RosterEntry {
            name: "Amina".into(),
            age: Some(8),
            matricule: "ELV-123456".into(),
        }]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 3).expect("date")
    }

    fn filled(lookup: PaymentLookup, student: &str, amount: &str) -> PaymentForm {
        PaymentForm {
            student: student.into(),
            amount: amount.into(),
            ..PaymentForm::new(lookup)
        }
    }

    #[test]
    fn matricule_payment_for_registered_student() {
        let form = filled(PaymentLookup::Matricule, "ELV-123456", "15000");
        let t = form.apply(PaymentEvent::SubmitRequested, &roster(), today());
        assert_eq!(
            t.recorded,
            Some(Payment {
                nom: "Amina".into(),
                matricule: "ELV-123456".into(),
                montant: "15000".into(),
                date: "03/10/2024".into(),
            })
        );
        assert_eq!(t.state.amount, "");
        assert_eq!(t.state.student, "ELV-123456");
        assert_eq!(
            t.state.status,
            Some(PaymentStatus {
                ok: true,
                message: "Paiement réussi.".into()
            })
        );
    }

    #[test]
    fn name_payment_clears_selector_and_reports_amount() {
        let form = filled(PaymentLookup::Name, "Amina", "25000");
        let t = form.apply(PaymentEvent::SubmitRequested, &roster(), today());
        assert!(t.recorded.is_some());
        assert_eq!(t.state.student, "");
        assert_eq!(t.state.amount, "");
        assert_eq!(
            t.state.status.map(|s| s.message).as_deref(),
            Some("Paiement de 25000 pour Amina effectué avec succès !")
        );
    }

    #[test]
    fn unknown_student_changes_nothing_but_status() {
        let form = filled(PaymentLookup::Matricule, "ELV-999999", "15000");
        let t = form.apply(PaymentEvent::SubmitRequested, &roster(), today());
        assert!(t.recorded.is_none());
        assert_eq!(t.state.amount, "15000");
        assert_eq!(
            t.state.status,
            Some(PaymentStatus {
                ok: false,
                message: "L'élève n'est pas inscrit.".into()
            })
        );

        let form = filled(PaymentLookup::Name, "Paul", "15000");
        let t = form.apply(PaymentEvent::SubmitRequested, &roster(), today());
        assert!(t.recorded.is_none());
        assert_eq!(
            t.state.status.map(|s| s.message).as_deref(),
            Some("Veuillez inscrire cet élève avant de procéder au paiement.")
        );
    }

    #[test]
    fn amount_must_be_present_and_numeric() {
        for (amount, message) in [("", AMOUNT_REQUIRED), ("quinze", AMOUNT_NOT_NUMERIC)] {
            let form = filled(PaymentLookup::Matricule, "ELV-123456", amount);
            let t = form.apply(PaymentEvent::SubmitRequested, &roster(), today());
            assert!(t.recorded.is_none());
            assert_eq!(t.state.status.map(|s| s.message).as_deref(), Some(message));
        }
    }

    #[test]
    fn field_and_search_events_only_edit_the_form() {
        let form = PaymentForm::new(PaymentLookup::Matricule);
        let t = form.apply(
            PaymentEvent::FieldChanged {
                field: PaymentField::Amount,
                value: "5000".into(),
            },
            &roster(),
            today(),
        );
        assert_eq!(t.state.amount, "5000");
        let t = t
            .state
            .apply(PaymentEvent::SearchChanged("ami".into()), &roster(), today());
        assert_eq!(t.state.search, "ami");
        assert_eq!(t.state.amount, "5000");
        assert!(t.recorded.is_none());
    }
}
