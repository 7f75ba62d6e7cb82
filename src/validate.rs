use crate::entity::{FieldValue, Fields};
use crate::schema::{FieldSpec, Rule, Schema};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Field name -> message shown under the input.
pub type ErrorMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub field: String,
    pub rule: &'static str,
    pub message: String,
}

/// Runs every field of the schema and returns each failing rule in
/// declaration order.
pub fn violations(schema: &Schema, fields: &Fields) -> Vec<Violation> {
    let mut out = Vec::new();
    for spec in &schema.fields {
        check_field(spec, fields.get(spec.name), &mut out);
    }
    out
}

/// Collapses violations to one message per field; the last one reported wins.
pub fn error_map(violations: &[Violation]) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for v in violations {
        errors.insert(v.field.clone(), v.message.clone());
    }
    errors
}

pub fn validate(schema: &Schema, fields: &Fields) -> Result<(), ErrorMap> {
    let found = violations(schema, fields);
    if found.is_empty() {
        Ok(())
    } else {
        Err(error_map(&found))
    }
}

fn check_field(spec: &FieldSpec, value: Option<&FieldValue>, out: &mut Vec<Violation>) {
    let absent = value.map(FieldValue::is_empty).unwrap_or(true);
    let mut push = |rule: &Rule| {
        out.push(Violation {
            field: spec.name.to_string(),
            rule: rule.name(),
            message: rule.message().to_string(),
        })
    };

    if absent {
        if spec.optional {
            return;
        }
        // An absent value only ever reports the rule that asks for presence.
        let presence = spec
            .rules
            .iter()
            .find(|r| matches!(r, Rule::Required(_)))
            .or_else(|| spec.rules.iter().find(|r| matches!(r, Rule::OneOf(..))));
        if let Some(rule) = presence {
            push(rule);
        }
        return;
    }

    let Some(value) = value else {
        return;
    };
    for rule in &spec.rules {
        if !rule_passes(rule, value) {
            push(rule);
        }
    }
}

fn rule_passes(rule: &Rule, value: &FieldValue) -> bool {
    match rule {
        Rule::Required(_) => !value.is_empty(),
        Rule::FileSize(max, _) => value.as_file().map(|f| f.size <= *max).unwrap_or(false),
        Rule::MinLength(n, _) => text_len(value).map(|len| len >= *n).unwrap_or(false),
        Rule::MaxLength(n, _) => text_len(value).map(|len| len <= *n).unwrap_or(false),
        Rule::Pattern(re, _) => value.as_text().map(|s| re.is_match(s)).unwrap_or(false),
        Rule::OneOf(allowed, _) => value
            .as_text()
            .map(|s| allowed.contains(&s))
            .unwrap_or(false),
        Rule::Date(_) => value.as_text().map(is_calendar_date).unwrap_or(false),
    }
}

fn text_len(value: &FieldValue) -> Option<usize> {
    value.as_text().map(|s| s.chars().count())
}

fn is_calendar_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, FileRef};
    use crate::schema::{schema_for, MAX_FILE_BYTES};

    fn photo(size: u64) -> FieldValue {
        FieldValue::File(FileRef {
            name: "photo.jpg".into(),
            size,
        })
    }

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::text(*v)))
            .collect()
    }

    fn valid_teacher() -> Fields {
        let mut f = fields(&[
            ("firstName", "Paul"),
            ("lastName", "Biya"),
            ("residence", "Yaounde"),
            ("phoneNumber", "699112233"),
            ("email", "paul@ecole.cm"),
            ("classe", "CM2"),
        ]);
        f.insert("photo".into(), photo(1024));
        f
    }

    fn valid_student() -> Fields {
        let mut f = fields(&[
            ("firstName", "Amina"),
            ("lastName", "Njoya"),
            ("birthDate", "2016-03-14"),
            ("gender", "female"),
            ("residence", "Douala"),
            ("classe", "CE1"),
            ("parent", "parentx"),
        ]);
        f.insert("photo".into(), photo(2048));
        f
    }

    fn errors_for(kind: EntityKind, f: &Fields) -> ErrorMap {
        validate(schema_for(kind), f).err().unwrap_or_default()
    }

    #[test]
    fn valid_entities_pass() {
        assert_eq!(validate(schema_for(EntityKind::Teacher), &valid_teacher()), Ok(()));
        assert_eq!(validate(schema_for(EntityKind::Student), &valid_student()), Ok(()));
    }

    #[test]
    fn empty_required_field_reports_only_required_message() {
        let mut f = valid_teacher();
        f.insert("phoneNumber".into(), FieldValue::text(""));
        let errors = errors_for(EntityKind::Teacher, &f);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["phoneNumber"], "Le numéro est requis");

        f.remove("firstName");
        let errors = errors_for(EntityKind::Teacher, &f);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["firstName"], "Le prénom est requis");
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = errors_for(EntityKind::Student, &Fields::new());
        assert_eq!(errors["gender"], "Le sexe de l'enfant est obligatoire pour continuer");
        assert_eq!(errors["photo"], "La photo de l'élève est requise");
        assert_eq!(errors["birthDate"], "La date de naissance de l'élève est requise");
        assert!(!errors.contains_key("condition"));
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn phone_number_shape() {
        let check = |phone: &str| {
            let mut f = valid_teacher();
            f.insert("phoneNumber".into(), FieldValue::text(phone));
            errors_for(EntityKind::Teacher, &f).get("phoneNumber").cloned()
        };
        assert_eq!(check("699112233"), None);
        assert_eq!(check("233445566"), None);
        assert!(check("69911223").is_some());
        assert!(check("6991122334").is_some());
        assert_eq!(
            check("399112233").as_deref(),
            Some("Le numero doit commencer par 2 ou par 6 et ne doit pas contenir d'espace")
        );
        assert!(check("6991 2233").is_some());
        assert!(check("69911223a").is_some());
    }

    #[test]
    fn email_shape() {
        let check = |email: &str| {
            let mut f = valid_teacher();
            f.insert("email".into(), FieldValue::text(email));
            errors_for(EntityKind::Teacher, &f).contains_key("email")
        };
        assert!(!check("user@domain.tld"));
        assert!(check("user.domain.tld"));
        assert!(check("user@domain"));
        assert!(check("us er@domain.tld"));
    }

    #[test]
    fn file_size_ceiling() {
        let check = |value: Option<FieldValue>| {
            let mut f = valid_student();
            match value {
                Some(v) => f.insert("photo".into(), v),
                None => f.remove("photo"),
            };
            errors_for(EntityKind::Student, &f).get("photo").cloned()
        };
        assert_eq!(check(Some(photo(MAX_FILE_BYTES))), None);
        assert_eq!(
            check(Some(photo(MAX_FILE_BYTES + 1))).as_deref(),
            Some("La taille du fichier doit être inférieure à 3MB")
        );
        assert!(check(None).is_some());
        assert!(check(Some(FieldValue::text("photo.jpg"))).is_some());
    }

    #[test]
    fn last_failing_rule_wins() {
        let mut f = valid_teacher();
        // Too short and not letters: both rules fail, the pattern is declared last.
        f.insert("firstName".into(), FieldValue::text("J1"));
        let found = violations(schema_for(EntityKind::Teacher), &f);
        let rules: Vec<_> = found.iter().map(|v| v.rule).collect();
        assert_eq!(rules, vec!["minLength", "pattern"]);
        assert_eq!(
            error_map(&found)["firstName"],
            "Les lettres seules sont demandées"
        );
    }

    #[test]
    fn enumerations_and_dates() {
        let mut f = valid_student();
        f.insert("classe".into(), FieldValue::text("Terminale"));
        f.insert("birthDate".into(), FieldValue::text("2016-02-30"));
        f.insert("condition".into(), FieldValue::text("malade"));
        let errors = errors_for(EntityKind::Student, &f);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["birthDate"], "La date saisie n'est pas une date valide");

        let mut f = valid_student();
        f.insert("condition".into(), FieldValue::text("apte"));
        assert_eq!(validate(schema_for(EntityKind::Student), &f), Ok(()));
    }

    #[test]
    fn school_year_name_shape() {
        let check = |name: &str| {
            let f = fields(&[
                ("name", name),
                ("dateStart", "2024-09-02"),
                ("dateEnd", "2025-06-27"),
                ("budget", "1500000"),
            ]);
            errors_for(EntityKind::SchoolYear, &f).get("name").cloned()
        };
        assert_eq!(check("2024-2025"), None);
        assert_eq!(check("2024/2025"), None);
        assert!(check("2024_2025").is_some());
        assert!(check("24-25").is_some());
        assert!(check("2024-20255").is_some());
    }

    #[test]
    fn school_name_must_be_uppercase() {
        let mut f = fields(&[
            ("schoolName", "LES BAMBINS"),
            ("location", "Bafoussam"),
            ("phoneNumber", "233445566"),
        ]);
        f.insert("logo".into(), photo(10));
        assert_eq!(validate(schema_for(EntityKind::School), &f), Ok(()));

        f.insert("schoolName".into(), FieldValue::text("Les Bambins"));
        assert_eq!(
            errors_for(EntityKind::School, &f)["schoolName"],
            "Les lettres doivent être majuscules"
        );
    }
}
