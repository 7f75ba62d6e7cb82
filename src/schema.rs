use crate::entity::EntityKind;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

pub const MAX_FILE_BYTES: u64 = 3_145_728;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z ]+$").expect("name pattern"));
static UPPER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z ]+$").expect("school name pattern"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([26][0-9]+)$").expect("phone pattern"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static YEAR_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}([-/])[0-9]{4}$").expect("year range pattern"));

pub const CLASS_LEVELS: &[&str] = &[
    "Petite section",
    "Moyenne section",
    "Grande section",
    "SIL",
    "CP",
    "CE1",
    "CE2",
    "CM1",
    "CM2",
    "Nursery 1",
    "Nursery 2",
    "Class 1",
    "Class 2",
    "Class 3",
    "Class 4",
    "Class 5",
    "Class 6",
];
pub const GENDERS: &[&str] = &["male", "female", "other"];
pub const PARENTS: &[&str] = &["parentx", "parenty", "parentz"];
pub const CONDITIONS: &[&str] = &["apte", "inapte"];
pub const STAFF_ROLES: &[&str] = &["Secrétaire", "Libraire", "Chauffeur", "Gardien", "Infirmière"];
pub const TEACHING_LEVELS: &[&str] = &["primary", "secondary"];
pub const SECTIONS: &[&str] = &["french", "english"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Date,
    File,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::File => "file",
        }
    }
}

pub enum Rule {
    Required(&'static str),
    MinLength(usize, &'static str),
    MaxLength(usize, &'static str),
    Pattern(&'static LazyLock<Regex>, &'static str),
    OneOf(&'static [&'static str], &'static str),
    Date(&'static str),
    FileSize(u64, &'static str),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required(_) => "required",
            Rule::MinLength(..) => "minLength",
            Rule::MaxLength(..) => "maxLength",
            Rule::Pattern(..) => "pattern",
            Rule::OneOf(..) => "oneOf",
            Rule::Date(_) => "date",
            Rule::FileSize(..) => "fileSize",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Rule::Required(m)
            | Rule::MinLength(_, m)
            | Rule::MaxLength(_, m)
            | Rule::Pattern(_, m)
            | Rule::OneOf(_, m)
            | Rule::Date(m)
            | Rule::FileSize(_, m) => *m,
        }
    }

    pub fn describe(&self) -> Value {
        let mut out = json!({ "rule": self.name(), "message": self.message() });
        match self {
            Rule::MinLength(n, _) | Rule::MaxLength(n, _) => out["value"] = json!(n),
            Rule::Pattern(re, _) => out["value"] = json!(re.as_str()),
            Rule::OneOf(allowed, _) => out["value"] = json!(allowed),
            Rule::FileSize(max, _) => out["value"] = json!(max),
            Rule::Required(_) | Rule::Date(_) => {}
        }
        out
    }
}

pub struct FieldSpec {
    pub name: &'static str,
    pub input: InputKind,
    /// Empty optional fields skip every rule.
    pub optional: bool,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    fn new(name: &'static str, input: InputKind, rules: Vec<Rule>) -> Self {
        Self {
            name,
            input,
            optional: false,
            rules,
        }
    }

    fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Required(_)))
    }

    pub fn describe(&self) -> Value {
        json!({
            "name": self.name,
            "input": self.input.as_str(),
            "optional": self.optional,
            "required": self.is_required(),
            "rules": self.rules.iter().map(Rule::describe).collect::<Vec<_>>(),
        })
    }
}

pub struct Schema {
    pub kind: EntityKind,
    pub fields: Vec<FieldSpec>,
    /// Fields the filter view matches the search term against.
    pub search: &'static [&'static str],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The file field an optimistic submit waits for before appending.
    pub fn attachment_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.input == InputKind::File)
    }

    pub fn describe(&self) -> Value {
        json!({
            "entity": self.kind,
            "fields": self.fields.iter().map(FieldSpec::describe).collect::<Vec<_>>(),
            "search": self.search,
        })
    }
}

static STUDENT: LazyLock<Schema> = LazyLock::new(student_schema);
static TEACHER: LazyLock<Schema> = LazyLock::new(teacher_schema);
static PARENT: LazyLock<Schema> = LazyLock::new(parent_schema);
static STAFF: LazyLock<Schema> = LazyLock::new(staff_schema);
static SCHOOL_CLASS: LazyLock<Schema> = LazyLock::new(class_schema);
static SCHOOL: LazyLock<Schema> = LazyLock::new(school_schema);
static SCHOOL_YEAR: LazyLock<Schema> = LazyLock::new(year_schema);

pub fn schema_for(kind: EntityKind) -> &'static Schema {
    match kind {
        EntityKind::Student => &STUDENT,
        EntityKind::Teacher => &TEACHER,
        EntityKind::Parent => &PARENT,
        EntityKind::Staff => &STAFF,
        EntityKind::SchoolClass => &SCHOOL_CLASS,
        EntityKind::School => &SCHOOL,
        EntityKind::SchoolYear => &SCHOOL_YEAR,
    }
}

fn first_name() -> FieldSpec {
    FieldSpec::new(
        "firstName",
        InputKind::Text,
        vec![
            Rule::MinLength(3, "Le prénom doit comporter au moins 3 caractères"),
            Rule::Pattern(&NAME_RE, "Les lettres seules sont demandées"),
            Rule::Required("Le prénom est requis"),
        ],
    )
}

fn last_name() -> FieldSpec {
    FieldSpec::new(
        "lastName",
        InputKind::Text,
        vec![
            Rule::MinLength(3, "Le nom doit comporter au moins 3 caractères"),
            Rule::Pattern(&NAME_RE, "Les lettres seules sont demandées"),
            Rule::Required("Le nom est requis"),
        ],
    )
}

fn residence(message: &'static str) -> FieldSpec {
    FieldSpec::new("residence", InputKind::Text, vec![Rule::Required(message)])
}

fn phone_number() -> FieldSpec {
    FieldSpec::new(
        "phoneNumber",
        InputKind::Text,
        vec![
            Rule::MinLength(9, "Le numéro doit contenir 9 chiffres"),
            Rule::MaxLength(9, "Le numero doit contenir au maximun 9 chiffres"),
            Rule::Required("Le numéro est requis"),
            Rule::Pattern(
                &PHONE_RE,
                "Le numero doit commencer par 2 ou par 6 et ne doit pas contenir d'espace",
            ),
        ],
    )
}

fn email() -> FieldSpec {
    FieldSpec::new(
        "email",
        InputKind::Text,
        vec![
            Rule::Required("L'adresse mail est requise"),
            Rule::Pattern(&EMAIL_RE, "L'adresse mail entrée n'est pas conforme"),
        ],
    )
}

fn classe(message: &'static str) -> FieldSpec {
    FieldSpec::new(
        "classe",
        InputKind::Text,
        vec![Rule::OneOf(CLASS_LEVELS, message)],
    )
}

fn attachment(name: &'static str, required: &'static str) -> FieldSpec {
    FieldSpec::new(
        name,
        InputKind::File,
        vec![
            Rule::Required(required),
            Rule::FileSize(
                MAX_FILE_BYTES,
                "La taille du fichier doit être inférieure à 3MB",
            ),
        ],
    )
}

fn date(name: &'static str, required: &'static str) -> FieldSpec {
    FieldSpec::new(
        name,
        InputKind::Date,
        vec![
            Rule::Required(required),
            Rule::Date("La date saisie n'est pas une date valide"),
        ],
    )
}

fn student_schema() -> Schema {
    Schema {
        kind: EntityKind::Student,
        fields: vec![
            first_name(),
            last_name(),
            date(
                "birthDate",
                "La date de naissance de l'élève est requise",
            ),
            FieldSpec::new(
                "gender",
                InputKind::Text,
                vec![Rule::OneOf(
                    GENDERS,
                    "Le sexe de l'enfant est obligatoire pour continuer",
                )],
            ),
            residence("L'adresse du parent est requise"),
            classe("La classe de l'élève est obligatoire pour continuer"),
            FieldSpec::new(
                "parent",
                InputKind::Text,
                vec![Rule::OneOf(
                    PARENTS,
                    "Le parent de l'élève est requis pour la suite",
                )],
            ),
            FieldSpec::new(
                "condition",
                InputKind::Text,
                vec![Rule::OneOf(
                    CONDITIONS,
                    "La condition physique doit être apte ou inapte",
                )],
            )
            .optional(),
            attachment("photo", "La photo de l'élève est requise"),
        ],
        search: &["firstName", "lastName", "residence", "classe", "gender"],
    }
}

fn teacher_schema() -> Schema {
    Schema {
        kind: EntityKind::Teacher,
        fields: vec![
            first_name(),
            last_name(),
            residence("La localisation est requise"),
            classe("La classe de l'enseignant est obligatoire pour continuer"),
            phone_number(),
            email(),
            attachment("photo", "La photo de l'enseignant est requise"),
        ],
        search: &[
            "firstName",
            "lastName",
            "residence",
            "phoneNumber",
            "classe",
            "email",
        ],
    }
}

fn parent_schema() -> Schema {
    Schema {
        kind: EntityKind::Parent,
        fields: vec![
            first_name(),
            last_name(),
            residence("La localisation est requise"),
            phone_number(),
            email(),
        ],
        search: &["firstName", "lastName", "residence", "phoneNumber", "email"],
    }
}

fn staff_schema() -> Schema {
    Schema {
        kind: EntityKind::Staff,
        fields: vec![
            first_name(),
            last_name(),
            residence("La localisation est requise"),
            phone_number(),
            email(),
            FieldSpec::new(
                "role",
                InputKind::Text,
                vec![Rule::OneOf(
                    STAFF_ROLES,
                    "Sélectionnez un rôle d'utilisateur",
                )],
            ),
            attachment("photo", "La photo du membre du personnel est requise"),
        ],
        search: &[
            "firstName",
            "lastName",
            "residence",
            "phoneNumber",
            "role",
            "email",
        ],
    }
}

fn class_schema() -> Schema {
    Schema {
        kind: EntityKind::SchoolClass,
        fields: vec![
            FieldSpec::new(
                "name",
                InputKind::Text,
                vec![Rule::Required(
                    "Le nom d'une classe est obligatoire pour sa création",
                )],
            ),
            FieldSpec::new(
                "level",
                InputKind::Text,
                vec![Rule::OneOf(
                    TEACHING_LEVELS,
                    "Le niveau d'enseignement de cette classe est requis",
                )],
            ),
            FieldSpec::new(
                "option",
                InputKind::Text,
                vec![Rule::OneOf(
                    SECTIONS,
                    "La section de la classe est obligatoire",
                )],
            ),
        ],
        search: &["name", "level", "option"],
    }
}

fn school_schema() -> Schema {
    Schema {
        kind: EntityKind::School,
        fields: vec![
            FieldSpec::new(
                "schoolName",
                InputKind::Text,
                vec![
                    Rule::MinLength(3, "Le nom doit comporter au moins 3 caractères"),
                    Rule::Pattern(&UPPER_NAME_RE, "Les lettres doivent être majuscules"),
                    Rule::Required("Le nom est requis"),
                ],
            ),
            FieldSpec::new(
                "location",
                InputKind::Text,
                vec![Rule::Required("La localisation est requise")],
            ),
            phone_number(),
            FieldSpec::new("motto", InputKind::Text, Vec::new()).optional(),
            attachment("logo", "Le logo de l'école est requis"),
        ],
        search: &["schoolName", "location", "motto", "phoneNumber"],
    }
}

fn year_schema() -> Schema {
    Schema {
        kind: EntityKind::SchoolYear,
        fields: vec![
            FieldSpec::new(
                "name",
                InputKind::Text,
                vec![
                    Rule::MinLength(
                        9,
                        "Le nom doit comporter au moins 9 caractères avec \"-\" ou \"/\" entre les années",
                    ),
                    Rule::MaxLength(
                        9,
                        "Le nom doit comporter 9 caractères avec \"-\" ou \"/\" entre les années",
                    ),
                    Rule::Pattern(
                        &YEAR_RANGE_RE,
                        "L'attribution de l'année scolaire est du type AAAA/AAAA ou AAAA-AAAA",
                    ),
                    Rule::Required("Le nom est requis"),
                ],
            ),
            date("dateStart", "La date de début est requise"),
            date("dateEnd", "La date de fin est requise"),
            FieldSpec::new(
                "budget",
                InputKind::Text,
                vec![Rule::Required("Le budget est requis")],
            ),
        ],
        search: &["name", "dateStart", "dateEnd"],
    }
}
