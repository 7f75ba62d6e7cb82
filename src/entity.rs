use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat field mapping for one form entity, keyed by wire field name.
pub type Fields = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Student,
    Teacher,
    Parent,
    Staff,
    SchoolClass,
    School,
    SchoolYear,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Student,
        EntityKind::Teacher,
        EntityKind::Parent,
        EntityKind::Staff,
        EntityKind::SchoolClass,
        EntityKind::School,
        EntityKind::SchoolYear,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "teacher" => Some(Self::Teacher),
            "parent" => Some(Self::Parent),
            "staff" => Some(Self::Staff),
            "class" => Some(Self::SchoolClass),
            "school" => Some(Self::School),
            "year" => Some(Self::SchoolYear),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
            Self::Staff => "staff",
            Self::SchoolClass => "class",
            Self::School => "school",
            Self::SchoolYear => "year",
        }
    }
}

impl Serialize for EntityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A selected local file. Only its name and byte size ever reach the sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    File(FileRef),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Lenient conversion from request params: numbers and booleans become
    /// their text form, `null` becomes empty text, objects must look like a
    /// file reference.
    pub fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Text(n.to_string())),
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Null => Some(Self::Text(String::new())),
            Value::Object(_) => serde_json::from_value::<FileRef>(v.clone())
                .ok()
                .map(Self::File),
            Value::Array(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            Self::File(f) => Some(f),
            Self::Text(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::File(_) => false,
        }
    }
}
