use crate::error::{CoreError, Result};
use crate::time::Timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The three simulated collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Patient,
    Appointment,
    Record,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Patient, Self::Appointment, Self::Record];

    /// Collection name as it appears in paths and list envelopes.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Patient => "patients",
            Self::Appointment => "appointments",
            Self::Record => "records",
        }
    }

    /// Human-readable singular name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Appointment => "Appointment",
            Self::Record => "Record",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patients" => Ok(Self::Patient),
            "appointments" => Ok(Self::Appointment),
            "records" => Ok(Self::Record),
            other => Err(CoreError::unknown_collection(other)),
        }
    }
}

/// An entity id as supplied by a caller.
///
/// Ids compare by their textual representation, so the number `1` and the
/// string `"1"` address the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdRef(String);

impl IdRef {
    /// Normalise an id-bearing JSON value; only numbers and strings qualify.
    ///
    /// Whole-number floats render as integers, so `1.0` addresses row `1`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(Self::number_text(n))),
            Value::String(s) => Some(Self(s.clone())),
            _ => None,
        }
    }

    fn number_text(n: &serde_json::Number) -> String {
        if let Some(u) = n.as_u64() {
            return u.to_string();
        }
        if let Some(i) = n.as_i64() {
            return i.to_string();
        }
        match n.as_f64() {
            Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                (f as i64).to_string()
            }
            _ => n.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for IdRef {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for IdRef {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for IdRef {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&IdRef> for IdRef {
    fn from(id: &IdRef) -> Self {
        id.clone()
    }
}

impl From<&String> for IdRef {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

/// A stored row: a store-assigned numeric id plus opaque attributes.
///
/// Attributes are kept as raw JSON so that writes accept whatever the caller
/// sends; typed views are available through [`Entity::to_model`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    id: u64,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Entity {
    pub fn new(id: u64, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self { id, fields }
    }

    /// Build a row from any serializable model that renders as a JSON object.
    pub fn from_model<T: Serialize>(id: u64, model: &T) -> Result<Self> {
        match serde_json::to_value(model)? {
            Value::Object(fields) => Ok(Self::new(id, fields)),
            other => Err(CoreError::invalid_entity(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Deserialize the row (id included) into a typed model.
    pub fn to_model<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get_field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Set one attribute. `id` is owned by the store and cannot be overwritten.
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if key != "id" {
            self.fields.insert(key, value);
        }
    }

    /// Shallow merge: patch keys overwrite, all other attributes survive.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            self.set_field(key.clone(), value.clone());
        }
    }

    pub fn id_ref(&self) -> IdRef {
        IdRef::from(self.id)
    }

    /// Whether this row is addressed by `id` (textual comparison).
    pub fn matches_id(&self, id: &IdRef) -> bool {
        self.id.to_string() == id.as_str()
    }

    /// The `patientId` foreign key in normalised form.
    pub fn patient_ref(&self) -> Option<IdRef> {
        self.get_field("patientId").and_then(IdRef::from_value)
    }

    /// The parsed `date` attribute, if present and parseable.
    pub fn date(&self) -> Option<Timestamp> {
        self.str_field("date").and_then(Timestamp::parse_lenient)
    }

    /// `"{firstName} {lastName}"`, with missing parts rendered empty.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.str_field("firstName").unwrap_or_default(),
            self.str_field("lastName").unwrap_or_default()
        )
    }

    /// JSON object view with `id` included.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert("id".to_string(), Value::from(self.id));
        object.extend(self.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Value::Object(object)
    }
}
