//! Turning application data into a claim set.
//!
//! A claim set is assembled from up to three layers, each overwriting keys
//! set by the one before it:
//!
//! 1. private claims fixed on a template
//! 2. the registered claims the template generates (`iss`, `iat`, `exp`...)
//! 3. the caller's own input
//!
//! Input may be a plain string map, a [ClaimMap], a raw JSON object, or a
//! [ClaimRecord]. A record is an explicit description of a structured value:
//! each [RecordField] carries the field's name, its value and the tags that
//! decide what it is called on the wire.
//!
//! ```rust
//! use tokensmith::claims::{ClaimRecord, RecordField, ToClaims};
//!
//! struct Session {
//!     group_id: String,
//!     user_id: String,
//!     impersonator: String,
//! }
//!
//! impl ToClaims for Session {
//!     fn to_claims(&self) -> ClaimRecord {
//!         ClaimRecord::default()
//!             .with(RecordField::new("GroupId", self.group_id.as_str()).json("gid"))
//!             .with(RecordField::new("UserId", self.user_id.as_str()))
//!             .with(RecordField::new("Impersonator", self.impersonator.as_str()).json(",omitempty"))
//!     }
//! }
//! ```

use crate::{
    error::{JwtError, Result},
    time::Time,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single claim value. Times are kept apart from other JSON so that an
/// unset time can be dropped and a set one written as Unix seconds.
#[derive(Clone, Debug, PartialEq)]
pub enum ClaimValue {
    Json(Value),
    Time(Time),
}

impl ClaimValue {
    /// True for the zero value of the claim's type: `null`, `false`, `0`,
    /// the empty string, or the zero [Time]
    pub fn is_zero(&self) -> bool {
        match self {
            ClaimValue::Time(time) => time.is_zero(),
            ClaimValue::Json(Value::Null) => true,
            ClaimValue::Json(Value::Bool(value)) => !value,
            ClaimValue::Json(Value::Number(number)) => number.as_f64() == Some(0.0),
            ClaimValue::Json(Value::String(value)) => value.is_empty(),
            ClaimValue::Json(_) => false,
        }
    }

    /// The wire form of the value; `None` for an unset time
    pub fn into_json(self) -> Option<Value> {
        match self {
            ClaimValue::Time(time) if time.is_zero() => None,
            ClaimValue::Time(time) => Some(Value::from(time.unix())),
            ClaimValue::Json(value) => Some(value),
        }
    }
}

impl From<Time> for ClaimValue {
    fn from(value: Time) -> Self {
        ClaimValue::Time(value)
    }
}

macro_rules! impl_from_json_value {
    ($($value:ty),*) => {
        $(
            impl From<$value> for ClaimValue {
                fn from(value: $value) -> Self {
                    ClaimValue::Json(Value::from(value))
                }
            }
        )*
    };
}

impl_from_json_value!(Value, &str, String, bool, i32, i64, u32, u64, f64, Vec<String>);

/// Claims keyed by their wire name
pub type ClaimMap = BTreeMap<String, ClaimValue>;

/// One field of a structured record, and the tags that name it on the wire
#[derive(Clone, Debug)]
pub struct RecordField {
    name: String,
    value: ClaimValue,
    jwt: Option<String>,
    json: Option<String>,
    raw: Option<String>,
}

impl RecordField {
    pub fn new<N: Into<String>, V: Into<ClaimValue>>(name: N, value: V) -> Self {
        RecordField {
            name: name.into(),
            value: value.into(),
            jwt: None,
            json: None,
            raw: None,
        }
    }

    /// A token-specific tag, such as `sub` or `-` or `name,omitempty`. It
    /// takes precedence over every other tag.
    pub fn jwt<T: Into<String>>(mut self, tag: T) -> Self {
        self.jwt = Some(tag.into());
        self
    }

    /// A general serialization tag, used when there is no token-specific one
    pub fn json<T: Into<String>>(mut self, tag: T) -> Self {
        self.json = Some(tag.into());
        self
    }

    /// The field's whole, unstructured annotation. It is only used as a name
    /// when no other tag is set and it has no `key:value` structure.
    pub fn raw<T: Into<String>>(mut self, annotation: T) -> Self {
        self.raw = Some(annotation.into());
        self
    }

    /// The tag that names this field, before any options are split off
    fn tag(&self) -> &str {
        non_empty(&self.jwt)
            .or_else(|| non_empty(&self.json))
            .or_else(|| non_empty(&self.raw).filter(|raw| !raw.contains(':')))
            .unwrap_or_default()
    }

    /// The wire name and value of this field, or `None` when the field is
    /// ignored or omitted
    pub fn resolve(self) -> Option<(String, Value)> {
        let tag = self.tag();
        if tag == "-" {
            return None;
        }

        let (name, options) = tag.split_once(',').unwrap_or((tag, ""));
        if options.contains("omitempty") && self.value.is_zero() {
            return None;
        }

        let name = if name.is_empty() {
            lower_first(&self.name)
        } else {
            name.to_owned()
        };

        self.value.into_json().map(|value| (name, value))
    }
}

fn non_empty(tag: &Option<String>) -> Option<&str> {
    tag.as_deref().filter(|tag| !tag.is_empty())
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// An explicitly described structured value
#[derive(Clone, Debug, Default)]
pub struct ClaimRecord {
    fields: Vec<RecordField>,
}

impl ClaimRecord {
    pub fn with(mut self, field: RecordField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn push(&mut self, field: RecordField) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }
}

impl FromIterator<RecordField> for ClaimRecord {
    fn from_iter<I: IntoIterator<Item = RecordField>>(iter: I) -> Self {
        ClaimRecord {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Implemented by application types that want to be written into a token
/// as a [ClaimRecord]
pub trait ToClaims {
    fn to_claims(&self) -> ClaimRecord;
}

/// The shapes of caller input a claim set can be built from
#[derive(Clone, Debug, Default)]
pub enum ClaimInput<'a> {
    #[default]
    None,
    Strings(&'a BTreeMap<String, String>),
    Map(&'a ClaimMap),
    Record(ClaimRecord),
    /// Must be a JSON object (or `null`)
    Json(Value),
}

impl<'a> ClaimInput<'a> {
    pub fn from_claims<T: ToClaims + ?Sized>(value: &T) -> Self {
        ClaimInput::Record(value.to_claims())
    }
}

impl<'a> From<&'a BTreeMap<String, String>> for ClaimInput<'a> {
    fn from(value: &'a BTreeMap<String, String>) -> Self {
        ClaimInput::Strings(value)
    }
}

impl<'a> From<&'a ClaimMap> for ClaimInput<'a> {
    fn from(value: &'a ClaimMap) -> Self {
        ClaimInput::Map(value)
    }
}

impl<'a> From<ClaimRecord> for ClaimInput<'a> {
    fn from(value: ClaimRecord) -> Self {
        ClaimInput::Record(value)
    }
}

impl<'a> From<Value> for ClaimInput<'a> {
    fn from(value: Value) -> Self {
        ClaimInput::Json(value)
    }
}

fn apply(claims: &mut Map<String, Value>, name: &str, value: ClaimValue) {
    if let Some(value) = value.into_json() {
        claims.insert(name.to_owned(), value);
    }
}

/// Build the final claim set: `private` first, then `registered`, then
/// `input`, each overwriting what came before
pub fn materialize(
    registered: ClaimMap,
    private: &ClaimMap,
    input: ClaimInput,
) -> Result<Map<String, Value>> {
    let mut claims = Map::new();

    for (name, value) in private {
        apply(&mut claims, name, value.clone());
    }
    for (name, value) in registered {
        apply(&mut claims, &name, value);
    }

    match input {
        ClaimInput::None | ClaimInput::Json(Value::Null) => (),
        ClaimInput::Strings(strings) => {
            for (name, value) in strings {
                claims.insert(name.clone(), Value::from(value.as_str()));
            }
        }
        ClaimInput::Map(map) => {
            for (name, value) in map {
                apply(&mut claims, name, value.clone());
            }
        }
        ClaimInput::Record(record) => {
            for (name, value) in record.fields.into_iter().filter_map(RecordField::resolve) {
                claims.insert(name, value);
            }
        }
        ClaimInput::Json(Value::Object(object)) => claims.extend(object),
        ClaimInput::Json(other) => {
            return Err(JwtError::UnsupportedClaimShape(json_kind(&other).into()))
        }
    }

    Ok(claims)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
