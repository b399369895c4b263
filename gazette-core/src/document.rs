//! The flat, field keyed document written to the search index.
//!
//! Internally it wraps an insertion ordered `serde_json::Map`, so a document serializes with its
//! fields in the order they were added. Building the same record twice yields byte identical JSON.
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::util::abbreviate;

pub const FIELD_ID: &str = "id";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_TITLE: &str = "title";
pub const FIELD_URL: &str = "url";

/// Field name under which the article body is indexed.
///
/// Two names exist in the wild. `content` is canonical; `description` is kept for consumers of
/// older indexes. A document only ever carries one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BodyField {
    #[default]
    Content,
    Description,
}

impl BodyField {
    pub fn field_name(self) -> &'static str {
        match self {
            BodyField::Content => "content",
            BodyField::Description => "description",
        }
    }
}

/// A document as submitted to the index.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value while keeping its position.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        self.fields.get(key.as_ref())
    }

    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.fields.contains_key(key.as_ref())
    }

    /// The document id, if set and numeric.
    pub fn id(&self) -> Option<u64> {
        self.fields.get(FIELD_ID).and_then(Value::as_u64)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl Debug for Document {
    /// Long string values are truncated.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_map();
        for (key, value) in &self.fields {
            match value {
                Value::String(s) => debug.entry(key, &abbreviate(s, 80)),
                other => debug.entry(key, other),
            };
        }
        debug.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Document
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Document {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        Value::Object(document.fields)
    }
}
