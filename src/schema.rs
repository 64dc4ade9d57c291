//! In-memory schema with tagged value annotations.
//!
//! A [`Schema`] is the field definition set of a content type. Layout and
//! display metadata is attached to it as tagged values under fixed keys and
//! accessed through the typed `get_*` / `set_*` functions below. Reading a
//! key that was never set returns an empty default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AnnotationError;
use crate::types::{json_type_name, keys};

/// Detail panel position → field names.
pub type DetailFields = BTreeMap<String, Vec<String>>;

/// A value stored under a tagged value key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedValue {
    List(Vec<String>),
    Columns(Vec<Vec<String>>),
    Details(DetailFields),
}

/// Field definition set of a content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<String>,
    tagged_values: BTreeMap<&'static str, TaggedValue>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn tagged_value(&self, key: &str) -> Option<&TaggedValue> {
        self.tagged_values.get(key)
    }

    pub fn set_tagged_value(&mut self, key: &'static str, value: TaggedValue) {
        self.tagged_values.insert(key, value);
    }

    /// Keys with a stored value, in key order.
    pub fn tagged_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tagged_values.keys().copied()
    }

    fn list(&self, key: &str) -> Vec<String> {
        match self.tagged_values.get(key) {
            Some(TaggedValue::List(values)) => values.clone(),
            _ => Vec::new(),
        }
    }
}

/// Keeps the first occurrence of every value.
fn unique_in_order(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

/// Fields whose values compose a person's display title.
pub fn get_title_fields(schema: &Schema) -> Vec<String> {
    schema.list(keys::TITLE_FIELDS)
}

/// Stores the title fields, dropping duplicates while preserving order.
pub fn set_title_fields(schema: &mut Schema, fields: Vec<String>) {
    schema.set_tagged_value(keys::TITLE_FIELDS, TaggedValue::List(unique_in_order(fields)));
}

pub fn get_order(schema: &Schema) -> Vec<String> {
    schema.list(keys::ORDER)
}

pub fn set_order(schema: &mut Schema, order: Vec<String>) {
    schema.set_tagged_value(keys::ORDER, TaggedValue::List(order));
}

/// Fields rendered as selectable single-field columns.
pub fn get_selectable_fields(schema: &Schema) -> Vec<String> {
    schema.list(keys::SELECTABLE)
}

pub fn set_selectable_fields(schema: &mut Schema, fields: Vec<String>) {
    schema.set_tagged_value(keys::SELECTABLE, TaggedValue::List(unique_in_order(fields)));
}

/// Table column groups.
pub fn get_columns(schema: &Schema) -> Vec<Vec<String>> {
    match schema.tagged_value(keys::COLUMNS) {
        Some(TaggedValue::Columns(columns)) => columns.clone(),
        _ => Vec::new(),
    }
}

/// Stores the table column groups.
///
/// Each group is a list of field names. Untyped input must go through
/// [`columns_from_value`] first, which rejects a flat list of names.
pub fn set_columns(schema: &mut Schema, columns: Vec<Vec<String>>) {
    schema.set_tagged_value(keys::COLUMNS, TaggedValue::Columns(columns));
}

pub fn get_detail_fields(schema: &Schema) -> DetailFields {
    match schema.tagged_value(keys::DETAILS) {
        Some(TaggedValue::Details(details)) => details.clone(),
        _ => DetailFields::new(),
    }
}

pub fn set_detail_fields(schema: &mut Schema, fields: DetailFields) {
    schema.set_tagged_value(keys::DETAILS, TaggedValue::Details(fields));
}

fn strings_from_value(value: &Value, path: &str) -> Result<Vec<String>, AnnotationError> {
    let invalid = |at: String, actual: &Value| AnnotationError::InvalidType {
        path: at,
        expected: "array of strings",
        actual: json_type_name(actual).to_string(),
    };

    let Value::Array(items) = value else {
        return Err(invalid(path.to_string(), value));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(invalid(format!("{}/{}", path, i), other)),
        })
        .collect()
}

/// Converts untyped column data into column groups.
///
/// # Errors
///
/// Returns `AnnotationError::FlatColumns` when an entry is a bare string,
/// the usual mistake of passing field names instead of groups of them.
pub fn columns_from_value(value: &Value, path: &str) -> Result<Vec<Vec<String>>, AnnotationError> {
    let Value::Array(columns) = value else {
        return Err(AnnotationError::InvalidType {
            path: path.to_string(),
            expected: "array of arrays",
            actual: json_type_name(value).to_string(),
        });
    };

    columns
        .iter()
        .enumerate()
        .map(|(index, column)| match column {
            Value::String(_) => Err(AnnotationError::FlatColumns { index }),
            other => strings_from_value(other, &format!("{}/{}", path, index)),
        })
        .collect()
}

/// Serializable view of one schema's people annotations.
///
/// This is the JSON exchange format of the command line tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaAnnotations {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub details: DetailFields,
    #[serde(default)]
    pub columns: Vec<Vec<String>>,
    #[serde(default)]
    pub selectable: Vec<String>,
}

impl SchemaAnnotations {
    /// Snapshot of the annotations stored on `schema`.
    pub fn from_schema(schema: &Schema) -> Self {
        Self {
            name: schema.name.clone(),
            fields: schema.fields.clone(),
            title: get_title_fields(schema),
            order: get_order(schema),
            details: get_detail_fields(schema),
            columns: get_columns(schema),
            selectable: get_selectable_fields(schema),
        }
    }

    /// Stores every annotation on `schema` through the typed setters.
    pub fn apply_to(&self, schema: &mut Schema) {
        set_title_fields(schema, self.title.clone());
        set_order(schema, self.order.clone());
        set_detail_fields(schema, self.details.clone());
        set_columns(schema, self.columns.clone());
        set_selectable_fields(schema, self.selectable.clone());
    }

    /// A fresh schema carrying these annotations.
    pub fn to_schema(&self) -> Schema {
        let mut schema = Schema::new(self.name.clone()).with_fields(self.fields.clone());
        self.apply_to(&mut schema);
        schema
    }

    /// Parses annotations from untyped JSON, validating column groups.
    ///
    /// `path` is the JSON pointer of `value`, used in error messages.
    pub fn from_value(value: &Value, path: &str) -> Result<Self, AnnotationError> {
        let Value::Object(map) = value else {
            return Err(AnnotationError::InvalidType {
                path: path.to_string(),
                expected: "object",
                actual: json_type_name(value).to_string(),
            });
        };

        let list = |key: &str| -> Result<Vec<String>, AnnotationError> {
            match map.get(key) {
                Some(v) => strings_from_value(v, &format!("{}/{}", path, key)),
                None => Ok(Vec::new()),
            }
        };

        let name = match map.get("name") {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(AnnotationError::InvalidType {
                    path: format!("{}/name", path),
                    expected: "string",
                    actual: json_type_name(other).to_string(),
                })
            }
        };

        let mut details = DetailFields::new();
        match map.get("details") {
            None => {}
            Some(Value::Object(positions)) => {
                for (position, fields) in positions {
                    let at = format!("{}/details/{}", path, position);
                    details.insert(position.clone(), strings_from_value(fields, &at)?);
                }
            }
            Some(other) => {
                return Err(AnnotationError::InvalidType {
                    path: format!("{}/details", path),
                    expected: "object",
                    actual: json_type_name(other).to_string(),
                })
            }
        }

        let columns = match map.get("columns") {
            Some(v) => columns_from_value(v, &format!("{}/columns", path))?,
            None => Vec::new(),
        };

        Ok(Self {
            name,
            fields: list("fields")?,
            title: list("title")?,
            order: list("order")?,
            details,
            columns,
            selectable: list("selectable")?,
        })
    }
}
