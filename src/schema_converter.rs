use crate::error::{Error, Result};
use crate::validation::{Field, NumberCheck, SchemaNode, StringCheck};
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Structured schema description (a JSON-Schema-like fragment).
///
/// Fragments are produced by [`convert`] and are not modified afterwards. Absent
/// keys are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFragment {
    /// The type of the schema (string, integer, number, boolean, object, array)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaFragment>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaFragment>>,
    /// Required field names for object types, never empty when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Alternatives, in declaration order
    #[serde(rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaFragment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Format hint for strings (email, uri, uuid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl SchemaFragment {
    /// A bare fragment of the given type.
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    /// The generic `{type: "object"}` fragment used whenever nothing better is known.
    pub fn object() -> Self {
        Self::of_type("object")
    }
}

/// Converts a validation schema into a schema fragment.
///
/// Conversion never fails: unsupported kinds and malformed nodes degrade to
/// `{type: "object"}` with a warning. Failures are contained to the node that
/// failed, so one bad field does not discard the rest of its object.
pub fn convert(node: &SchemaNode) -> SchemaFragment {
    match try_convert(node) {
        Ok(fragment) => fragment,
        Err(e) => {
            warn!("{}; falling back to a generic object schema", e);
            SchemaFragment::object()
        }
    }
}

/// Converts an optional schema; an absent schema yields `{type: "object"}`.
pub fn convert_optional(node: Option<&SchemaNode>) -> SchemaFragment {
    match node {
        Some(node) => convert(node),
        None => SchemaFragment::object(),
    }
}

fn try_convert(node: &SchemaNode) -> Result<SchemaFragment> {
    match node {
        SchemaNode::String { checks } => convert_string(checks),
        SchemaNode::Number { checks } => Ok(convert_number(checks)),
        SchemaNode::Boolean => Ok(SchemaFragment::of_type("boolean")),
        SchemaNode::Object { fields } => convert_object(fields),
        SchemaNode::Array { items } => Ok(SchemaFragment {
            items: Some(Box::new(convert(items))),
            ..SchemaFragment::of_type("array")
        }),
        // Optionality only shows up in the parent's `required` list
        SchemaNode::Optional { inner } => Ok(convert(inner)),
        SchemaNode::Default { inner, value } => Ok(SchemaFragment {
            default: Some(value.clone()),
            ..convert(inner)
        }),
        SchemaNode::Enum { values } => {
            if values.is_empty() {
                return Err(Error::ConversionError("enum without values".to_string()));
            }
            Ok(SchemaFragment {
                enum_values: Some(values.iter().cloned().map(Value::String).collect()),
                ..SchemaFragment::of_type("string")
            })
        }
        SchemaNode::Union { variants } => {
            if variants.is_empty() {
                return Err(Error::ConversionError("union without variants".to_string()));
            }
            Ok(SchemaFragment {
                one_of: Some(variants.iter().map(convert).collect()),
                ..SchemaFragment::default()
            })
        }
        SchemaNode::Literal { value } => {
            let schema_type = literal_type(value)?;
            Ok(SchemaFragment {
                enum_values: Some(vec![value.clone()]),
                ..SchemaFragment::of_type(schema_type)
            })
        }
        SchemaNode::Unsupported { name } => {
            debug!("Unsupported schema kind '{}', using object placeholder", name);
            Ok(SchemaFragment::object())
        }
    }
}

fn convert_string(checks: &[StringCheck]) -> Result<SchemaFragment> {
    let mut fragment = SchemaFragment::of_type("string");

    for check in checks {
        match check {
            StringCheck::Email => fragment.format = Some("email".to_string()),
            StringCheck::Url => fragment.format = Some("uri".to_string()),
            StringCheck::Uuid => fragment.format = Some("uuid".to_string()),
            StringCheck::MinLength(len) => fragment.min_length = Some(*len),
            StringCheck::MaxLength(len) => fragment.max_length = Some(*len),
            StringCheck::Length(len) => {
                fragment.min_length = Some(*len);
                fragment.max_length = Some(*len);
            }
            StringCheck::Regex(pattern) => {
                Regex::new(pattern).map_err(|e| {
                    Error::ConversionError(format!("invalid pattern '{}': {}", pattern, e))
                })?;
                fragment.pattern = Some(pattern.clone());
            }
        }
    }

    Ok(fragment)
}

fn convert_number(checks: &[NumberCheck]) -> SchemaFragment {
    let mut fragment = SchemaFragment::of_type("number");

    for check in checks {
        match check {
            NumberCheck::Int => fragment.schema_type = Some("integer".to_string()),
            NumberCheck::Min(bound) => fragment.minimum = Some(bound.clone()),
            NumberCheck::Max(bound) => fragment.maximum = Some(bound.clone()),
        }
    }

    fragment
}

fn convert_object(fields: &[Field]) -> Result<SchemaFragment> {
    let mut properties = BTreeMap::new();
    let mut required = Vec::new();

    for field in fields {
        if field.name.is_empty() {
            return Err(Error::ConversionError(
                "object field with an empty name".to_string(),
            ));
        }

        properties.insert(field.name.clone(), convert(&field.schema));

        if !field.schema.is_optional() {
            required.push(field.name.clone());
        }
    }

    Ok(SchemaFragment {
        properties: Some(properties),
        required: if required.is_empty() {
            None
        } else {
            Some(required)
        },
        ..SchemaFragment::object()
    })
}

fn literal_type(value: &Value) -> Result<&'static str> {
    match value {
        Value::String(_) => Ok("string"),
        Value::Bool(_) => Ok("boolean"),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok("integer"),
        Value::Number(_) => Ok("number"),
        other => Err(Error::ConversionError(format!(
            "literal of unsupported type: {}",
            other
        ))),
    }
}
