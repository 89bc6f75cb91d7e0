//! Validation-schema object graph.
//!
//! [`SchemaNode`] describes the shape a request value must have, the way a
//! validation library would: primitives carrying refinement checks, composites,
//! and wrappers for optionality and defaults. It is the input of
//! [`crate::schema_converter::convert`], which turns it into a
//! [`crate::schema_converter::SchemaFragment`] for the rendered document.
//!
//! Nodes are built with a fluent API:
//!
//! ```
//! use openapi_from_routes::validation::SchemaNode;
//!
//! let user = SchemaNode::object([
//!     ("name", SchemaNode::string().min_length(1)),
//!     ("email", SchemaNode::string().email()),
//!     ("age", SchemaNode::integer().min(0).optional()),
//! ]);
//! assert_eq!(user.kind_name(), "object");
//! ```
//!
//! Nodes also deserialize from YAML/JSON (tagged by `kind`) so route manifests
//! in the configuration file can carry them.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A node of a validation schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaNode {
    /// A string with zero or more refinements
    String {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        checks: Vec<StringCheck>,
    },
    /// A number with zero or more refinements
    Number {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        checks: Vec<NumberCheck>,
    },
    /// A boolean
    Boolean,
    /// An object with named fields, in declaration order
    Object {
        #[serde(default)]
        fields: Vec<Field>,
    },
    /// An array whose elements all match `items`
    Array { items: Box<SchemaNode> },
    /// A value that may be absent
    Optional { inner: Box<SchemaNode> },
    /// A value that falls back to `value` when absent
    Default {
        inner: Box<SchemaNode>,
        value: Value,
    },
    /// One of a fixed set of strings
    Enum { values: Vec<String> },
    /// Any one of several schemas
    Union { variants: Vec<SchemaNode> },
    /// Exactly one value
    Literal { value: Value },
    /// A kind the converter has no mapping for (dates, maps, lazy nodes, ...)
    Unsupported { name: String },
}

/// A named field of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub schema: SchemaNode,
}

/// Refinements applicable to a string schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringCheck {
    Email,
    Url,
    Uuid,
    MinLength(u64),
    MaxLength(u64),
    /// Exact length, equivalent to equal min and max bounds
    Length(u64),
    Regex(String),
}

/// Refinements applicable to a number schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberCheck {
    Int,
    Min(Number),
    Max(Number),
}

impl SchemaNode {
    pub fn string() -> Self {
        SchemaNode::String { checks: Vec::new() }
    }

    pub fn number() -> Self {
        SchemaNode::Number { checks: Vec::new() }
    }

    /// Shorthand for `number().int()`
    pub fn integer() -> Self {
        Self::number().int()
    }

    pub fn boolean() -> Self {
        SchemaNode::Boolean
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, SchemaNode)>,
        K: Into<String>,
    {
        SchemaNode::Object {
            fields: fields
                .into_iter()
                .map(|(name, schema)| Field {
                    name: name.into(),
                    schema,
                })
                .collect(),
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array {
            items: Box::new(items),
        }
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaNode::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn one_of<I>(variants: I) -> Self
    where
        I: IntoIterator<Item = SchemaNode>,
    {
        SchemaNode::Union {
            variants: variants.into_iter().collect(),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        SchemaNode::Literal {
            value: value.into(),
        }
    }

    pub fn unsupported(name: impl Into<String>) -> Self {
        SchemaNode::Unsupported { name: name.into() }
    }

    /// Wraps this node so the value may be absent.
    pub fn optional(self) -> Self {
        SchemaNode::Optional {
            inner: Box::new(self),
        }
    }

    /// Wraps this node with a default used when the value is absent.
    pub fn default_value(self, value: impl Into<Value>) -> Self {
        SchemaNode::Default {
            inner: Box::new(self),
            value: value.into(),
        }
    }

    pub fn email(self) -> Self {
        self.with_string_check(StringCheck::Email)
    }

    pub fn url(self) -> Self {
        self.with_string_check(StringCheck::Url)
    }

    pub fn uuid(self) -> Self {
        self.with_string_check(StringCheck::Uuid)
    }

    pub fn min_length(self, len: u64) -> Self {
        self.with_string_check(StringCheck::MinLength(len))
    }

    pub fn max_length(self, len: u64) -> Self {
        self.with_string_check(StringCheck::MaxLength(len))
    }

    pub fn length(self, len: u64) -> Self {
        self.with_string_check(StringCheck::Length(len))
    }

    pub fn regex(self, pattern: impl Into<String>) -> Self {
        self.with_string_check(StringCheck::Regex(pattern.into()))
    }

    pub fn int(self) -> Self {
        self.with_number_check(NumberCheck::Int)
    }

    pub fn min(self, bound: impl Into<Number>) -> Self {
        self.with_number_check(NumberCheck::Min(bound.into()))
    }

    pub fn max(self, bound: impl Into<Number>) -> Self {
        self.with_number_check(NumberCheck::Max(bound.into()))
    }

    /// Whether a parent object should leave this field out of `required`.
    pub fn is_optional(&self) -> bool {
        matches!(self, SchemaNode::Optional { .. } | SchemaNode::Default { .. })
    }

    /// Short name of the node kind, used in log messages.
    pub fn kind_name(&self) -> &str {
        match self {
            SchemaNode::String { .. } => "string",
            SchemaNode::Number { .. } => "number",
            SchemaNode::Boolean => "boolean",
            SchemaNode::Object { .. } => "object",
            SchemaNode::Array { .. } => "array",
            SchemaNode::Optional { .. } => "optional",
            SchemaNode::Default { .. } => "default",
            SchemaNode::Enum { .. } => "enum",
            SchemaNode::Union { .. } => "union",
            SchemaNode::Literal { .. } => "literal",
            SchemaNode::Unsupported { name } => name,
        }
    }

    // Refinements reach through optional/default wrappers so that
    // `string().optional().email()` reads the same as `string().email().optional()`.
    fn with_string_check(self, check: StringCheck) -> Self {
        match self {
            SchemaNode::String { mut checks } => {
                checks.push(check);
                SchemaNode::String { checks }
            }
            SchemaNode::Optional { inner } => SchemaNode::Optional {
                inner: Box::new(inner.with_string_check(check)),
            },
            SchemaNode::Default { inner, value } => SchemaNode::Default {
                inner: Box::new(inner.with_string_check(check)),
                value,
            },
            other => other,
        }
    }

    fn with_number_check(self, check: NumberCheck) -> Self {
        match self {
            SchemaNode::Number { mut checks } => {
                checks.push(check);
                SchemaNode::Number { checks }
            }
            SchemaNode::Optional { inner } => SchemaNode::Optional {
                inner: Box::new(inner.with_number_check(check)),
            },
            SchemaNode::Default { inner, value } => SchemaNode::Default {
                inner: Box::new(inner.with_number_check(check)),
                value,
            },
            other => other,
        }
    }
}
