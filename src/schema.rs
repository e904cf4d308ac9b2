//! # Schema Introspection
//!
//! Turns a callable's declared parameter list into the JSON-Schema-shaped
//! `input_schema` the Messages API expects for every tool.
//!
//! Rust has no runtime reflection over function signatures, so a tool declares
//! its parameters explicitly as a list of [`ParameterDescriptor`]s. The JSON
//! type of each parameter is still derived from its *Rust* type through the
//! [`ParamType`] trait, so declaring `param::<Option<i64>>("limit")` yields a
//! `number` property that is not required.
//!
//! ## Type Mapping
//!
//! | Rust type | JSON type |
//! |-----------|-----------|
//! | `i8`..`i128`, `u8`..`u128`, `isize`, `usize`, `f32`, `f64` | `number` |
//! | `bool` | `boolean` |
//! | `Vec<T>`, `[T; N]`, `VecDeque<T>`, `HashSet<T>`, `BTreeSet<T>` | `array` |
//! | `serde_json::Value`, `Map<String, Value>`, `HashMap<K, V>`, `BTreeMap<K, V>` | `object` |
//! | `String`, `char`, `PathBuf` and custom types | `string` |
//! | `Option<T>` | same as `T`, and nullable |
//!
//! ## Required Parameters
//!
//! A parameter is required unless it declares a default value or its type
//! admits null (`Option<T>`).
//!
//! ## Example
//!
//! ```rust
//! use tool_agent::{input_schema, param};
//! use serde_json::json;
//!
//! let params = vec![
//!     param::<String>("path").describe("File to read"),
//!     param::<Option<i64>>("limit"),
//!     param::<bool>("follow").with_default(json!(false)),
//! ];
//!
//! let schema = input_schema(&params);
//! assert_eq!(schema["type"], "object");
//! assert_eq!(schema["properties"]["limit"]["type"], "number");
//! assert_eq!(schema["properties"]["limit"]["description"], "No description provided");
//! assert_eq!(schema["required"], json!(["path"]));
//! ```

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::PathBuf;

/// Placeholder used when a tool, method or parameter carries no description.
pub const NO_DESCRIPTION: &str = "No description provided";

/// The JSON types a tool parameter can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl JsonType {
    /// The type name as it appears in the schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
        }
    }

    /// Map a loosely written type name to a JSON type.
    ///
    /// Used when parameters are declared from configuration rather than from
    /// a Rust type. Unknown names fall back to `string`, the same as untyped
    /// parameters.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "int" | "integer" | "float" | "double" | "number" | "i32" | "i64" | "u32" | "u64"
            | "f32" | "f64" | "usize" | "isize" => JsonType::Number,
            "bool" | "boolean" => JsonType::Boolean,
            "array" | "list" | "vec" => JsonType::Array,
            "object" | "map" | "value" => JsonType::Object,
            _ => JsonType::String,
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile-time mapping from a Rust parameter type to its JSON schema type.
///
/// Custom types opt in with an empty impl and are advertised as `string`:
///
/// ```rust
/// use tool_agent::{param, JsonType, ParamType};
///
/// struct Sha256(String);
/// impl ParamType for Sha256 {}
///
/// assert_eq!(param::<Sha256>("digest").json_type(), JsonType::String);
/// ```
pub trait ParamType {
    /// JSON type the parameter is advertised as.
    const JSON_TYPE: JsonType = JsonType::String;

    /// Whether the type admits an absent/null value.
    const NULLABLE: bool = false;
}

macro_rules! impl_param_type {
    ($json:expr => $($ty:ty),+ $(,)?) => {
        $(impl ParamType for $ty {
            const JSON_TYPE: JsonType = $json;
        })+
    };
}

impl_param_type!(JsonType::Number =>
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
impl_param_type!(JsonType::Boolean => bool);
impl_param_type!(JsonType::String => String, str, char, PathBuf);
impl_param_type!(JsonType::Object => Value, Map<String, Value>);

impl<T> ParamType for Vec<T> {
    const JSON_TYPE: JsonType = JsonType::Array;
}

impl<T, const N: usize> ParamType for [T; N] {
    const JSON_TYPE: JsonType = JsonType::Array;
}

impl<T> ParamType for VecDeque<T> {
    const JSON_TYPE: JsonType = JsonType::Array;
}

impl<T, S> ParamType for HashSet<T, S> {
    const JSON_TYPE: JsonType = JsonType::Array;
}

impl<T> ParamType for BTreeSet<T> {
    const JSON_TYPE: JsonType = JsonType::Array;
}

impl<K, V, S> ParamType for HashMap<K, V, S> {
    const JSON_TYPE: JsonType = JsonType::Object;
}

impl<K, V> ParamType for BTreeMap<K, V> {
    const JSON_TYPE: JsonType = JsonType::Object;
}

impl<T: ParamType> ParamType for Option<T> {
    const JSON_TYPE: JsonType = T::JSON_TYPE;
    const NULLABLE: bool = true;
}

/// One declared parameter of a tool's callable.
///
/// Built with [`param`] (typed) or [`ParameterDescriptor::new`] (untyped),
/// then refined with [`describe`](ParameterDescriptor::describe),
/// [`with_default`](ParameterDescriptor::with_default) and
/// [`nullable`](ParameterDescriptor::nullable).
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    name: String,
    json_type: JsonType,
    description: Option<String>,
    default: Option<Value>,
    nullable: bool,
}

impl ParameterDescriptor {
    /// Declare a parameter with an explicit JSON type.
    pub fn new(name: impl Into<String>, json_type: JsonType) -> Self {
        Self {
            name: name.into(),
            json_type,
            description: None,
            default: None,
            nullable: false,
        }
    }

    /// Declare a parameter whose JSON type and nullability come from `T`.
    pub fn of<T: ParamType + ?Sized>(name: impl Into<String>) -> Self {
        Self {
            nullable: T::NULLABLE,
            ..Self::new(name, T::JSON_TYPE)
        }
    }

    /// Attach the parameter's documentation.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a default value, used when the invocation omits the parameter.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Override whether the declared type admits null.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn json_type(&self) -> JsonType {
        self.json_type
    }

    /// The parameter's documentation, or [`NO_DESCRIPTION`].
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION)
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Required iff there is no default and the type does not admit null.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.nullable
    }

    /// The `{type, description}` property object for this parameter.
    pub fn to_property(&self) -> Value {
        json!({
            "type": self.json_type.as_str(),
            "description": self.description(),
        })
    }
}

/// Declare a typed parameter (shorthand for [`ParameterDescriptor::of`]).
pub fn param<T: ParamType + ?Sized>(name: impl Into<String>) -> ParameterDescriptor {
    ParameterDescriptor::of::<T>(name)
}

/// Property objects keyed by parameter name, in declaration order.
pub fn properties(parameters: &[ParameterDescriptor]) -> Map<String, Value> {
    parameters
        .iter()
        .map(|p| (p.name.clone(), p.to_property()))
        .collect()
}

/// Names of the required parameters, in declaration order.
pub fn required_parameters(parameters: &[ParameterDescriptor]) -> Vec<String> {
    parameters
        .iter()
        .filter(|p| p.is_required())
        .map(|p| p.name.clone())
        .collect()
}

/// Build the composite `{type: "object", properties, required}` input schema.
///
/// Deterministic: the same parameter list always yields the same value, and
/// serializes byte-identically since properties keep declaration order.
pub fn input_schema(parameters: &[ParameterDescriptor]) -> Value {
    json!({
        "type": "object",
        "properties": properties(parameters),
        "required": required_parameters(parameters),
    })
}

/// Convert `CamelCase` to `snake_case`.
///
/// Every ASCII uppercase letter except a leading one is prefixed with an
/// underscore, then the whole string is lowercased. Already snake-cased input
/// passes through unchanged.
///
/// ```rust
/// use tool_agent::camel_to_snake;
///
/// assert_eq!(camel_to_snake("ReadFile"), "read_file");
/// assert_eq!(camel_to_snake("listFiles"), "list_files");
/// assert_eq!(camel_to_snake("read_file"), "read_file");
/// ```
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// The unqualified name of a type, without module path or generic arguments.
///
/// `my_app::tools::ReadFile<String>` becomes `ReadFile`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
