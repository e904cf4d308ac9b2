//! # Tool System
//!
//! Tools are named, schema-described callables the model may ask to invoke in
//! the middle of a conversation. Every tool satisfies the [`Tool`] contract:
//!
//! ```text
//! { name, description, input_schema, execute(input) -> result | error }
//! ```
//!
//! ## Tool Variants
//!
//! There are three ways to build one:
//!
//! 1. **Self-describing tools** - a type implements [`SelfDescribingTool`]. Its
//!    name is derived from the type name (`ReadFile` → `read_file`), its
//!    parameters come from [`SelfDescribingTool::describe_parameters`], and its
//!    single entry point is [`SelfDescribingTool::handle`]. Wrap it in a
//!    [`HandlerTool`] to register it.
//!
//! 2. **Method-bound tools** - an existing object implements [`ToolSet`] and
//!    lists several [`Method`]s. [`method_tools`] turns each method that
//!    carries a description into a [`MethodTool`] named
//!    `<type>_<method>` (`Calculator::add` → `calculator_add`).
//!
//! 3. **Closure tools** - [`tool`] returns a [`ToolBuilder`] for quick,
//!    one-off tools backed by an async closure.
//!
//! ## Argument Binding
//!
//! `execute(input)` binds the model-supplied JSON object against the declared
//! parameters in declaration order:
//!
//! - a key present in `input` is used as-is (even when it is `null`)
//! - otherwise the parameter's default value is used
//! - otherwise execution fails with [`Error::MissingParameter`]
//!
//! The bound values reach the handler as [`Arguments`], which hands them out
//! positionally ([`Arguments::take`]) or by name ([`Arguments::get`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use tool_agent::{async_trait, param, Arguments, HandlerTool, ParameterDescriptor,
//!     Result, SelfDescribingTool};
//! use serde_json::{json, Value};
//!
//! struct GetWeather;
//!
//! #[async_trait]
//! impl SelfDescribingTool for GetWeather {
//!     fn description(&self) -> Option<&str> {
//!         Some("Get current weather for a location")
//!     }
//!
//!     fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
//!         vec![
//!             param::<String>("location").describe("City name"),
//!             param::<String>("units").with_default(json!("celsius")),
//!         ]
//!     }
//!
//!     async fn handle(&self, mut args: Arguments) -> Result<Value> {
//!         let location: String = args.take()?;
//!         let units: String = args.take()?;
//!         Ok(json!({"location": location, "temperature": 22, "units": units}))
//!     }
//! }
//!
//! let weather = HandlerTool::new(GetWeather);
//! ```

use crate::Error;
use crate::Result;
use crate::schema::{
    self, JsonType, NO_DESCRIPTION, ParameterDescriptor, camel_to_snake, short_type_name,
};
use crate::types::ToolDefinition;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::{Arc, OnceLock};

/// The capability every registered tool provides.
///
/// Implementations must be safe to call reentrantly: the same tool instance
/// may be shared by several agents.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to request this tool
    fn name(&self) -> &str;

    /// Human-readable purpose, shown to the model
    fn description(&self) -> &str;

    /// Declared parameters, in invocation order
    fn parameters(&self) -> &[ParameterDescriptor];

    /// `{type: "object", properties, required}` derived from [`parameters`](Tool::parameters).
    ///
    /// Computed once per instance and cached.
    fn input_schema(&self) -> &Value;

    /// Bind `input` against the declared parameters and run the tool.
    async fn execute(&self, input: &Value) -> Result<Value>;

    /// Descriptor sent in the request's `tools` array.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema().clone(),
        }
    }
}

/// Render a tool's return value as the text placed in a `tool_result` block.
///
/// Strings are used verbatim, `null` becomes the empty string, and any other
/// value is serialized as compact JSON.
pub fn stringify_result(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Values bound to a tool's declared parameters, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, Value)>,
    cursor: usize,
}

impl Arguments {
    /// Bind `input` against `parameters`.
    ///
    /// A non-object `input` supplies no values, so every parameter falls back to
    /// its default.
    pub fn bind(parameters: &[ParameterDescriptor], input: &Value) -> Result<Self> {
        let supplied = input.as_object();
        let mut values = Vec::with_capacity(parameters.len());

        for parameter in parameters {
            let value = match supplied.and_then(|map| map.get(parameter.name())) {
                Some(value) => value.clone(),
                None => match parameter.default_value() {
                    Some(default) => default.clone(),
                    None => return Err(Error::missing_parameter(parameter.name())),
                },
            };
            values.push((parameter.name().to_string(), value));
        }

        Ok(Self { values, cursor: 0 })
    }

    /// Next argument in declaration order, deserialized as `T`.
    pub fn take<T: DeserializeOwned>(&mut self) -> Result<T> {
        let (name, value) = self.values.get(self.cursor).ok_or_else(|| {
            Error::invalid_input(format!(
                "tool requested argument #{} but only {} were declared",
                self.cursor + 1,
                self.values.len()
            ))
        })?;
        let parsed = decode(name, value)?;
        self.cursor += 1;
        Ok(parsed)
    }

    /// Argument `name`, deserialized as `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .value(name)
            .ok_or_else(|| Error::missing_parameter(name))?;
        decode(name, value)
    }

    /// Raw bound value for `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All bound values as a JSON object (defaults filled in).
    pub fn into_value(self) -> Value {
        Value::Object(self.values.into_iter().collect::<Map<String, Value>>())
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| Error::invalid_input(format!("parameter '{}': {}", name, e)))
}

/// A type whose single entry point is exposed as a tool.
///
/// Wrap implementations in [`HandlerTool`] to register them.
#[async_trait]
pub trait SelfDescribingTool: Send + Sync + 'static {
    /// Tool name. Defaults to the type name in snake case.
    fn name(&self) -> String {
        camel_to_snake(short_type_name::<Self>())
    }

    /// Tool description. `None` is reported as "No description provided".
    fn description(&self) -> Option<&str> {
        None
    }

    /// Parameters of [`handle`](SelfDescribingTool::handle), in the order it reads them.
    fn describe_parameters(&self) -> Vec<ParameterDescriptor>;

    async fn handle(&self, args: Arguments) -> Result<Value>;
}

/// [`Tool`] adapter for a [`SelfDescribingTool`].
///
/// Name, description and parameters are captured once at construction.
pub struct HandlerTool<H> {
    handler: H,
    name: String,
    description: String,
    parameters: Vec<ParameterDescriptor>,
    schema: OnceLock<Value>,
}

impl<H: SelfDescribingTool> HandlerTool<H> {
    pub fn new(handler: H) -> Self {
        let name = handler.name();
        let description = handler.description().unwrap_or(NO_DESCRIPTION).to_string();
        let parameters = handler.describe_parameters();
        Self {
            handler,
            name,
            description,
            parameters,
            schema: OnceLock::new(),
        }
    }

    /// Wrapped handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Wrap `handler` and share it, ready for registration.
    pub fn shared(handler: H) -> Arc<dyn Tool> {
        Arc::new(Self::new(handler))
    }
}

impl<H> std::fmt::Debug for HandlerTool<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[async_trait]
impl<H: SelfDescribingTool> Tool for HandlerTool<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    fn input_schema(&self) -> &Value {
        self.schema
            .get_or_init(|| schema::input_schema(&self.parameters))
    }

    async fn execute(&self, input: &Value) -> Result<Value> {
        let args = Arguments::bind(&self.parameters, input)?;
        self.handler.handle(args).await
    }
}

/// Boxed async method on `T`, invoked with a shared receiver.
pub type MethodHandler<T> =
    Arc<dyn Fn(Arc<T>, Arguments) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// One invocable method of a [`ToolSet`].
///
/// Only methods given a description are exposed by [`method_tools`].
pub struct Method<T> {
    name: String,
    description: Option<String>,
    parameters: Vec<ParameterDescriptor>,
    handler: MethodHandler<T>,
}

impl<T: Send + Sync + 'static> Method<T> {
    pub fn new<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<T>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            handler: Arc::new(move |this, args| handler(this, args).boxed()),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn params(mut self, parameters: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl<T> Clone for Method<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T> std::fmt::Debug for Method<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// An object exposing several methods as independent tools.
pub trait ToolSet: Send + Sync + Sized + 'static {
    /// Every method that may be exposed, with or without a description.
    fn methods() -> Vec<Method<Self>>;

    /// Prefix of the composite tool names. Defaults to the type name in snake case.
    fn tool_prefix() -> String {
        camel_to_snake(short_type_name::<Self>())
    }
}

/// A method of a shared instance exposed as a tool.
pub struct MethodTool<T> {
    instance: Arc<T>,
    name: String,
    description: String,
    parameters: Vec<ParameterDescriptor>,
    handler: MethodHandler<T>,
    schema: OnceLock<Value>,
}

impl<T: ToolSet> MethodTool<T> {
    /// Bind `method` to `instance`, named `<prefix>_<method>`.
    pub fn new(instance: Arc<T>, method: Method<T>) -> Self {
        Self {
            instance,
            name: format!("{}_{}", T::tool_prefix(), camel_to_snake(&method.name)),
            description: method
                .description
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            parameters: method.parameters,
            handler: method.handler,
            schema: OnceLock::new(),
        }
    }

    pub fn instance(&self) -> &Arc<T> {
        &self.instance
    }
}

impl<T> std::fmt::Debug for MethodTool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[async_trait]
impl<T: ToolSet> Tool for MethodTool<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    fn input_schema(&self) -> &Value {
        self.schema
            .get_or_init(|| schema::input_schema(&self.parameters))
    }

    async fn execute(&self, input: &Value) -> Result<Value> {
        let args = Arguments::bind(&self.parameters, input)?;
        (self.handler)(Arc::clone(&self.instance), args).await
    }
}

/// One tool per described method of `instance`, in [`ToolSet::methods`] order.
///
/// Methods without a description are not exposed.
pub fn method_tools<T: ToolSet>(instance: Arc<T>) -> Vec<Arc<dyn Tool>> {
    T::methods()
        .into_iter()
        .filter(|method| method.description.is_some())
        .map(|method| Arc::new(MethodTool::new(Arc::clone(&instance), method)) as Arc<dyn Tool>)
        .collect()
}

type ClosureHandler = Arc<dyn Fn(Arguments) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Tool backed by an async closure, built with [`tool`].
#[derive(Clone)]
pub struct FnTool {
    name: String,
    description: String,
    parameters: Vec<ParameterDescriptor>,
    handler: ClosureHandler,
    schema: Arc<OnceLock<Value>>,
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    fn input_schema(&self) -> &Value {
        self.schema
            .get_or_init(|| schema::input_schema(&self.parameters))
    }

    async fn execute(&self, input: &Value) -> Result<Value> {
        let args = Arguments::bind(&self.parameters, input)?;
        (self.handler)(args).await
    }
}

/// Builder for [`FnTool`]
#[derive(Debug)]
pub struct ToolBuilder {
    name: String,
    description: String,
    parameters: Vec<ParameterDescriptor>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Declare the next parameter.
    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declare a required parameter from a type name such as `"number"`.
    ///
    /// Unknown names are treated as `"string"`.
    pub fn typed_param(self, name: &str, type_name: &str) -> Self {
        self.param(ParameterDescriptor::new(
            name,
            JsonType::from_type_name(type_name),
        ))
    }

    pub fn build<F, Fut>(self, handler: F) -> FnTool
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let description = if self.description.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            self.description
        };
        FnTool {
            name: self.name,
            description,
            parameters: self.parameters,
            handler: Arc::new(move |args| handler(args).boxed()),
            schema: Arc::new(OnceLock::new()),
        }
    }
}

/// Start building a closure-backed tool.
///
/// ```rust,no_run
/// use tool_agent::{param, tool};
/// use serde_json::json;
///
/// let add = tool("add", "Add two numbers")
///     .param(param::<f64>("a"))
///     .param(param::<f64>("b"))
///     .build(|mut args| async move {
///         let a: f64 = args.take()?;
///         let b: f64 = args.take()?;
///         Ok(json!(a + b))
///     });
/// ```
pub fn tool(name: impl Into<String>, description: impl Into<String>) -> ToolBuilder {
    ToolBuilder::new(name, description)
}
