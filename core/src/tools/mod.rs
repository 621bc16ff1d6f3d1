pub mod rag;

use async_trait::async_trait;
use schemars::{gen::SchemaSettings, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// A named, remotely callable operation with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn args(&self) -> &[ToolArg];

    async fn call(&self, args: &str) -> Result<Value, ToolError>;

    /// The function calling definition advertised for this tool
    fn default_serializer(&self) -> Value {
        let parameters = build_parameters_schema(self.args());
        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": parameters
            }
        })
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Json Error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Stop at the first failing call
    #[default]
    FailEarly,
    /// Run every call, dropping the failures
    BestEffort,
}

pub struct ToolSet(pub Vec<Box<dyn Tool>>, pub ExecutionStrategy);

#[derive(Debug, Error)]
pub enum ToolSetError {
    #[error("Failed to find tool `{0}`")]
    ToolNotFound(String),
    #[error("Tool error: {0}")]
    ToolError(#[from] ToolError),
}

impl ToolSet {
    pub fn find_tool(&self, name: &str) -> Result<&dyn Tool, ToolSetError> {
        self.0
            .iter()
            .find(|t| t.name() == name)
            .map(|t| &**t)
            .ok_or_else(|| ToolSetError::ToolNotFound(name.to_string()))
    }

    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.0.push(tool);
    }

    pub fn remove_tool(&mut self, name: &str) -> Result<(), ToolSetError> {
        let pos = self
            .0
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| ToolSetError::ToolNotFound(name.to_string()))?;
        self.0.remove(pos);
        Ok(())
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.name()).collect()
    }

    /// Function calling definitions for every tool in the set
    #[must_use]
    pub fn definitions(&self) -> Vec<Value> {
        self.0.iter().map(|t| t.default_serializer()).collect()
    }

    pub async fn call(
        &self,
        id: &str,
        name: &str,
        args: &str,
    ) -> Result<ToolResponse, ToolSetError> {
        let tool = self.find_tool(name)?;
        debug!("Calling tool `{name}` ({id})");
        let v = tool.call(args).await.map_err(ToolSetError::from)?;
        Ok(ToolResponse {
            id: id.to_owned(),
            name: name.to_owned(),
            content: v,
        })
    }

    /// Execute a batch of calls according to the set's [`ExecutionStrategy`].
    pub async fn run(&self, calls: &[ToolCall]) -> Result<Vec<ToolResponse>, ToolSetError> {
        let mut values = vec![];
        match self.1 {
            ExecutionStrategy::FailEarly => {
                for call in calls {
                    values.push(self.call(&call.id, &call.name, &call.arguments).await?);
                }
            }
            ExecutionStrategy::BestEffort => {
                for call in calls {
                    match self.call(&call.id, &call.name, &call.arguments).await {
                        Ok(v) => values.push(v),
                        Err(e) => warn!("Dropping failed tool call {}: {e}", call.id),
                    }
                }
            }
        }
        Ok(values)
    }
}

pub struct ToolArg {
    name: String,
    required: bool,
    schema: Value,
}

impl ToolArg {
    /// A required argument whose JSON schema is derived from `T`.
    ///
    /// # Errors
    /// Fails if the generated schema can't be converted to JSON.
    pub fn new<T: JsonSchema + Serialize>(name: &str, description: &str) -> Result<Self, ToolError> {
        let settings = SchemaSettings::default().with(|s| {
            s.inline_subschemas = true;
        });
        let generator = settings.into_generator();
        let schema = generator.into_root_schema_for::<T>();
        let mut schema_value = serde_json::to_value(&schema)?;

        if let Some(obj) = schema_value.as_object_mut() {
            obj.remove("$schema");
            obj.remove("format");
            obj.remove("title");
            obj.insert("description".to_string(), json!(description));
        }
        process_json_value(&mut schema_value);

        Ok(ToolArg {
            name: name.to_string(),
            required: true,
            schema: schema_value,
        })
    }

    /// An argument callers may leave out
    ///
    /// # Errors
    /// Same as [`ToolArg::new`].
    pub fn optional<T: JsonSchema + Serialize>(
        name: &str,
        description: &str,
    ) -> Result<Self, ToolError> {
        Ok(ToolArg {
            required: false,
            ..Self::new::<T>(name, description)?
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn process_json_value(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(obj) => {
            let fields_to_remove = ["$schema", "format", "title", "minimum"];
            for &f in &fields_to_remove {
                if obj.get(f).is_some_and(|v| v.is_string() || v.is_number()) {
                    obj.remove(f);
                }
            }
            if let Some(v) = obj.get("oneOf").cloned() {
                obj.remove("oneOf");
                obj.insert("anyOf".to_string(), v);
            };

            if obj.contains_key("properties") {
                obj.insert("additionalProperties".to_string(), json!(false));
            }
            for (_, v) in obj.iter_mut() {
                process_json_value(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for elem in arr.iter_mut() {
                process_json_value(elem);
            }
        }
        _ => {}
    }
}

/// Represents a tool call requested by a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Represents the output of a tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub name: String,
    pub content: serde_json::Value,
}

#[must_use]
pub fn build_parameters_schema(args: &[ToolArg]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for arg in args {
        properties.insert(arg.name.clone(), arg.schema.clone());
        if arg.required {
            required.push(json!(arg.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}
