use crate::Result;
use crate::model::ToolDeclaration;
use async_trait::async_trait;
use serde_json::{Value, json};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Option<Value> {
        None
    }
    async fn execute(&self, args: Value) -> Result<Value>;

    /// Declaration sent to the model. Tools without a schema accept an empty object.
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self
                .parameters_schema()
                .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
        }
    }
}
