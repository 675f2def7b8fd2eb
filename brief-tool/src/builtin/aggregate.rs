use brief_core::{BriefError, Result, Tool};
use async_trait::async_trait;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Min,
    Max,
    Average,
    Sum,
}

impl Aggregate {
    pub const ALL: [Aggregate; 4] = [Aggregate::Min, Aggregate::Max, Aggregate::Average, Aggregate::Sum];

    fn tool_name(&self) -> &'static str {
        match self {
            Aggregate::Min => "min_tool",
            Aggregate::Max => "max_tool",
            Aggregate::Average => "average_tool",
            Aggregate::Sum => "sum_tool",
        }
    }

    fn result_key(&self) -> &'static str {
        match self {
            Aggregate::Min => "min_value",
            Aggregate::Max => "max_value",
            Aggregate::Average => "average_value",
            Aggregate::Sum => "sum_value",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Aggregate::Min => "Smallest 'value' among the given items.",
            Aggregate::Max => "Largest 'value' among the given items.",
            Aggregate::Average => "Mean of the 'value' fields of the given items.",
            Aggregate::Sum => "Total of the 'value' fields of the given items.",
        }
    }

    /// Empty input yields null, except for the sum which is 0.
    pub fn apply(&self, values: &[f64]) -> Value {
        if values.is_empty() {
            return match self {
                Aggregate::Sum => json!(0),
                _ => Value::Null,
            };
        }
        let result = match self {
            Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Average => values.iter().sum::<f64>() / values.len() as f64,
        };
        number(result, *self != Aggregate::Average)
    }
}

/// Whole results print as integers unless a fractional value is expected.
fn number(value: f64, integral_if_whole: bool) -> Value {
    if integral_if_whole && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

/// Accepts `{"data": [items]}`, `{"data": {"items": [..]}}` or `{"items": [..]}`.
fn item_values(args: &Value) -> Result<Vec<f64>> {
    let data = args.get("data").unwrap_or(args);
    let items = data
        .as_array()
        .or_else(|| data.get("items").and_then(Value::as_array))
        .ok_or_else(|| BriefError::Tool("expected a list of items under 'data'".into()))?;
    Ok(items.iter().filter_map(|item| item.get("value").and_then(Value::as_f64)).collect())
}

pub struct AggregateTool {
    op: Aggregate,
}

impl AggregateTool {
    pub fn new(op: Aggregate) -> Self {
        Self { op }
    }
}

#[async_trait]
impl Tool for AggregateTool {
    fn name(&self) -> &str {
        self.op.tool_name()
    }

    fn description(&self) -> &str {
        self.op.description()
    }

    fn parameters_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"value": {"type": "number"}},
                        "required": ["value"]
                    }
                }
            },
            "required": ["data"]
        }))
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let values = item_values(&args)?;
        tracing::debug!(tool = self.op.tool_name(), count = values.len(), "aggregating");
        Ok(json!({ (self.op.result_key()): self.op.apply(&values) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Value {
        json!({"data": [{"id": 1, "value": 4}, {"id": 2, "value": 9}, {"id": 3, "value": 5}]})
    }

    #[tokio::test]
    async fn test_each_aggregate() {
        let expected = [
            (Aggregate::Min, json!({"min_value": 4})),
            (Aggregate::Max, json!({"max_value": 9})),
            (Aggregate::Average, json!({"average_value": 6.0})),
            (Aggregate::Sum, json!({"sum_value": 18})),
        ];
        for (op, want) in expected {
            assert_eq!(AggregateTool::new(op).execute(items()).await.unwrap(), want);
        }
    }

    #[tokio::test]
    async fn test_empty_input() {
        let empty = json!({"data": []});
        assert_eq!(
            AggregateTool::new(Aggregate::Min).execute(empty.clone()).await.unwrap(),
            json!({"min_value": null})
        );
        assert_eq!(
            AggregateTool::new(Aggregate::Sum).execute(empty).await.unwrap(),
            json!({"sum_value": 0})
        );
    }

    #[tokio::test]
    async fn test_accepts_gathered_dataset_shape() {
        let gathered = json!({"data": {"sales": 10, "items": [{"value": 2}, {"value": 3}]}});
        let out = AggregateTool::new(Aggregate::Sum).execute(gathered).await.unwrap();
        assert_eq!(out, json!({"sum_value": 5}));

        let bad = AggregateTool::new(Aggregate::Max).execute(json!({"data": 3})).await;
        assert!(bad.is_err());
    }
}
