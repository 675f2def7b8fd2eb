use crate::FunctionTool;
use rand::Rng;
use serde_json::{Value, json};

/// Builds a sample dataset: sales and customer counts plus 3 to 10 valued items.
pub fn generate_dataset<R: Rng>(rng: &mut R) -> Value {
    let item_count = rng.random_range(3..=10);
    let items: Vec<Value> = (1..=item_count)
        .map(|id| json!({"id": id, "name": format!("Item {id}"), "value": rng.random_range(1..=100)}))
        .collect();
    json!({
        "sales": rng.random_range(100..=1000),
        "customers": rng.random_range(50..=500),
        "items": items,
    })
}

pub const GATHER_DATA_TOOL_NAME: &str = "gather_data_tool";

/// Stand-in data source for the data agent.
pub fn gather_data_tool() -> FunctionTool {
    FunctionTool::new(
        GATHER_DATA_TOOL_NAME,
        "Fetch the sales figures, customer count and item list for the requested report.",
        |_args| {
            let data = generate_dataset(&mut rand::rng());
            async move { Ok(data) }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::Tool;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_dataset_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let data = generate_dataset(&mut rng);
            let sales = data["sales"].as_i64().unwrap();
            let customers = data["customers"].as_i64().unwrap();
            let items = data["items"].as_array().unwrap();
            assert!((100..=1000).contains(&sales));
            assert!((50..=500).contains(&customers));
            assert!((3..=10).contains(&items.len()));
            for item in items {
                assert!((1..=100).contains(&item["value"].as_i64().unwrap()));
            }
        }
    }

    #[tokio::test]
    async fn test_tool_returns_items() {
        let tool = gather_data_tool();
        assert_eq!(tool.name(), "gather_data_tool");
        let data = tool.execute(json!({})).await.unwrap();
        assert_eq!(data["items"][0]["name"], "Item 1");
    }
}
