//! Weather tool — returns canned conditions so the fireworks question can be
//! answered without a weather API.

use async_trait::async_trait;
use alfred_core::error::ToolError;
use alfred_core::tool::{Tool, ToolResult};

pub struct WeatherInfoTool;

/// (condition, temperature in °C)
const CONDITIONS: [(&str, i32); 3] = [("Rainy", 15), ("Clear", 25), ("Windy", 20)];

#[async_trait]
impl Tool for WeatherInfoTool {
    fn name(&self) -> &str {
        "get_weather_info"
    }

    fn description(&self) -> &str {
        "Fetches dummy weather information for a given location."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get weather information for."
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let location = arguments["location"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'location' argument".into()))?;

        let (condition, temp_c) = pick_conditions(location);
        let output = format!("Weather in {location}: {condition}, {temp_c}°C");

        Ok(ToolResult {
            success: true,
            output,
            data: Some(serde_json::json!({
                "location": location,
                "condition": condition,
                "temp_c": temp_c,
            })),
        })
    }
}

/// Deterministic per location, case-insensitive.
fn pick_conditions(location: &str) -> (&'static str, i32) {
    let hash = location
        .to_lowercase()
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    CONDITIONS[hash as usize % CONDITIONS.len()]
}
