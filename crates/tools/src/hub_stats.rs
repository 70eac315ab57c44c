//! Hugging Face Hub statistics — the most downloaded model of an author.

use std::time::Duration;

use async_trait::async_trait;
use alfred_core::error::ToolError;
use alfred_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use tracing::debug;

pub struct HubStatsTool {
    base_url: String,
    client: reqwest::Client,
}

impl HubStatsTool {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn failure(&self, author: &str, reason: impl std::fmt::Display) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: format!("fetching models for {author}: {reason}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HubModel {
    id: String,
    #[serde(default)]
    downloads: u64,
}

#[async_trait]
impl Tool for HubStatsTool {
    fn name(&self) -> &str {
        "get_hub_stats"
    }

    fn description(&self) -> &str {
        "Fetches the most downloaded model from a specific author on the Hugging Face Hub."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "author": {
                    "type": "string",
                    "description": "The username of the model author/organization to find models from."
                }
            },
            "required": ["author"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let author = arguments["author"]
            .as_str()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'author' argument".into()))?;

        let url = format!("{}/api/models", self.base_url);
        debug!(%url, author, "Querying Hub models");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("author", author),
                ("sort", "downloads"),
                ("direction", "-1"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| self.failure(author, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(author, format!("HTTP {status}")));
        }

        let models: Vec<HubModel> = response.json().await.map_err(|e| self.failure(author, e))?;

        Ok(ToolResult::text(describe_top_model(author, models.first())))
    }
}

fn describe_top_model(author: &str, model: Option<&HubModel>) -> String {
    match model {
        Some(m) => format!(
            "The most downloaded model by {author} is {} with {} downloads.",
            m.id,
            group_thousands(m.downloads)
        ),
        None => format!("No models found for author {author}."),
    }
}

/// `1234567` → `"1,234,567"`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_digits() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(13_018_390), "13,018,390");
    }

    #[test]
    fn describes_top_model() {
        let models: Vec<HubModel> = serde_json::from_str(
            r#"[{"_id": "x", "id": "facebook/esmfold_v1", "downloads": 13018390, "likes": 21}]"#,
        )
        .unwrap();
        assert_eq!(
            describe_top_model("facebook", models.first()),
            "The most downloaded model by facebook is facebook/esmfold_v1 with 13,018,390 downloads."
        );
    }

    #[test]
    fn describes_missing_author() {
        assert_eq!(
            describe_top_model("nobody", None),
            "No models found for author nobody."
        );
    }

    #[tokio::test]
    async fn missing_author_returns_error() {
        let tool = HubStatsTool::new("http://127.0.0.1:9");
        let result = tool.execute(serde_json::json!({"author": "  "})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn unreachable_hub_is_execution_failure() {
        let tool = HubStatsTool::new("http://127.0.0.1:9");
        let err = tool
            .execute(serde_json::json!({"author": "facebook"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { ref tool_name, .. } if tool_name == "get_hub_stats"));
    }

    #[test]
    fn tool_definition() {
        let def = HubStatsTool::new("https://huggingface.co").to_definition();
        assert_eq!(def.name, "get_hub_stats");
    }
}
