//! Guest information retriever — BM25 lookup over the gala guest list.

use std::sync::Arc;

use async_trait::async_trait;
use alfred_core::error::ToolError;
use alfred_core::tool::{Tool, ToolResult};
use alfred_retrieval::RetrievalIndex;

pub struct GuestInfoTool {
    index: Arc<RetrievalIndex>,
    limit: usize,
}

impl GuestInfoTool {
    pub fn new(index: Arc<RetrievalIndex>, limit: usize) -> Self {
        Self {
            index,
            limit: limit.max(1),
        }
    }
}

#[async_trait]
impl Tool for GuestInfoTool {
    fn name(&self) -> &str {
        "guest_info_retriever"
    }

    fn description(&self) -> &str {
        "Retrieves detailed information about gala guests based on their name or relation."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The name or relation of the guest you want information about."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        // Some models send the bare query string instead of an object.
        let query = match &arguments {
            serde_json::Value::String(q) => q.as_str(),
            other => other["query"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?,
        };

        let documents = self.index.query(query, self.limit);
        Ok(ToolResult::text(documents.join("\n\n")))
    }
}
