//! Email reputation analysis

use super::{decode_arguments, AbstractClient, EmailArgs, OperationResult, ValidationRequest};
use crate::registry::Tool;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

impl AbstractClient {
    /// Extended email report: deliverability, quality, sender, domain, risk,
    /// and breach history, returned in the upstream's own structure.
    pub async fn check_email_reputation(&self, email: &str) -> OperationResult {
        self.execute(ValidationRequest::CheckEmailReputation {
            email: email.to_string(),
        })
        .await
    }
}

/// `check_email_reputation` tool
pub struct CheckEmailReputationTool {
    client: Arc<AbstractClient>,
}

impl CheckEmailReputationTool {
    pub fn new(client: Arc<AbstractClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CheckEmailReputationTool {
    fn name(&self) -> &'static str {
        "check_email_reputation"
    }

    fn description(&self) -> &'static str {
        "Analyzes email reputation using the AbstractAPI email reputation service. \
         Returns deliverability, quality scoring, sender and domain details, \
         risk assessment, and data breach history."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The email address to analyze."
                }
            },
            "required": ["email"]
        })
    }

    async fn call(&self, arguments: &Map<String, Value>) -> OperationResult {
        let args: EmailArgs = decode_arguments(arguments)?;
        self.client.check_email_reputation(&args.email).await
    }
}
