//! Email format and deliverability verification

use super::{decode_arguments, AbstractClient, OperationResult, ValidationRequest};
use crate::registry::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Arguments shared by the email operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailArgs {
    pub email: String,
}

impl AbstractClient {
    /// Validate an email address: format, deliverability, quality score, and
    /// the free/disposable/role/catch-all/MX/SMTP flags.
    ///
    /// Malformed addresses are still forwarded; the upstream decides.
    pub async fn verify_email(&self, email: &str) -> OperationResult {
        self.execute(ValidationRequest::VerifyEmail {
            email: email.to_string(),
        })
        .await
    }
}

/// `verify_email` tool
pub struct VerifyEmailTool {
    client: Arc<AbstractClient>,
}

impl VerifyEmailTool {
    pub fn new(client: Arc<AbstractClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for VerifyEmailTool {
    fn name(&self) -> &'static str {
        "verify_email"
    }

    fn description(&self) -> &'static str {
        "Validates an email address using the AbstractAPI email validation service. \
         Returns format validity, deliverability (e.g. DELIVERABLE), a quality score, \
         and whether the address is free, disposable, role-based, or catch-all, \
         along with MX and SMTP checks."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The email address to validate."
                }
            },
            "required": ["email"]
        })
    }

    async fn call(&self, arguments: &Map<String, Value>) -> OperationResult {
        let args: EmailArgs = decode_arguments(arguments)?;
        self.client.verify_email(&args.email).await
    }
}
