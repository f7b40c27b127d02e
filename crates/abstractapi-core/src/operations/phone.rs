//! Phone number validation

use super::{decode_arguments, AbstractClient, OperationResult, ValidationRequest};
use crate::registry::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Arguments of `validate_phone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneArgs {
    pub phone: String,
    /// ISO 3166-1 alpha-2 code, forwarded without local checks
    #[serde(default)]
    pub country: Option<String>,
}

impl AbstractClient {
    /// Validate a phone number, optionally in the context of a country.
    ///
    /// `country` is sent only when present.
    pub async fn validate_phone(&self, phone: &str, country: Option<&str>) -> OperationResult {
        self.execute(ValidationRequest::ValidatePhone {
            phone: phone.to_string(),
            country: country.map(str::to_string),
        })
        .await
    }
}

/// `validate_phone` tool
pub struct ValidatePhoneTool {
    client: Arc<AbstractClient>,
}

impl ValidatePhoneTool {
    pub fn new(client: Arc<AbstractClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ValidatePhoneTool {
    fn name(&self) -> &'static str {
        "validate_phone"
    }

    fn description(&self) -> &'static str {
        "Validates a phone number using the AbstractAPI phone validation service. \
         Returns validity, international and local formats, country details, \
         location, line type, and carrier."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "phone": {
                    "type": "string",
                    "description": "The phone number to validate."
                },
                "country": {
                    "type": ["string", "null"],
                    "description": "Optional ISO 3166-1 alpha-2 country code (e.g. \"US\") used when the number lacks a country prefix."
                }
            },
            "required": ["phone"]
        })
    }

    async fn call(&self, arguments: &Map<String, Value>) -> OperationResult {
        let args: PhoneArgs = decode_arguments(arguments)?;
        self.client
            .validate_phone(&args.phone, args.country.as_deref())
            .await
    }
}
