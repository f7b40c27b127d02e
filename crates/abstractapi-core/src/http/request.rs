//! Outbound request construction
//!
//! Every upstream call is a GET to a fixed base URL with the API key and the
//! operation's inputs as query parameters.

use crate::config::ApiKey;
use crate::operations::Operation;
use std::fmt;

/// Query parameter carrying the credential
pub const API_KEY_PARAM: &str = "api_key";

/// A fully shaped upstream request, ready for the transport
#[derive(Clone)]
pub struct UpstreamRequest {
    operation: Operation,
    url: String,
    query: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    /// Start a request; the key is always the first parameter
    pub fn builder(operation: Operation, url: &str, api_key: &ApiKey) -> UpstreamRequestBuilder {
        UpstreamRequestBuilder {
            operation,
            url: url.to_string(),
            query: vec![(API_KEY_PARAM, api_key.expose().to_string())],
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    /// Value of a query parameter, if present
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Names of the parameters, for logging without values
    pub fn param_names(&self) -> Vec<&'static str> {
        self.query.iter().map(|(key, _)| *key).collect()
    }
}

impl fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: Vec<(&str, &str)> = self
            .query
            .iter()
            .map(|(key, value)| {
                if *key == API_KEY_PARAM {
                    (*key, "***")
                } else {
                    (*key, value.as_str())
                }
            })
            .collect();

        f.debug_struct("UpstreamRequest")
            .field("operation", &self.operation)
            .field("url", &self.url)
            .field("query", &query)
            .finish()
    }
}

/// Builder for [`UpstreamRequest`]
#[derive(Debug)]
pub struct UpstreamRequestBuilder {
    operation: Operation,
    url: String,
    query: Vec<(&'static str, String)>,
}

impl UpstreamRequestBuilder {
    /// Add a parameter, forwarded exactly as given
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    /// Add a parameter only when a non-empty value is present
    pub fn optional_param(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.trim().is_empty() => self.param(name, value),
            _ => self,
        }
    }

    pub fn build(self) -> UpstreamRequest {
        UpstreamRequest {
            operation: self.operation,
            url: self.url,
            query: self.query,
        }
    }
}
