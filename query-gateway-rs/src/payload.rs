// query-gateway-rs/src/payload.rs
//
// Query payload extraction from the inbound request.
//
// Two body modes exist:
// - `Content-Type: application/json`: the body is a JSON object with a
//   `query` string and an optional `variables` object
// - anything else: the entire raw body is the query string (legacy
//   plain-text mode)
//
// The content type must equal "application/json" (case-insensitive,
// surrounding whitespace ignored); a value with parameters such as
// "application/json; charset=utf-8" selects legacy mode.

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use serde_json::{Map, Value};

use crate::error::GatewayError;

/// The query document submitted by the caller, in exactly one of its two
/// shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPayload {
    /// Structured JSON document: query string plus optional variables.
    Document {
        query: String,
        variables: Option<Map<String, Value>>,
    },
    /// Legacy plain-text mode: the raw body, forwarded verbatim.
    Raw(String),
}

impl QueryPayload {
    /// The query string, regardless of shape.
    pub fn query(&self) -> &str {
        match self {
            QueryPayload::Document { query, .. } => query,
            QueryPayload::Raw(query) => query,
        }
    }

    /// The variables mapping, if the structured shape carried one.
    pub fn variables(&self) -> Option<&Map<String, Value>> {
        match self {
            QueryPayload::Document { variables, .. } => variables.as_ref(),
            QueryPayload::Raw(_) => None,
        }
    }

    /// Build a payload from the inbound headers and body.
    ///
    /// All rejections here are client failures: the downstream engine is
    /// never consulted for a body we cannot extract a payload from.
    pub fn from_request(headers: &HeaderMap, body: &[u8]) -> Result<Self, GatewayError> {
        let text = std::str::from_utf8(body)
            .map_err(|_| GatewayError::Client("request body is not valid UTF-8".to_string()))?;

        if is_json_content_type(headers) {
            Self::from_json_document(text)
        } else {
            Ok(QueryPayload::Raw(text.to_string()))
        }
    }

    fn from_json_document(text: &str) -> Result<Self, GatewayError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| GatewayError::Client(format!("invalid JSON body: {}", err)))?;

        let object = value
            .as_object()
            .ok_or_else(|| GatewayError::Client("request body must be a JSON object".to_string()))?;

        let query = match object.get("query") {
            Some(Value::String(query)) => query.clone(),
            Some(_) => {
                return Err(GatewayError::Client(
                    "the 'query' field must be a string".to_string(),
                ))
            }
            None => {
                return Err(GatewayError::Client(
                    "missing required field 'query'".to_string(),
                ))
            }
        };

        let variables = match object.get("variables") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map.clone()),
            Some(_) => {
                return Err(GatewayError::Client(
                    "the 'variables' field must be an object".to_string(),
                ))
            }
        };

        Ok(QueryPayload::Document { query, variables })
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}
