//! Minimal newline-delimited JSON-RPC 2.0 framing. No auth, CORS, or rate
//! limiting; those are external-collaborator concerns. Malformed input
//! yields a Parse Error response instead of terminating the stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INTERNAL_ERROR: i64 = -32603;

/// An id is normalized to this canonical form so the number/float
/// ambiguity in JSON doesn't produce two different-looking ids for the
/// same logical request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

impl RequestId {
    pub fn normalize(value: Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RequestId::Number(i)
                } else if let Some(f) = n.as_f64() {
                    RequestId::Number(f.round() as i64)
                } else {
                    RequestId::Null
                }
            }
            Value::String(s) => RequestId::String(s),
            _ => RequestId::Null,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn ok(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: RequestId, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Parses one newline-delimited line. Never panics on malformed input —
/// returns a Parse Error response instead so the caller's read loop can
/// continue to the next line.
pub fn parse_line(line: &str) -> Result<RpcRequest, RpcResponse> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(RpcResponse::err(RequestId::Null, PARSE_ERROR, "empty line"));
    }

    let raw: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(e) => return Err(RpcResponse::err(RequestId::Null, PARSE_ERROR, e.to_string())),
    };

    let id = RequestId::normalize(raw.get("id").cloned().unwrap_or(Value::Null));

    let request: RpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => return Err(RpcResponse::err(id, INVALID_REQUEST, e.to_string())),
    };

    if request.jsonrpc != "2.0" {
        return Err(RpcResponse::err(id, INVALID_REQUEST, "jsonrpc must be \"2.0\""));
    }

    Ok(request)
}

pub fn serialize_response(response: &RpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| {
        r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"failed to serialize response"}}"#.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_yields_parse_error() {
        let err = parse_line("not json").unwrap_err();
        assert_eq!(err.error.unwrap().code, PARSE_ERROR);
    }

    #[test]
    fn rejects_non_2_0_jsonrpc_version() {
        let err = parse_line(r#"{"jsonrpc":"1.0","id":1,"method":"handle_request"}"#).unwrap_err();
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn float_id_normalizes_to_integer() {
        let request = parse_line(r#"{"jsonrpc":"2.0","id":1.0,"method":"handle_request","params":{}}"#).unwrap();
        let id = RequestId::normalize(request.id.clone());
        assert_eq!(id, RequestId::Number(1));
    }

    #[test]
    fn string_and_integer_ids_round_trip() {
        let request = parse_line(r#"{"jsonrpc":"2.0","id":"abc","method":"handle_request"}"#).unwrap();
        assert_eq!(RequestId::normalize(request.id), RequestId::String("abc".to_string()));
    }
}
