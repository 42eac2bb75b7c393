//! JSON-RPC 2.0 framing used by the platform's `type='json'` routes.
//!
//! Two error channels exist: a protocol-level `error` member (exceptions,
//! expired sessions) and a business-level `error` flag inside `result`
//! (e.g. `max_attempts_reached`). Both surface as `QuizError::Server`.

use crate::error::QuizError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: &'a P,
    pub id: u64,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    pub fn call(params: &'a P, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params,
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorData {
    pub name: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<RpcErrorData>,
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

fn business_error(result: &Value) -> Option<String> {
    match result.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(code) if code.is_empty() => None,
        Value::String(code) => Some(code.clone()),
        _ => Some("error".to_string()),
    }
}

/// Unwraps a response into `T`, turning either error channel into
/// `QuizError::Server`. `fallback_message` is shown when the server flags
/// an error without explaining it.
pub fn decode_result<T: DeserializeOwned>(
    response: RpcResponse,
    fallback_message: &str,
) -> Result<T, QuizError> {
    if let Some(error) = response.error {
        let data = error.data.unwrap_or(RpcErrorData {
            name: None,
            message: None,
        });
        let code = data.name.unwrap_or_else(|| match error.code {
            Some(code) => code.to_string(),
            None => "rpc_error".to_string(),
        });
        let message = data
            .message
            .filter(|m| !m.is_empty())
            .or_else(|| Some(error.message).filter(|m| !m.is_empty()))
            .unwrap_or_else(|| fallback_message.to_string());
        return Err(QuizError::Server { code, message });
    }

    let result = response
        .result
        .ok_or_else(|| QuizError::Network("response carried no result".to_string()))?;

    if let Some(code) = business_error(&result) {
        if let (Some(attempts), Some(max)) = (result.get("attempts"), result.get("max_attempts")) {
            log::warn!("Quiz attempts: {}/{}", attempts, max);
        }
        let message = result
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback_message)
            .to_string();
        return Err(QuizError::Server { code, message });
    }

    serde_json::from_value(result)
        .map_err(|e| QuizError::Network(format!("unexpected response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionResult;
    use serde_json::json;

    fn response(value: Value) -> RpcResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_envelope_shape() {
        let params = json!({"draft_answer": "text"});
        let body = serde_json::to_value(RpcRequest::call(&params, 7)).unwrap();
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "method": "call",
                "params": {"draft_answer": "text"},
                "id": 7
            })
        );
    }

    #[test]
    fn test_decodes_result() {
        let r: SubmissionResult = decode_result(
            response(json!({"jsonrpc": "2.0", "id": 1, "result": {"percentage": 80.0, "passed": true}})),
            "failed",
        )
        .unwrap();
        assert!(r.passed);
        assert_eq!(r.percentage, 80.0);
    }

    #[test]
    fn test_business_error_keeps_server_message() {
        let err = decode_result::<SubmissionResult>(
            response(json!({"result": {
                "error": "max_attempts_reached",
                "attempts": 3,
                "max_attempts": 3,
                "message": "You have reached the maximum number of attempts for this quiz."
            }})),
            "failed",
        )
        .unwrap_err();
        match err {
            QuizError::Server { code, message } => {
                assert_eq!(code, "max_attempts_reached");
                assert_eq!(
                    message,
                    "You have reached the maximum number of attempts for this quiz."
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_business_error_without_message_uses_fallback() {
        let err = decode_result::<SubmissionResult>(
            response(json!({"result": {"error": "no_questions"}})),
            "Submission failed.",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Submission failed.");
    }

    #[test]
    fn test_false_error_flag_is_not_an_error() {
        let r: SubmissionResult =
            decode_result(response(json!({"result": {"error": false, "passed": true}})), "x").unwrap();
        assert!(r.passed);
    }

    #[test]
    fn test_protocol_error_prefers_data_message() {
        let err = decode_result::<Value>(
            response(json!({"error": {
                "code": 100,
                "message": "Odoo Session Expired",
                "data": {"name": "odoo.http.SessionExpiredException", "message": "Session expired"}
            }})),
            "x",
        )
        .unwrap_err();
        match err {
            QuizError::Server { code, message } => {
                assert_eq!(code, "odoo.http.SessionExpiredException");
                assert_eq!(message, "Session expired");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_result_is_network_error() {
        let err = decode_result::<Value>(response(json!({"jsonrpc": "2.0"})), "x").unwrap_err();
        assert!(matches!(err, QuizError::Network(_)));
    }

    #[test]
    fn test_malformed_result_is_network_error() {
        let err = decode_result::<SubmissionResult>(
            response(json!({"result": {"percentage": "lots"}})),
            "x",
        )
        .unwrap_err();
        assert!(matches!(err, QuizError::Network(_)));
    }
}
