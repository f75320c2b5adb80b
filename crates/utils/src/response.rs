use serde::Serialize;

use crate::correlation::CorrelationId;

/// JSON envelope for every API response.
///
/// The payload's fields are flattened next to `success` and
/// `correlationId`, so clients read e.g. `body.isActive` directly.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    correlation_id: CorrelationId,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            correlation_id: CorrelationId::current(),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(message.into()),
            correlation_id: CorrelationId::current(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        login_count: i64,
    }

    #[test]
    fn test_success_flattens_payload() {
        let response = ApiResponse::success(Payload { login_count: 2 });
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["loginCount"], json!(2));
        assert_eq!(
            value["correlationId"],
            json!(response.correlation_id().to_string())
        );
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_has_no_payload_fields() {
        let value = serde_json::to_value(ApiResponse::<Payload>::error("Unauthorized")).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"], json!("Unauthorized"));
    }

    #[test]
    fn test_message_is_optional() {
        let value =
            serde_json::to_value(ApiResponse::success_with_message((), "Trial created")).unwrap();
        assert_eq!(value["message"], json!("Trial created"));
    }
}
