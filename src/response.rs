use serde::Serialize;

/// Success envelope every handler returns: `{success, message, data?}`.
/// Failures use the mirror-image envelope rendered by `ApiError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_only_omits_data() {
        let json = serde_json::to_string(&ApiResponse::message("Logged out successfully")).unwrap();
        assert_eq!(
            json,
            r#"{"success":true,"message":"Logged out successfully"}"#
        );
    }

    #[test]
    fn ok_includes_data() {
        let json = serde_json::to_string(&ApiResponse::ok("done", 7)).unwrap();
        assert!(json.contains(r#""data":7"#));
    }
}
