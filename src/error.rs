use thiserror::Error;

/// Shown when a generation request fails without a describable cause.
pub const GENERIC_FAILURE_MESSAGE: &str = "메시지를 처리하는 중 오류가 발생했습니다.";

/// Failure of a call to the quiz service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("서버 응답 오류 (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("생성된 텍스트가 없습니다.")]
    EmptyBody,

    #[error("응답을 해석할 수 없습니다: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request task ended without producing a result.
    #[error("request task aborted")]
    Aborted,
}

impl ApiError {
    /// Text of the assistant message appended for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Aborted => GENERIC_FAILURE_MESSAGE.to_string(),
            other => format!("오류가 발생했습니다: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_prefixed() {
        assert_eq!(
            ApiError::EmptyBody.user_message(),
            "오류가 발생했습니다: 생성된 텍스트가 없습니다."
        );
    }

    #[test]
    fn status_includes_code_and_body() {
        let err = ApiError::Status {
            status: 503,
            body: "busy".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.starts_with("오류가 발생했습니다: "));
        assert!(msg.contains("503"));
        assert!(msg.contains("busy"));
    }

    #[test]
    fn aborted_uses_generic_message() {
        assert_eq!(ApiError::Aborted.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
