use thiserror::Error;

pub const GENERIC_FAILURE: &str = "Request failed";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Transport(String),
    #[error("api error ({status}): {}", .message.as_deref().unwrap_or(GENERIC_FAILURE))]
    Server { status: u16, message: Option<String> },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Text suitable for a notice: the server's own message when it sent one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn from_response(status: u16, body: &str) -> Self {
        ApiError::Server {
            status,
            message: extract_message(body),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Self::Decode(value.to_string());
        }
        Self::Transport(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session encoding error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            SessionError::Api(err) => err.user_message(fallback),
            _ => fallback.to_string(),
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key))
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}
