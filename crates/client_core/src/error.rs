use thiserror::Error;

/// Failure taxonomy for directory API calls. Server-side validation
/// rejections arrive as `Server` with a 4xx status and a `detail`
/// message; there is no separate variant for them.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request could not be completed: {0}")]
    Transport(String),
    #[error("request failed with status {status}{}", detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Server { status: u16, detail: Option<String> },
    #[error("invalid response payload: {0}")]
    Payload(String),
}

impl DirectoryError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Message suitable for a user-facing notification: the server's
    /// `detail` when it sent one, otherwise a generic fallback keyed by
    /// what went wrong.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Server unreachable; check the network and try again".to_string(),
            Self::Server { status, detail } => detail
                .clone()
                .unwrap_or_else(|| format!("request failed with status {status}")),
            Self::Payload(_) => "Server returned an unreadable response".to_string(),
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Payload(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_detail() {
        let err = DirectoryError::Server {
            status: 400,
            detail: Some("email is invalid".to_string()),
        };
        assert_eq!(err.user_message(), "email is invalid");
    }

    #[test]
    fn user_message_falls_back_to_status() {
        let err = DirectoryError::Server {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message(), "request failed with status 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn display_includes_detail_when_present() {
        let err = DirectoryError::Server {
            status: 404,
            detail: Some("Employee not found".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 404: Employee not found"
        );
    }
}
