// ── Scout Atoms: Error Types ───────────────────────────────────────────────
// Single error enum for every gateway operation, built with `thiserror`.
//
// Design rules:
//   • Transport and gateway failures stay separate variants and are never
//     translated into one another.
//   • The `#[from]` attribute wires reqwest / serde_json conversions.
//   • No variant carries the API key in its message.

use thiserror::Error;

use super::constants::MAX_ERROR_BODY_CHARS;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Connection refused, DNS failure, timeout (reqwest layer).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status.
    #[error("Gateway error [{status}]: {body}")]
    Gateway { status: u16, body: String },

    /// Response body did not match the expected top-level shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client configuration is invalid (empty instance, bad base URL…).
    #[error("Configuration error: {0}")]
    Config(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EvolutionError {
    /// Build a gateway error, truncating the body so logs stay readable.
    pub fn gateway(status: u16, body: impl AsRef<str>) -> Self {
        let body = body.as_ref();
        let body = match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
            Some((idx, _)) => format!("{}…", &body[..idx]),
            None => body.to_string(),
        };
        Self::Gateway { status, body }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status of a gateway rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Gateway { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All gateway operations return this type.
pub type EvolutionResult<T> = Result<T, EvolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_body_is_truncated() {
        let long = "x".repeat(MAX_ERROR_BODY_CHARS + 50);
        match EvolutionError::gateway(500, &long) {
            EvolutionError::Gateway { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS + 1);
                assert!(body.ends_with('…'));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn gateway_truncation_respects_char_boundaries() {
        let long = "á".repeat(MAX_ERROR_BODY_CHARS + 1);
        let err = EvolutionError::gateway(400, &long);
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn short_body_kept_verbatim() {
        let err = EvolutionError::gateway(404, "instance not found");
        assert_eq!(err.to_string(), "Gateway error [404]: instance not found");
        assert!(!err.is_transport());
    }

    #[test]
    fn config_error_has_no_status() {
        let err = EvolutionError::config("instance name is empty");
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("instance name is empty"));
    }
}
