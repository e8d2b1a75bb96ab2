use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use gkectl_core::error::ApiError;

/// Authenticated blocking JSON transport shared by the API clients.
pub struct Http {
    client: Client,
    token: String,
}

impl Http {
    pub fn new(token: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("gkectl/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            token: token.to_string(),
        })
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        debug!(url = %url, "GET");
        let resp = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        handle(resp)
    }

    pub fn post<T, B>(&self, url: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        debug!(url = %url, "POST");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        handle(resp)
    }

    pub fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(url = %url, "DELETE");
        let resp = self
            .client
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        handle(resp)
    }
}

fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let text = resp
        .text()
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    if status.is_success() {
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("{}: {}", e, text)))
    } else if status == StatusCode::NOT_FOUND {
        Err(ApiError::NotFound(diagnostic(&text)))
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ApiError::Auth(diagnostic(&text)))
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            message: diagnostic(&text),
        })
    }
}

/// Pull the human-readable message out of a Google error body, falling back
/// to the raw text so the control plane's diagnostic is never lost.
fn diagnostic(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_extracts_message() {
        let body = r#"{"error": {"code": 403, "message": "Quota exceeded", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(diagnostic(body), "Quota exceeded");
    }

    #[test]
    fn test_diagnostic_falls_back_to_raw() {
        assert_eq!(diagnostic("plain failure text"), "plain failure text");
        assert_eq!(diagnostic(r#"{"unexpected": true}"#), r#"{"unexpected": true}"#);
    }
}
