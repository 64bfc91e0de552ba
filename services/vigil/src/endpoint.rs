//! Endpoint definition and input validation

use serde::{Deserialize, Serialize};

/// A named URL to be health-checked. Endpoints are identified by `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Validate user input before it reaches the store.
    ///
    /// The name must be non-empty and the URL must parse as an absolute
    /// `http` or `https` URL.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::VigilError::Validation(
                "endpoint name must not be empty".to_string(),
            ));
        }

        let url = reqwest::Url::parse(&self.url).map_err(|e| {
            crate::VigilError::Validation(format!("invalid URL '{}': {}", self.url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(crate::VigilError::Validation(format!(
                "unsupported URL scheme '{}' in '{}': expected http or https",
                other, self.url
            ))),
        }
    }
}
