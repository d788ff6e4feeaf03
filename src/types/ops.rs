//! File operations as received from an upstream planner.
//!
//! Every field is untrusted: the wire form is deliberately lenient (unknown actions deserialize
//! into `Action::Unsupported`) so that shape problems surface as a `Failed` result for that one
//! operation instead of rejecting the whole batch at parse time.
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::errors::{Error, ErrorKind, Result};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Create,
    Update,
    Delete,
    Unsupported(String),
}

impl Action {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Unsupported(s) => s.as_str(),
        }
    }

    /// Create and update carry content; delete ignores it.
    #[must_use]
    pub fn needs_content(&self) -> bool {
        matches!(self, Action::Create | Action::Update)
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Action::Create,
            "update" => Action::Update,
            "delete" => Action::Delete,
            _ => Action::Unsupported(s),
        }
    }
}

impl From<Action> for String {
    fn from(a: Action) -> Self {
        a.as_str().to_string()
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::Unsupported(String::new())
    }
}

/// Payload encoding. Unknown names are kept so `validate` can reject the one operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Encoding {
    #[default]
    Utf8,
    Base64,
    Unsupported(String),
}

impl Encoding {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Base64 => "base64",
            Encoding::Unsupported(s) => s.as_str(),
        }
    }
}

impl From<String> for Encoding {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Encoding::Utf8,
            "base64" => Encoding::Base64,
            _ => Encoding::Unsupported(s),
        }
    }
}

impl From<Encoding> for String {
    fn from(e: Encoding) -> Self {
        e.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperation {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
}

impl FileOperation {
    pub fn create(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            action: Action::Create,
            content: Some(content.into()),
            encoding: None,
        }
    }

    pub fn update(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            action: Action::Update,
            content: Some(content.into()),
            encoding: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            action: Action::Delete,
            content: None,
            encoding: None,
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding.clone().unwrap_or_default()
    }

    /// Check the operation's shape: non-empty path, supported action, content where required.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` describing the first shape problem found.
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                "invalid operation: path is required",
            ));
        }
        if let Action::Unsupported(a) = &self.action {
            let msg = if a.is_empty() {
                "invalid operation: action is required".to_string()
            } else {
                format!("invalid operation: unsupported action {a:?}")
            };
            return Err(Error::new(ErrorKind::InvalidOperation, msg));
        }
        if let Some(Encoding::Unsupported(e)) = &self.encoding {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("invalid operation: unsupported encoding {e:?}"),
            ));
        }
        if self.action.needs_content() && self.content.is_none() {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("invalid operation: content is required for {}", self.action),
            ));
        }
        Ok(())
    }

    /// Decode `content` into the bytes to write.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` when there is no content and `Decode` when base64 is malformed.
    pub fn decode_content(&self) -> Result<Vec<u8>> {
        let Some(content) = self.content.as_deref() else {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                "invalid operation: no content",
            ));
        };
        match self.encoding() {
            Encoding::Utf8 => Ok(content.as_bytes().to_vec()),
            Encoding::Base64 => base64::engine::general_purpose::STANDARD
                .decode(content.trim())
                .map_err(|e| {
                    Error::new(
                        ErrorKind::Decode,
                        format!("invalid base64 content for {}: {e}", self.path),
                    )
                }),
            Encoding::Unsupported(e) => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("invalid operation: unsupported encoding {e:?}"),
            )),
        }
    }
}
