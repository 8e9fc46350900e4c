//! Error types for UI building.

use std::fmt;

/// An error that aborted a UI build.
#[derive(Debug, Clone)]
pub struct BuildError {
    pub message: String,
    /// 1-based source line, 0 when the error has no position.
    pub line: usize,
    pub col: usize,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    ParseError,
    UnknownWidget,
    HostError,
    ConfigError,
}

impl BuildError {
    pub fn parse(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            line,
            col,
            kind: ErrorKind::ParseError,
        }
    }

    pub fn unknown_widget(widget_type: &str) -> Self {
        Self {
            message: format!("unexpected widget type: {widget_type}"),
            line: 0,
            col: 0,
            kind: ErrorKind::UnknownWidget,
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            col: 0,
            kind: ErrorKind::HostError,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            col: 0,
            kind: ErrorKind::ConfigError,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "[{}:{}] {:?}: {}",
                self.line, self.col, self.kind, self.message
            )
        } else {
            write!(f, "{:?}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for BuildError {}

impl From<serde_json::Error> for BuildError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(e.to_string(), e.line(), e.column())
    }
}
