//! Transient notifications.

use serde::{Deserialize, Serialize};

/// Outcome a toast reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastStatus {
    Success,
    Error,
}

/// Screen corner a toast appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl ToastPosition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
        }
    }
}

/// An auto-dismissing notification.
///
/// Serializable so it can survive a redirect in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: Option<String>,
    pub status: ToastStatus,
    /// Milliseconds before the toast dismisses itself.
    pub duration_ms: u32,
    pub closable: bool,
    pub position: ToastPosition,
}

impl Toast {
    /// A short-lived success toast.
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: ToastStatus::Success,
            duration_ms: 3000,
            closable: true,
            position: ToastPosition::TopRight,
        }
    }

    /// An error toast that stays up long enough to read the description.
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            status: ToastStatus::Error,
            duration_ms: 9000,
            closable: true,
            position: ToastPosition::TopRight,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.status, ToastStatus::Error)
    }

    /// CSS modifier class for the status.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.status {
            ToastStatus::Success => "toast--success",
            ToastStatus::Error => "toast--error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_defaults() {
        let toast = Toast::success("Saved");
        assert_eq!(toast.duration_ms, 3000);
        assert!(toast.closable);
        assert_eq!(toast.position.as_str(), "top-right");
        assert!(!toast.is_error());
    }

    #[test]
    fn test_error_carries_description() {
        let toast = Toast::error("Failed", "network unreachable");
        assert_eq!(toast.description.as_deref(), Some("network unreachable"));
        assert_eq!(toast.duration_ms, 9000);
        assert_eq!(toast.css_class(), "toast--error");
    }
}
