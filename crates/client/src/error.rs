//! Error taxonomy with Sentry integration.
//!
//! Two layers:
//! - [`ApiError`] is what the transport and the query cache produce.
//! - [`ViewError`] is what a view shows: auth redirects, local validation
//!   failures, and transient operation failures. An empty result is not an
//!   error; see [`crate::views::ListState`].

use std::sync::Arc;

use thiserror::Error;

/// Errors from talking to the marketplace backend.
///
/// Cloneable so that one in-flight fetch can hand the same outcome to every
/// coalesced caller.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(Arc<reqwest::Error>),

    /// The backend answered 401: there is no session.
    #[error("Not authenticated")]
    Unauthorized,

    /// The backend answered with another non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Arc::new(err))
    }
}

impl ApiError {
    /// Whether this error means the session is gone.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// HTTP status, when the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message safe to show to a user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach the marketplace. Check your connection.".to_string(),
            Self::Unauthorized => "Please sign in to continue.".to_string(),
            Self::Status { status, message } if *status < 500 && !message.is_empty() => {
                message.clone()
            }
            Self::Status { .. } | Self::Parse(_) | Self::Url(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Errors surfaced by views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The session is gone; the route guard takes over. Not shown as a banner.
    #[error("Authentication required")]
    AuthRequired,

    /// A local form constraint failed; no request was sent.
    #[error("{0}")]
    ValidationFailed(String),

    /// The backend rejected the operation or could not be reached.
    #[error("{0}")]
    OperationFailed(String),
}

impl ViewError {
    /// Translate a backend error for display, reporting server faults.
    #[must_use]
    pub fn from_api(err: &ApiError) -> Self {
        if err.is_unauthorized() {
            return Self::AuthRequired;
        }

        if matches!(err, ApiError::Parse(_) | ApiError::Url(_))
            || err.status().is_some_and(|status| status >= 500)
        {
            let event_id = sentry::capture_error(err);
            tracing::error!(
                error = %err,
                sentry_event_id = %event_id,
                "Backend operation failed"
            );
        } else {
            tracing::warn!(error = %err, "Backend operation failed");
        }

        Self::OperationFailed(err.user_message())
    }

    /// The transient notice to show for this error, if any.
    ///
    /// `AuthRequired` produces none: the guard redirects instead.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::AuthRequired => None,
            Self::ValidationFailed(message) => Some(Notice::warning(message.clone())),
            Self::OperationFailed(message) => Some(Notice::error(message.clone())),
        }
    }
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A transient user-visible notification (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
