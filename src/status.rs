//! Status interpretation for HTTP-facing callers.
//!
//! The rendering service reports an HTTP-style status code in the inner
//! result. [`StatusAction::classify`] maps it onto what the caller should do,
//! and [`respond`] runs the whole render → classify → (re-render) sequence.
//!
//! | code      | action                                          |
//! |-----------|-------------------------------------------------|
//! | < 300     | send the rendered content                       |
//! | 300..=399 | redirect to the status parameter                |
//! | >= 400    | re-render the error template, keep the code     |

use serde_json::{json, Value};
use tracing::{debug, error};

use crate::session::{RenderSession, TemplateRef};

/// Status used when the service reported nothing usable.
pub const DEFAULT_STATUS: u16 = 200;

/// Status used when the service reported an error without a code.
pub const UNSPECIFIED_ERROR_STATUS: u16 = 500;

/// Status used when the service could not be reached at all.
pub const UNREACHABLE_STATUS: u16 = 502;

/// What the caller should do with a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusAction {
    /// Emit the rendered content.
    Content,
    /// Redirect instead of emitting a body.
    Redirect { location: String },
    /// Render the error template instead.
    Error,
}

impl StatusAction {
    pub fn classify(code: u16, param: Option<&str>) -> Self {
        match code {
            300..=399 => Self::Redirect {
                location: param.unwrap_or_default().to_string(),
            },
            400..=u16::MAX => Self::Error,
            _ => Self::Content,
        }
    }
}

/// Response shape handed to an HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResponse {
    pub status: u16,
    pub body: String,
    /// Set for redirects only.
    pub location: Option<String>,
}

impl RenderResponse {
    pub fn content(status: u16, body: String) -> Self {
        Self {
            status,
            body,
            location: None,
        }
    }

    pub fn redirect(status: u16, location: String) -> Self {
        Self {
            status,
            body: String::new(),
            location: Some(location),
        }
    }

    #[inline]
    pub fn is_redirect(&self) -> bool {
        self.location.is_some()
    }
}

/// Schema fragment merged in before rendering the error template.
pub fn error_context(code: u16, text: Option<&str>, param: Option<&str>) -> Value {
    json!({
        "data": {
            "CONTEXT": {
                "ROUTE": "error"
            },
            "error": {
                "code": code,
                "text": text.unwrap_or_default(),
                "param": param.unwrap_or_default()
            }
        }
    })
}

/// Render `session` and turn the outcome into a [`RenderResponse`].
///
/// On an error status the session is re-targeted at `error_template`, the
/// error context is merged into its schema, and the second render becomes the
/// body while the original status code is kept.
pub async fn respond(session: &mut RenderSession, error_template: &TemplateRef) -> RenderResponse {
    let content = session.render().await;

    if let Some(e) = session.error() {
        error!("Rendering service unavailable: {}", e);
        return RenderResponse::content(UNREACHABLE_STATUS, String::new());
    }

    let code = session.status_code().unwrap_or(if session.has_error() {
        UNSPECIFIED_ERROR_STATUS
    } else {
        DEFAULT_STATUS
    });

    match StatusAction::classify(code, session.status_param()) {
        StatusAction::Content => RenderResponse::content(code, content),
        StatusAction::Redirect { location } => {
            debug!("Template requested redirect {} to {}", code, location);
            RenderResponse::redirect(code, location)
        }
        StatusAction::Error => {
            let context = error_context(code, session.status_text(), session.status_param());
            debug!("Template reported {}, rendering {}", code, error_template);

            session.set_template(error_template.clone());
            session.merge_schema(context);
            let body = session.render().await;
            if let Some(e) = session.error() {
                error!("Error page {} could not be rendered: {}", error_template, e);
            }
            RenderResponse::content(code, body)
        }
    }
}
