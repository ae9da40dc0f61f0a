//! Render session: one template reference plus one schema, rendered over IPC.
//!
//! The session owns its schema and its most recent result. `render()` never
//! returns an error: failures are stored and surface through `has_error()`
//! and `error()`, and the rendered content is then empty.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use neutral_ipc_client::{IpcConfig, RenderSession};
//! use serde_json::json;
//!
//! let config = Arc::new(IpcConfig::resolve());
//! let schema = json!({"data": {"hello": "Hello World"}});
//! let mut session = RenderSession::from_file_value(config, "/srv/tpl/index.ntpl", schema)?;
//!
//! let contents = session.render().await;
//! if !session.has_error() {
//!     println!("{}", contents);
//! }
//! ```

mod result;
mod schema;
mod template_ref;

pub use result::{InnerResult, RenderResult};
pub use schema::{deep_merge, Schema, SchemaPayload};
pub use template_ref::TemplateRef;

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::IpcConfig;
use crate::error::{IpcError, Result};
use crate::protocol::{control, Record};
use crate::transport::IpcClient;

/// Outcome of the latest render (or failed merge).
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    /// Nothing rendered yet.
    Pending,
    /// The service answered.
    Rendered(RenderResult),
    /// Transport, framing or schema failure.
    Failed(String),
}

/// Stateful façade over one template and one schema.
#[derive(Debug)]
pub struct RenderSession {
    client: IpcClient,
    template: TemplateRef,
    schema: Schema,
    state: RenderState,
}

impl RenderSession {
    /// Create a session from its parts.
    pub fn new(config: Arc<IpcConfig>, template: TemplateRef, schema: Schema) -> Self {
        Self {
            client: IpcClient::new(config),
            template,
            schema,
            state: RenderState::Pending,
        }
    }

    /// Template file on the service side, JSON schema.
    pub fn from_file_value(
        config: Arc<IpcConfig>,
        path: impl Into<String>,
        schema: Value,
    ) -> Result<Self> {
        Ok(Self::new(config, TemplateRef::path(path), Schema::json(&schema)?))
    }

    /// Inline template source, JSON schema.
    pub fn from_src_value(
        config: Arc<IpcConfig>,
        source: impl Into<String>,
        schema: Value,
    ) -> Result<Self> {
        Ok(Self::new(config, TemplateRef::source(source), Schema::json(&schema)?))
    }

    /// Render the template and return the output.
    ///
    /// Returns an empty string when the exchange fails; check `has_error()`.
    pub async fn render(&mut self) -> String {
        match self.exchange().await {
            Ok(result) => {
                if result.has_error() {
                    debug!(
                        "Render of {} reported an error (control={}, status={:?})",
                        self.template,
                        result.status,
                        result.status_code()
                    );
                }
                let content = result.content.clone();
                self.state = RenderState::Rendered(result);
                content
            }
            Err(e) => {
                warn!("Render of {} failed: {}", self.template, e);
                self.state = RenderState::Failed(e.to_string());
                String::new()
            }
        }
    }

    async fn exchange(&self) -> Result<RenderResult> {
        let request = Record::new(
            control::PARSE_TEMPLATE,
            self.schema.format(),
            self.schema.wire_bytes(),
            self.template.format(),
            self.template.as_str(),
        )?;
        let response = self.client.exchange(&request).await?;
        Ok(RenderResult::from_record(response))
    }

    /// Render a template file next time.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.template = TemplateRef::path(path);
    }

    /// Render inline source next time.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.template = TemplateRef::source(source);
    }

    pub fn set_template(&mut self, template: TemplateRef) {
        self.template = template;
    }

    /// Deep-merge `schema` into the current JSON schema.
    ///
    /// Returns `false` when nothing was merged: non-JSON schemas are
    /// refused outright, and a parse failure on either side stores an error
    /// result while leaving the schema as it was.
    pub fn merge_schema(&mut self, schema: Value) -> bool {
        if self.refuses_merge() {
            return false;
        }
        match self.schema.merge(schema) {
            Ok(merged) => merged,
            Err(e) => self.merge_failed(e),
        }
    }

    /// Like [`merge_schema`](Self::merge_schema), for pre-serialized JSON.
    pub fn merge_schema_str(&mut self, schema: &str) -> bool {
        if self.refuses_merge() {
            return false;
        }
        match serde_json::from_str(schema) {
            Ok(value) => self.merge_schema(value),
            Err(e) => self.merge_failed(e.into()),
        }
    }

    fn refuses_merge(&self) -> bool {
        if self.schema.is_mergeable() {
            return false;
        }
        warn!("Refusing to merge into a non-JSON schema (format {})", self.schema.format());
        true
    }

    fn merge_failed(&mut self, e: IpcError) -> bool {
        warn!("Schema merge failed: {}", e);
        self.state = RenderState::Failed(e.to_string());
        false
    }

    pub fn template(&self) -> &TemplateRef {
        &self.template
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Latest result, if the last render reached the service.
    pub fn render_result(&self) -> Option<&RenderResult> {
        match &self.state {
            RenderState::Rendered(result) => Some(result),
            _ => None,
        }
    }

    /// Stored error marker, if the last operation failed locally.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RenderState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// True unless the last render succeeded with an OK control byte and no
    /// error flag from the service.
    pub fn has_error(&self) -> bool {
        self.render_result().map_or(true, RenderResult::has_error)
    }

    pub fn status_code(&self) -> Option<u16> {
        self.render_result()?.status_code()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.render_result()?.status_text()
    }

    pub fn status_param(&self) -> Option<&str> {
        self.render_result()?.status_param()
    }

    /// Parsed inner result object.
    pub fn result(&self) -> Option<&Map<String, Value>> {
        self.render_result()?.inner.as_object()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::format;
    use serde_json::json;

    fn session(schema: Schema) -> RenderSession {
        RenderSession::new(Arc::new(IpcConfig::default()), TemplateRef::path("/t.ntpl"), schema)
    }

    #[test]
    fn test_accessors_before_render() {
        let s = session(Schema::json_str("{}"));

        assert_eq!(s.state(), &RenderState::Pending);
        assert!(s.has_error());
        assert_eq!(s.status_code(), None);
        assert_eq!(s.status_text(), None);
        assert_eq!(s.status_param(), None);
        assert!(s.result().is_none());
        assert!(s.error().is_none());
    }

    #[test]
    fn test_template_setters_switch_format() {
        let mut s = session(Schema::json_str("{}"));
        assert_eq!(s.template().format(), format::PATH);

        s.set_source("{:;hello:}");
        assert_eq!(s.template(), &TemplateRef::source("{:;hello:}"));
        assert_eq!(s.template().format(), format::TEXT);

        s.set_path("/other.ntpl");
        assert_eq!(s.template().format(), format::PATH);
    }

    #[test]
    fn test_constructors() {
        let config = Arc::new(IpcConfig::default());
        let s = RenderSession::from_src_value(config.clone(), "{:;a:}", json!({"data": {"a": 1}})).unwrap();
        assert_eq!(s.template().format(), format::TEXT);
        assert_eq!(s.schema().format(), format::JSON);

        let s = RenderSession::from_file_value(config, "/x.ntpl", json!({})).unwrap();
        assert_eq!(s.template(), &TemplateRef::path("/x.ntpl"));
    }

    #[test]
    fn test_merge_schema() {
        let mut s = session(Schema::json(&json!({"data": {"a": 1}})).unwrap());

        assert!(s.merge_schema(json!({"data": {"b": 2}})));
        assert_eq!(
            Value::Object(s.schema().to_json_object().unwrap()),
            json!({"data": {"a": 1, "b": 2}})
        );
        assert!(s.error().is_none());
    }

    #[test]
    fn test_merge_schema_str() {
        let mut s = session(Schema::json_str(r#"{"a":{"x":1}}"#));

        assert!(s.merge_schema_str(r#"{"a":{"y":2}}"#));
        assert_eq!(
            Value::Object(s.schema().to_json_object().unwrap()),
            json!({"a": {"x": 1, "y": 2}})
        );
    }

    #[test]
    fn test_merge_refused_for_msgpack() {
        let schema = Schema::msgpack(&json!({"a": 1})).unwrap();
        let mut s = session(schema.clone());

        assert!(!s.merge_schema(json!({"b": 2})));
        assert!(!s.merge_schema_str("not even json"));
        assert_eq!(s.schema(), &schema);
        assert_eq!(s.state(), &RenderState::Pending);
    }

    #[test]
    fn test_merge_refused_for_absent_binary_schema() {
        let mut s = session(Schema::absent(format::BIN));

        assert!(!s.merge_schema(json!({"data": {"a": 1}})));
        assert_eq!(s.schema(), &Schema::absent(format::BIN));
        assert!(s.schema().wire_bytes().is_empty());
        assert_eq!(s.state(), &RenderState::Pending);
    }

    #[test]
    fn test_merge_parse_failure_stores_error() {
        let mut s = session(Schema::json_str(r#"{"a":1}"#));

        assert!(!s.merge_schema_str("{broken"));
        assert!(s.error().is_some());
        assert!(s.has_error());
        assert_eq!(s.schema().wire_bytes(), br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_render_failure_returns_empty_content() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = Arc::new(IpcConfig {
            port,
            ..IpcConfig::default()
        });
        let mut s = RenderSession::from_file_value(config, "/t.ntpl", json!({})).unwrap();

        assert_eq!(s.render().await, "");
        assert!(s.has_error());
        assert!(s.error().is_some());
        assert!(s.render_result().is_none());
    }
}
