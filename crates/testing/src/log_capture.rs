//! In-memory capture of tracing events.
//!
//! [`LogCapture`] is a [`Layer`] that records every event together with the
//! fields of the spans it was emitted in, so tests can assert on log lines,
//! levels, targets and correlation fields.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

/// One captured event
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Event fields other than the message
    pub fields: BTreeMap<String, String>,
    /// Fields of every enclosing span, outermost first
    pub span_fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn span_field(&self, name: &str) -> Option<&str> {
        self.span_fields.get(name).map(String::as_str)
    }

    /// JSON payload following the first `": "` of the message, if any
    pub fn json_payload(&self) -> Option<serde_json::Value> {
        let (_, payload) = self.message.split_once(": ")?;
        serde_json::from_str(payload).ok()
    }
}

/// Tracing layer recording events in memory
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<RwLock<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install this layer as the thread's default subscriber
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(Registry::default().with(self.clone()))
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .map(|event| event.message.clone())
            .collect()
    }

    /// First event whose message contains `text`
    pub fn find(&self, text: &str) -> Option<CapturedEvent> {
        self.events
            .read()
            .iter()
            .find(|event| event.message.contains(text))
            .cloned()
    }

    pub fn contains_message(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    pub fn events_at(&self, level: Level) -> Vec<CapturedEvent> {
        self.filtered(|event| event.level == level)
    }

    pub fn events_for_target(&self, target: &str) -> Vec<CapturedEvent> {
        self.filtered(|event| event.target == target)
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }

    fn filtered(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> Vec<CapturedEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| predicate(event))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for LogCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCapture")
            .field("events", &self.event_count())
            .finish()
    }
}

/// Create a capture and install it for the current thread
pub fn capture_logs() -> (LogCapture, DefaultGuard) {
    let capture = LogCapture::new();
    let guard = capture.install();
    (capture, guard)
}

/// Span fields stored in the registry's span extensions
struct SpanFields(BTreeMap<String, String>);

struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

impl<S> Layer<S> for LogCapture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(SpanFields(fields));
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut extensions = span.extensions_mut();
            if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
                values.record(&mut FieldVisitor(fields));
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        let message = fields.remove("message").unwrap_or_default();

        let mut span_fields = BTreeMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                    span_fields.extend(fields.clone());
                }
            }
        }

        let metadata = event.metadata();
        self.events.write().push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message,
            fields,
            span_fields,
        });
    }
}
