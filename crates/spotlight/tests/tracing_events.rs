//! Structured log output of a tour.
//!
//! Captures every event and span through a registry layer and checks the
//! lifecycle messages, their order, their levels, and their fields.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use spotlight::{ShapeKind, Spotlight, Step, TargetRef};
use spotlight_core::Rect;
use spotlight_harness::{FakeElement, FakeList, RecordingCanvas, RecordingListener, TestHost};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Tracing capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct Captured {
    spans: Vec<String>,
    events: Vec<CapturedEvent>,
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Captured>>);

impl Capture {
    fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().unwrap().events.clone()
    }

    fn spans(&self) -> Vec<String> {
        self.0.lock().unwrap().spans.clone()
    }

    /// Messages from the engine, in emission order.
    fn messages(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|event| event.message().to_owned())
            .filter(|message| message.starts_with("spotlight."))
            .collect()
    }

    fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|event| event.message() == message)
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.0
            .lock()
            .unwrap()
            .spans
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().events.push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<R>(f: impl FnOnce() -> R) -> (R, Capture) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}

// ============================================================================
// Tests
// ============================================================================

fn element_step(title: &str) -> Step {
    Step::new(
        TargetRef::element(FakeElement::new(Rect::new(100.0, 400.0, 200.0, 100.0))),
        title,
        "",
        ShapeKind::Rectangle,
    )
}

#[test]
fn lifecycle_messages_in_order() {
    let (_, capture) = with_captured_tracing(|| {
        let host = TestHost::new();
        let tour = Spotlight::builder(host.host())
            .add_step(element_step("only"))
            .build()
            .unwrap();
        tour.start();
        host.advance_ms(100);
        tour.tap();
        host.advance_ms(300);
    });

    assert_eq!(
        capture.messages(),
        vec![
            "spotlight.start",
            "spotlight.step.resolving",
            "spotlight.step.shown",
            "spotlight.card.placed",
            "spotlight.step.leaving",
            "spotlight.step.dismissed",
            "spotlight.finished",
        ]
    );

    let start = capture.find("spotlight.start").unwrap();
    assert_eq!(start.level, tracing::Level::INFO);
    assert_eq!(start.field("steps"), Some("1"));

    let shown = capture.find("spotlight.step.shown").unwrap();
    assert_eq!(shown.level, tracing::Level::DEBUG);
    assert_eq!(shown.field("index"), Some("0"));
    assert_eq!(shown.field("y"), Some("400"));

    let placed = capture.find("spotlight.card.placed").unwrap();
    assert_eq!(placed.field("side"), Some("Below"));

    let finished = capture.find("spotlight.finished").unwrap();
    assert_eq!(finished.level, tracing::Level::INFO);
}

#[test]
fn list_timeout_is_a_warning() {
    let (events, capture) = with_captured_tracing(|| {
        let host = TestHost::new();
        let events = RecordingListener::new();
        let tour = Spotlight::builder(host.host())
            .add_step(Step::new(
                TargetRef::list_item(FakeList::new(), 6),
                "row",
                "",
                ShapeKind::Rectangle,
            ))
            .listener(Rc::clone(&events))
            .build()
            .unwrap();
        tour.start();
        host.advance_ms(2_000);
        events
    });

    let timeout = capture.find("spotlight.resolve.timeout").unwrap();
    assert_eq!(timeout.level, tracing::Level::WARN);
    assert_eq!(timeout.field("index"), Some("6"));
    assert_eq!(timeout.field("waited_ms"), Some("2000"));

    let unavailable = capture.find("spotlight.step.unavailable").unwrap();
    assert_eq!(unavailable.level, tracing::Level::WARN);
    assert_eq!(
        unavailable.field("error"),
        Some("target list item #6 unavailable after 2000ms")
    );

    assert_eq!(
        capture.messages().last().map(String::as_str),
        Some("spotlight.finished")
    );
    assert_eq!(events.events(), vec![spotlight_harness::ListenerEvent::Finished]);
}

#[test]
fn ignored_triggers_are_reported() {
    let (_, capture) = with_captured_tracing(|| {
        let host = TestHost::new();
        let tour = Spotlight::builder(host.host())
            .add_step(element_step("a"))
            .build()
            .unwrap();
        tour.dismiss();
        tour.start();
        tour.start();
    });

    let ignored_dismiss = capture.find("spotlight.dismiss.ignored").unwrap();
    assert_eq!(ignored_dismiss.level, tracing::Level::DEBUG);
    assert_eq!(ignored_dismiss.field("phase"), Some("Idle"));

    let ignored_start = capture.find("spotlight.start.ignored").unwrap();
    assert_eq!(ignored_start.level, tracing::Level::WARN);
}

#[test]
fn blur_fallback_and_render_span() {
    let (_, capture) = with_captured_tracing(|| {
        let host = TestHost::new();
        let tour = Spotlight::builder(host.host())
            .add_step(element_step("blurred"))
            .use_blur_overlay(true)
            .build()
            .unwrap();
        tour.start();
        host.advance_ms(50);
        let mut canvas = RecordingCanvas::new();
        host.surface.render(&mut canvas);
    });

    let fallback = capture.find("spotlight.blur.unsupported").unwrap();
    assert_eq!(
        fallback.field("error"),
        Some("blur overlays are not supported by this host")
    );
    assert!(capture.spans().iter().any(|name| name == "spotlight.render"));
}
