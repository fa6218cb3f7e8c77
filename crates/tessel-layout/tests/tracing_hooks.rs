//! Structured logging emitted by the solver.
//!
//! Run with: `cargo test -p tessel-layout --features tracing --test tracing_hooks`

#![cfg(feature = "tracing")]

use std::sync::{Arc, Mutex};
use tessel_layout::{Constraint, Layout, Rect};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Default)]
struct SplitTraceState {
    split_spans: usize,
    saw_constraint_count: bool,
    over_constrained_events: usize,
    last_overflow: Option<u64>,
}

struct SplitTraceCapture {
    state: Arc<Mutex<SplitTraceState>>,
}

impl<S> Layer<S> for SplitTraceCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        if attrs.metadata().name() != "layout.split" {
            return;
        }
        struct V {
            constraints: Option<u64>,
        }
        impl tracing::field::Visit for V {
            fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
                if field.name() == "constraints" {
                    self.constraints = Some(value);
                }
            }

            fn record_debug(
                &mut self,
                _field: &tracing::field::Field,
                _value: &dyn std::fmt::Debug,
            ) {
            }
        }
        let mut v = V { constraints: None };
        attrs.record(&mut v);

        let mut state = self.state.lock().expect("split trace lock");
        state.split_spans += 1;
        if v.constraints.is_some() {
            state.saw_constraint_count = true;
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Fields {
            message: Option<String>,
            overflow: Option<u64>,
        }
        impl tracing::field::Visit for Fields {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_string());
                }
            }

            fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
                if field.name() == "overflow" {
                    self.overflow = Some(value);
                }
            }

            fn record_debug(
                &mut self,
                field: &tracing::field::Field,
                value: &dyn std::fmt::Debug,
            ) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                }
            }
        }
        let mut fields = Fields {
            message: None,
            overflow: None,
        };
        event.record(&mut fields);

        if fields.message.as_deref() == Some("layout.over_constrained") {
            let mut state = self.state.lock().expect("split trace lock");
            state.over_constrained_events += 1;
            state.last_overflow = fields.overflow;
        }
    }
}

fn capture() -> (Arc<Mutex<SplitTraceState>>, tracing::subscriber::DefaultGuard) {
    let state = Arc::new(Mutex::new(SplitTraceState::default()));
    let subscriber = tracing_subscriber::registry().with(SplitTraceCapture {
        state: Arc::clone(&state),
    });
    let guard = tracing::subscriber::set_default(subscriber);
    (state, guard)
}

#[test]
fn split_opens_a_debug_span() {
    let (state, _guard) = capture();

    let layout = Layout::horizontal([Constraint::Length(10), Constraint::Fill(1)]);
    layout.split(Rect::from_size(40, 5)).unwrap();
    layout.split(Rect::from_size(60, 5)).unwrap();

    let snapshot = state.lock().expect("split trace lock");
    assert_eq!(
        snapshot.split_spans, 2,
        "expected one layout.split span per call"
    );
    assert!(snapshot.saw_constraint_count, "expected constraints field");
    assert_eq!(snapshot.over_constrained_events, 0);
}

#[test]
fn over_constrained_layout_emits_warning() {
    let (state, _guard) = capture();

    let layout = Layout::horizontal([
        Constraint::Length(80),
        Constraint::Length(80),
        Constraint::Fill(3),
    ]);
    let rects = layout.split(Rect::from_size(100, 10)).unwrap();
    assert_eq!(rects[2].width, 0);

    let snapshot = state.lock().expect("split trace lock");
    assert_eq!(snapshot.over_constrained_events, 1);
    assert_eq!(snapshot.last_overflow, Some(60));
}

#[test]
fn fitting_layout_emits_no_warning() {
    let (state, _guard) = capture();

    Layout::vertical([Constraint::Percentage(50.0), Constraint::Percentage(50.0)])
        .split(Rect::from_size(10, 10))
        .unwrap();

    let snapshot = state.lock().expect("split trace lock");
    assert_eq!(snapshot.over_constrained_events, 0);
}
