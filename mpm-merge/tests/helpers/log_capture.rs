//! Captures tracing messages emitted while a merge pass runs

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Formatted `message` field of every event seen
#[derive(Clone, Default)]
pub struct LogCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn assert_contains(&self, needle: &str) {
        let messages = self.messages();
        assert!(
            messages.iter().any(|m| m.contains(needle)),
            "no log line contains {needle:?}; captured:\n{}",
            messages.join("\n")
        );
    }

    pub fn assert_no_match(&self, needle: &str) {
        let hits: Vec<String> = self
            .messages()
            .into_iter()
            .filter(|m| m.contains(needle))
            .collect();
        assert!(hits.is_empty(), "unexpected log lines with {needle:?}:\n{}", hits.join("\n"));
    }
}

struct MessageField(String);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut field = MessageField(String::new());
        event.record(&mut field);
        self.messages.lock().unwrap().push(field.0);
    }
}

/// Capture logs emitted on this thread until the guard is dropped
///
/// Use with `#[tokio::test]`: its current-thread runtime polls the code
/// under test on the test thread.
pub fn capture_logs() -> (LogCapture, DefaultGuard) {
    let capture = LogCapture::default();
    let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));
    (capture, guard)
}
