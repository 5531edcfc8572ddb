//! Logging setup
//!
//! Core code logs through `tracing` on every target. Native installs a
//! `fmt` subscriber on stderr; the browser build forwards each event as one
//! line through [`LineLayer`] to `console.*`.

use std::fmt::Debug;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Install the stderr subscriber. `CARDANO_HOOK_LOG_JSON=1` switches to JSON lines.
#[cfg(feature = "native")]
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("CARDANO_HOOK_LOG_JSON")
        .map(|value| value == "1")
        .unwrap_or(false);

    if use_json {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Renders each event as `message key=value ...` and hands it to a writer.
pub struct LineLayer<W> {
    write: W,
}

impl<W> LineLayer<W>
where
    W: Fn(&Level, &str) + 'static,
{
    pub fn new(write: W) -> Self { Self { write } }
}

impl<S, W> Layer<S> for LineLayer<W>
where
    S: Subscriber,
    W: Fn(&Level, &str) + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut line = EventLine::default();
        event.record(&mut line);
        (self.write)(event.metadata().level(), &line.finish());
    }
}

#[derive(Default)]
struct EventLine {
    message: String,
    fields: Vec<String>,
}

impl EventLine {
    fn finish(self) -> String {
        let mut out = self.message;
        for field in self.fields {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&field);
        }
        out
    }
}

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}
