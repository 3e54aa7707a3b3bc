//! Diagnostic output on stderr.
//!
//! Events render as `[LEVEL] Action: Message`. The action comes from an
//! `action` field, and an `INFO` event with `success = true` is shown as
//! `SUCCESS`. stdout stays free for the JSON result.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

// chromiumoxide logs every CDP message it cannot decode
const DEFAULT_FILTER: &str = "info,chromiumoxide=off";

/// Install the stderr subscriber. `RUST_LOG` overrides the default filter.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .event_format(ActionFormat),
        )
        .init();
}

/// Event formatter producing `[LEVEL] Action: Message` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionFormat;

#[derive(Default)]
struct ActionVisitor {
    action: Option<String>,
    message: String,
    success: bool,
    extra: Vec<(&'static str, String)>,
}

impl Visit for ActionVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "action" => self.action = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.extra.push((name, value.to_string())),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "success" => self.success = value,
            name => self.extra.push((name, value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "action" => self.action = Some(format!("{value:?}")),
            "message" => self.message = format!("{value:?}"),
            name => self.extra.push((name, format!("{value:?}"))),
        }
    }
}

fn level_label(level: Level, success: bool) -> &'static str {
    match level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO if success => "SUCCESS",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        _ => "TRACE",
    }
}

impl<S, N> FormatEvent<S, N> for ActionFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = ActionVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let label = level_label(*meta.level(), visitor.success);
        let action = visitor.action.as_deref().unwrap_or_else(|| meta.target());
        write!(writer, "[{label}] {action}: {}", visitor.message)?;
        for (name, value) in &visitor.extra {
            write!(writer, " {name}={value}")?;
        }
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(emit: impl FnOnce()) -> String {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(out.clone())
            .with_ansi(false)
            .with_max_level(Level::DEBUG)
            .event_format(ActionFormat)
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_line_shape() {
        let out = capture(|| {
            tracing::info!(action = "Strategy 1", "Checking homepage for forms");
            tracing::warn!(action = "Form Incomplete", "Email: {}, Message: {}", true, false);
            tracing::info!(action = "Email Found", success = true, "info@x.com");
            tracing::error!(action = "Processing Error", "boom");
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[INFO] Strategy 1: Checking homepage for forms",
                "[WARNING] Form Incomplete: Email: true, Message: false",
                "[SUCCESS] Email Found: info@x.com",
                "[ERROR] Processing Error: boom",
            ]
        );
    }

    #[test]
    fn test_extra_fields_appended() {
        let out = capture(|| tracing::info!(action = "Homepage Forms", count = 2, "Found forms"));
        assert_eq!(out.trim_end(), "[INFO] Homepage Forms: Found forms count=2");
    }
}
