//! Tracing subscriber setup: severity-prefixed console formatter.

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// Console prefix for an event, keyed on level and logger target.
fn prefix(level: tracing::Level, target: &str) -> &'static str {
    match (level, target) {
        (tracing::Level::ERROR, "hansel::critical") => "\x1b[1;31m[CRITICAL]\x1b[0m",
        (tracing::Level::ERROR, _) => "\x1b[31m[ERROR]\x1b[0m",
        (tracing::Level::WARN, _) => "\x1b[33m[WARNING]\x1b[0m",
        (tracing::Level::INFO, "hansel::stage") => "\x1b[1;34m==>\x1b[0m",
        (tracing::Level::INFO, "hansel::dry_run") => "\x1b[36m[DRY RUN]\x1b[0m",
        (tracing::Level::INFO, _) => "[INFO]",
        (tracing::Level::DEBUG, _) => "\x1b[2m[DEBUG]\x1b[0m",
        _ => "\x1b[2m[TRACE]\x1b[0m",
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits Hansel-style
/// console output.
struct HanselFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for HanselFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);

        let prefix = prefix(*metadata.level(), metadata.target());
        if metadata.target() == "hansel::stage" {
            writeln!(writer, "{prefix} \x1b[1m{}\x1b[0m", extractor.message)
        } else {
            writeln!(writer, "{prefix} {}", extractor.message)
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Warnings and errors go to stderr, everything else to stdout. Debug events
/// are shown only when `verbose` is set; `RUST_LOG` overrides the level.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(HanselFormatter)
        .with_writer(make_writer)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}
