//! Bridge from `tracing` events into a [`Logger`].

use std::sync::Arc;

use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::facade::Logger;
use crate::options::LogLevel;

/// A `tracing_subscriber` layer that writes every event through a [`Logger`].
///
/// Each event becomes a record with `level`, `target` and `msg` followed by
/// the event's own fields. Because the logger is shared, [`Logger::update`]
/// reconfigures the output of every instrumented crate at once.
///
/// ```no_run
/// use std::sync::Arc;
/// use flow_logging::{FacadeLayer, LogOptions, Logger};
/// use tracing_subscriber::layer::SubscriberExt;
/// use tracing_subscriber::util::SubscriberInitExt;
///
/// let logger = Arc::new(Logger::new(std::io::stderr(), LogOptions::default())?);
/// tracing_subscriber::registry()
///     .with(FacadeLayer::new(Arc::clone(&logger)))
///     .init();
/// # Ok::<(), flow_logging::LoggingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FacadeLayer {
    logger: Arc<Logger>,
}

impl FacadeLayer {
    #[must_use]
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for FacadeLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        let mut record: Vec<(&str, Value)> = Vec::with_capacity(visitor.fields.len() + 3);
        record.push((
            crate::LEVEL_KEY,
            Value::from(LogLevel::from_tracing(*meta.level()).as_str()),
        ));
        record.push(("target", Value::from(meta.target())));
        if let Some(msg) = visitor.message {
            record.push(("msg", Value::String(msg)));
        }
        record.extend(visitor.fields);

        if let Err(e) = self.logger.log(&record) {
            // The sink itself failed; stderr is the last resort.
            eprintln!("flow_logging: dropped event: {e}");
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<(&'static str, Value)>,
}

impl FieldCollector {
    fn push(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.push((field.name(), value));
        }
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::String(value.to_string()));
    }

    #[allow(clippy::use_debug)]
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, Value::String(format!("{value:?}")));
    }
}
