//! Routing `tracing` events into a [`Logger`]
//!
//! Libraries instrumented with `tracing` macros end up in the same sink as
//! facade calls, carrying the logger's sticky fields.

use std::fmt;

use anyhow::{Context as _, Result};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use super::field::{FieldValue, Fields};
use super::level::Level;
use super::logger::Logger;

/// Layer forwarding every `tracing` event to a logger's shared handle
pub struct FacadeLayer {
    logger: Logger,
}

impl FacadeLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S: Subscriber> Layer<S> for FacadeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = Level::from(*event.metadata().level());
        let entry = self.logger.get_logger();
        if !entry.enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        if visitor.fields.is_empty() {
            entry.log(level, visitor.message);
        } else {
            entry.with_fields(visitor.fields).log(level, visitor.message);
        }
    }
}

/// Collects the `message` field and the remaining event fields
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Fields,
}

impl EventVisitor {
    fn insert(&mut self, field: &Field, value: FieldValue) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.insert(field, FieldValue::Str(format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.insert(field, value.into());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }
}

/// Install a global `tracing` subscriber that feeds `logger`.
///
/// `directives` uses `EnvFilter` syntax (e.g. `"info,hyper=warn"`); the
/// process environment is not consulted. Fails if a global subscriber is
/// already installed.
pub fn install_tracing_bridge(logger: &Logger, directives: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid tracing filter {:?}", directives))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(FacadeLayer::new(logger.clone()))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
