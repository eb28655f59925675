//! Advisory progress events emitted while a region moves through the pipeline.
//!
//! Sinks are fire-and-forget observers: nothing they do can change a result.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Pipeline stage an event refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Processing,
    Histogram,
    Otsu,
    Edges,
    Circles,
    Resolved,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Processing => "processing",
            Stage::Histogram => "histogram",
            Stage::Otsu => "otsu",
            Stage::Edges => "edges",
            Stage::Circles => "circles",
            Stage::Resolved => "resolved",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    /// Position of the region in the caller's ROI list.
    pub roi_index: usize,
    pub stage: Stage,
    pub message: String,
}

/// Receiver of [`StageEvent`]s.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &StageEvent);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &StageEvent) {
        (**self).emit(event);
    }
}

/// Both sinks receive every event, `.0` first.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&self, event: &StageEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &StageEvent) {}
}

/// Forwards events to the `log` facade (`resolved` at info, the rest at debug).
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &StageEvent) {
        let level = match event.stage {
            Stage::Resolved => log::Level::Info,
            _ => log::Level::Debug,
        };
        log::log!(
            level,
            "roi {} [{}] {}",
            event.roi_index,
            event.stage.as_str(),
            event.message
        );
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<StageEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn events(&self) -> Vec<StageEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<StageEvent> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &StageEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
