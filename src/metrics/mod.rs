use crate::logging::{LogEvent, LogFields, LogLevel};
use serde::Serialize;
use serde_json::Value;

/// Counters accumulated by the event router.
#[derive(Debug, Default, Clone)]
pub struct RouterMetrics {
    interact_events: u64,
    click_events: u64,
    skipped_events: u64,
    hooks_invoked: u64,
    hook_failures: u64,
}

impl RouterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_interact(&mut self) {
        self.interact_events = self.interact_events.saturating_add(1);
    }

    pub fn record_click(&mut self) {
        self.click_events = self.click_events.saturating_add(1);
    }

    pub fn record_skip(&mut self) {
        self.skipped_events = self.skipped_events.saturating_add(1);
    }

    pub fn record_hook(&mut self, failed: bool) {
        self.hooks_invoked = self.hooks_invoked.saturating_add(1);
        if failed {
            self.hook_failures = self.hook_failures.saturating_add(1);
        }
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            interact_events: self.interact_events,
            click_events: self.click_events,
            skipped_events: self.skipped_events,
            hooks_invoked: self.hooks_invoked,
            hook_failures: self.hook_failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot {
    pub interact_events: u64,
    pub click_events: u64,
    pub skipped_events: u64,
    pub hooks_invoked: u64,
    pub hook_failures: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => LogFields::new(),
        }
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        let mut event = LogEvent::new(LogLevel::Info, target, "router_metrics");
        event.fields = self.as_fields();
        event
    }
}
