//! Routes host interaction events to the screens they belong to.
//!
//! The router holds no state of its own beyond configuration. Each dispatch
//! round loads a registry snapshot, selects matching screens and runs their
//! hooks one after another. A failing hook is logged and recorded in the
//! [`DispatchReport`] while the remaining matches still run.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::HookError;
use crate::logging::{LogLevel, event_with_fields, json_kv};
use crate::registry::ScreenRegistry;
use crate::screen::{HookResult, ScreenDefinition};

pub mod click;
pub mod config;
pub mod events;

pub use click::{ClickKind, ClickModifiers};
pub use config::RouterConfig;
pub use events::{
    ClickEvent, EventCategory, EventPriority, HostEvent, InteractEvent, ItemClick, Subscription,
};

/// Why a dispatch round ended before looking at any screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyHandled,
    NoItem,
    NoViewer,
    NoScreens,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookFailure {
    pub screen: String,
    pub error: String,
}

/// Outcome of one dispatch round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub skipped: Option<SkipReason>,
    /// Names of the screens whose hooks ran, in registry order.
    pub matched: Vec<String>,
    pub failures: Vec<HookFailure>,
}

impl DispatchReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    pub fn invoked(&self) -> usize {
        self.matched.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct EventRouter {
    registry: ScreenRegistry,
    config: RouterConfig,
}

impl EventRouter {
    pub fn new(registry: ScreenRegistry) -> Self {
        Self::with_config(registry, RouterConfig::default())
    }

    pub fn with_config(registry: ScreenRegistry, config: RouterConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ScreenRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RouterConfig {
        &mut self.config
    }

    /// Subscriptions the host should install: last tier, skipping handled events.
    pub fn subscriptions() -> [Subscription; 2] {
        [EventCategory::Interact, EventCategory::Click].map(|category| Subscription {
            category,
            priority: EventPriority::Last,
            ignore_handled: true,
        })
    }

    /// Run `on_item_interact` on every screen the held item opens.
    pub fn on_interact(&self, event: &mut InteractEvent) -> DispatchReport {
        self.config.record(|metrics| metrics.record_interact());

        if event.is_handled() {
            return self.skip("interact", SkipReason::AlreadyHandled);
        }
        let held = match event.held_item.as_ref() {
            Some(item) if !item.is_empty() => item.clone(),
            _ => return self.skip("interact", SkipReason::NoItem),
        };
        let snapshot = self.registry.list();
        if snapshot.is_empty() {
            return self.skip("interact", SkipReason::NoScreens);
        }

        let viewer = event.player.clone();
        let mut report = DispatchReport::default();
        for screen in snapshot.iter().filter(|screen| screen.is_valid_opener(Some(&held))) {
            self.invoke(screen, &mut report, || screen.interact_hook(&viewer, &mut *event));
        }

        self.log_dispatch("interact", &report, [json_kv("viewer", json!(viewer))]);
        report
    }

    /// Run `on_item_click` on every screen that owns the clicked surface and slot.
    pub fn on_click(&self, event: &mut ClickEvent) -> DispatchReport {
        self.config.record(|metrics| metrics.record_click());

        if event.is_handled() {
            return self.skip("click", SkipReason::AlreadyHandled);
        }
        let item = match event.clicked_item.as_ref() {
            Some(item) if !item.is_empty() => item.clone(),
            _ => return self.skip("click", SkipReason::NoItem),
        };
        let Some(viewer) = event.clicker.clone() else {
            return self.skip("click", SkipReason::NoViewer);
        };
        let snapshot = self.registry.list();
        if snapshot.is_empty() {
            return self.skip("click", SkipReason::NoScreens);
        }

        let click = ItemClick {
            viewer,
            item,
            slot: event.slot,
            kind: event.click_kind(),
        };
        let title = event.surface_title.clone();
        let surface = event.surface;

        let mut report = DispatchReport::default();
        for screen in snapshot.iter() {
            match screen.owns_click(&title, surface, click.slot, &click.item) {
                Ok(true) => {
                    self.invoke(screen, &mut report, || screen.click_hook(&click, &mut *event));
                }
                Ok(false) => {}
                Err(err) => self.fail(screen, &mut report, err.to_string()),
            }
        }

        self.log_dispatch(
            "click",
            &report,
            [
                json_kv("viewer", json!(click.viewer)),
                json_kv("slot", json!(click.slot)),
                json_kv("kind", json!(click.kind)),
                json_kv("title", json!(title)),
            ],
        );
        report
    }

    fn invoke<F>(&self, screen: &ScreenDefinition, report: &mut DispatchReport, hook: F)
    where
        F: FnOnce() -> HookResult,
    {
        let outcome = if self.config.catch_panics {
            catch_unwind(AssertUnwindSafe(hook))
                .unwrap_or_else(|payload| Err(HookError::msg(panic_message(payload.as_ref()))))
        } else {
            hook()
        };

        report.matched.push(screen.name().to_string());
        let failed = outcome.is_err();
        self.config.record(|metrics| metrics.record_hook(failed));
        if let Err(err) = outcome {
            self.fail(screen, report, err.to_string());
        }
    }

    fn fail(&self, screen: &ScreenDefinition, report: &mut DispatchReport, error: String) {
        self.log(
            LogLevel::Warn,
            "hook_failed",
            [
                json_kv("screen", json!(screen.name())),
                json_kv("error", json!(error)),
            ],
        );
        report.failures.push(HookFailure {
            screen: screen.name().to_string(),
            error,
        });
    }

    fn skip(&self, category: &str, reason: SkipReason) -> DispatchReport {
        self.config.record(|metrics| metrics.record_skip());
        self.log(
            LogLevel::Trace,
            "dispatch_skipped",
            [
                json_kv("category", json!(category)),
                json_kv("reason", json!(reason)),
            ],
        );
        DispatchReport::skipped(reason)
    }

    fn log_dispatch<I>(&self, category: &str, report: &DispatchReport, extra: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let fields = [
            json_kv("category", json!(category)),
            json_kv("matched", json!(report.matched)),
            json_kv("failures", json!(report.failures.len())),
        ];
        self.log(LogLevel::Debug, "dispatch_completed", fields.into_iter().chain(extra));
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, &self.config.log_target, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("hook panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("hook panicked: {message}")
    } else {
        "hook panicked".to_string()
    }
}

#[cfg(test)]
mod tests;
