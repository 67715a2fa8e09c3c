use std::sync::{Arc, Mutex};

use crate::logging::Logger;
use crate::metrics::RouterMetrics;

/// Configuration knobs for the event router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Optional structured logger used for dispatch and hook failures.
    pub logger: Option<Logger>,
    /// Counters shared with the host, if enabled.
    pub metrics: Option<Arc<Mutex<RouterMetrics>>>,
    /// Target field stamped on router log events.
    pub log_target: String,
    /// Convert hook panics into recorded failures instead of unwinding into the host.
    pub catch_panics: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            log_target: "grid_screens::router".to_string(),
            catch_panics: true,
        }
    }
}

impl RouterConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(RouterMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<RouterMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    pub(crate) fn record<F>(&self, update: F)
    where
        F: FnOnce(&mut RouterMetrics),
    {
        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut *guard);
            }
        }
    }
}
