use std::sync::{Arc, Mutex};

use super::{LogEvent, LogLevel, LogSink, LoggingResult};

#[derive(Clone, Default)]
pub(crate) struct CaptureSink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl CaptureSink {
    pub(crate) fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.message).collect()
    }

    pub(crate) fn at_level(&self, level: LogLevel) -> Vec<LogEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }
}

impl LogSink for CaptureSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
