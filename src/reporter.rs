//! Progress reporting for long-running operations
//!
//! The composition engine announces what it is doing through a [`Reporter`]
//! instead of printing. [`LogReporter`] forwards every event to the `log`
//! facade, so the binary decides verbosity through `env_logger`.

/// Sink for engine progress events
pub trait Reporter {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn debug(&self, message: &str);
}

/// Forwards events to the `log` crate under the `coretree` target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, message: &str) {
        log::info!(target: "coretree", "{}", message);
    }

    fn warn(&self, message: &str) {
        log::warn!(target: "coretree", "{}", message);
    }

    fn debug(&self, message: &str) {
        log::debug!(target: "coretree", "{}", message);
    }
}

/// Keeps every event in memory
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingReporter {
    events: std::rc::Rc<std::cell::RefCell<Vec<(log::Level, String)>>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<(log::Level, String)> {
        self.events.borrow().clone()
    }

    fn record(&self, level: log::Level, message: &str) {
        self.events.borrow_mut().push((level, message.to_string()));
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.record(log::Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(log::Level::Warn, message);
    }

    fn debug(&self, message: &str) {
        self.record(log::Level::Debug, message);
    }
}
