use log::{debug, info, warn};

/// Tags log lines with the subsystem that produced them.
pub struct LogManager {
    source: &'static str,
}

impl LogManager {
    pub fn new(source: &'static str) -> Self {
        Self { source }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.source, message);
    }

    pub fn anomaly(&self, message: &str) {
        warn!("[{}] {}", self.source, message);
    }

    pub fn trace(&self, message: &str) {
        debug!("[{}] {}", self.source, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("sections")
    }
}
