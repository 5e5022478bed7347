use log::{info, warn};

/// Receives the human readable progress of a migration run, one line at a
/// time.
pub trait ProgressSink: Send + Sync {
    fn write_line(&self, line: &str);

    fn write_warning(&self, line: &str) {
        self.write_line(line);
    }
}

/// Forwards progress lines to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn write_line(&self, line: &str) {
        info!(target: "creed::migrate", "{}", line);
    }

    fn write_warning(&self, line: &str) {
        warn!(target: "creed::migrate", "{}", line);
    }
}
