use crate::migrate::ProgressSink;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct CapturingProgress {
    lines: Mutex<Vec<String>>,
}

impl CapturingProgress {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ProgressSink for CapturingProgress {
    fn write_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
