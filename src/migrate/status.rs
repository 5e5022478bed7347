use crate::migrate::Version;

/// Snapshot of the history compared to the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct MigrationStatus {
    pub current: Version,
    pub prev: Version,
    /// `None` when already at the latest version.
    pub next: Option<Version>,
    pub latest: Version,
    pub executed: usize,
    pub executed_unavailable: usize,
    pub available: usize,
    pub new: usize,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.new == 0
    }
}
