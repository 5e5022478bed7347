use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, get_current_pid};

/// Resident memory of the current process, in bytes.
///
/// `None` when the platform does not expose it.
pub(crate) fn current_memory_usage() -> Option<u64> {
    let pid = get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::new().with_memory(),
    );

    system.process(pid).map(|process| process.memory())
}

/// Memory growth between two readings. Negative when memory was released.
pub(crate) fn memory_delta(before: Option<u64>, after: Option<u64>) -> Option<i64> {
    let before = i64::try_from(before?).ok()?;
    let after = i64::try_from(after?).ok()?;

    Some(after - before)
}

/// Formats a byte count the way the summary prints it, e.g. `1.50M`.
pub fn format_memory(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "K", "M", "G"];

    let sign = if bytes < 0 { "-" } else { "" };
    let mut size = bytes.unsigned_abs() as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{}{}{}", sign, size, UNITS[unit])
    } else {
        format!("{}{:.2}{}", sign, size, UNITS[unit])
    }
}
