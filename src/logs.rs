use ic_canister_log::{declare_log_buffer, export as export_logs, GlobalBuffer};
use serde::Serialize;

// High-priority messages.
declare_log_buffer!(name = INFO, capacity = 1000);

// Low-priority info messages.
declare_log_buffer!(name = DEBUG, capacity = 1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Priority {
    Info,
    Debug,
}

#[derive(Clone, Debug, Serialize)]
pub struct LogRecord {
    pub timestamp: u64,
    pub priority: Priority,
    pub file: String,
    pub line: u32,
    pub message: String,
}

fn collect(buffer: &'static GlobalBuffer, priority: Priority, records: &mut Vec<LogRecord>) {
    for entry in export_logs(buffer) {
        records.push(LogRecord {
            timestamp: entry.timestamp,
            priority,
            file: entry.file.to_string(),
            line: entry.line,
            message: entry.message,
        });
    }
}

/// Everything logged during this run, oldest first.
pub fn collect_records() -> Vec<LogRecord> {
    let mut records = vec![];
    collect(&INFO, Priority::Info, &mut records);
    collect(&DEBUG, Priority::Debug, &mut records);
    records.sort_by_key(|record| record.timestamp);
    records
}

pub fn records_to_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&collect_records())
}
