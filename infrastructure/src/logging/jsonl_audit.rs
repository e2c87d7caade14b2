//! JSONL audit trail for terminal thread outcomes.
//!
//! Each record is one JSON object per line with an `event_type` of
//! `VALID_RESPONSE` or `MAX_ITERATIONS_REACHED`. The file is opened in
//! append mode so several runs share one trail.

use rewriter_application::AuditSink;
use rewriter_domain::{Finding, IterationKind, Thread};
use serde_json::{Map, Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

pub const VALID_RESPONSE: &str = "VALID_RESPONSE";
pub const MAX_ITERATIONS_REACHED: &str = "MAX_ITERATIONS_REACHED";

/// Audit sink that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Every record is flushed as
/// soon as it is written.
pub struct JsonlAuditSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Open the audit file for appending.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the audit file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&self, thread: &Thread, record: Map<String, Value>) {
        let Ok(line) = serde_json::to_string(&Value::Object(record)) else {
            warn!(thread_id = %thread.id, "Could not serialize audit record");
            return;
        };

        let Ok(mut writer) = self.writer.lock() else {
            warn!(thread_id = %thread.id, "Audit log lock poisoned");
            return;
        };
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!(
                thread_id = %thread.id,
                "Failed to write audit record to {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Fields shared by both event types.
fn base_record(event_type: &str, thread: &Thread) -> Map<String, Value> {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let mut record = Map::new();
    record.insert("timestamp".to_string(), json!(timestamp));
    record.insert("event_type".to_string(), json!(event_type));
    record.insert("thread_id".to_string(), json!(thread.id));
    record.insert("prompt".to_string(), json!(thread.user_prompt));
    record.insert("response".to_string(), json!(thread.final_response));
    record.insert("model_id".to_string(), json!(thread.model_id));
    if let Some(warning) = &thread.warning_message {
        record.insert("warning".to_string(), json!(warning));
    }
    record
}

/// Clarification rounds of a thread, or `None` when there were none.
fn qa_exchanges(thread: &Thread) -> Option<Value> {
    let exchanges: Vec<Value> = thread
        .iterations
        .iter()
        .filter_map(|iteration| match &iteration.kind {
            IterationKind::UserClarification(data) => Some((iteration.number, &data.qa_exchange)),
            IterationKind::ArFeedback(_) => None,
        })
        .map(|(number, exchange)| {
            let mut entry = json!({
                "iteration_number": number,
                "clarification_requested": true,
                "questions": exchange.questions,
                "skipped": exchange.skipped,
                "answers": exchange.answers,
            });
            if exchange.skipped {
                entry["note"] = json!("User skipped answering questions");
            } else {
                entry["qa_pairs"] = exchange
                    .pairs()
                    .map(|(q, a)| json!({ "Q": q, "A": a }))
                    .collect();
            }
            entry
        })
        .collect();

    (!exchanges.is_empty()).then_some(Value::Array(exchanges))
}

impl AuditSink for JsonlAuditSink {
    fn record_accepted(&self, thread: &Thread, findings: &[Finding]) {
        let mut record = base_record(VALID_RESPONSE, thread);
        record.insert("findings".to_string(), json!(findings));
        if let Some(exchanges) = qa_exchanges(thread) {
            record.insert("qa_exchanges".to_string(), exchanges);
        }
        self.write_record(thread, record);
    }

    fn record_budget_exhausted(
        &self,
        thread: &Thread,
        iteration_summaries: &[String],
        last_finding: Option<&Finding>,
    ) {
        let mut record = base_record(MAX_ITERATIONS_REACHED, thread);
        record.insert(
            "iteration_summaries".to_string(),
            json!(iteration_summaries),
        );
        record.insert("last_finding".to_string(), json!(last_finding));
        if let Some(exchanges) = qa_exchanges(thread) {
            record.insert("qa_exchanges".to_string(), exchanges);
        }
        self.write_record(thread, record);
    }
}

impl Drop for JsonlAuditSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
