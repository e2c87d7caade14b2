//! Output formatter trait

use rewriter_domain::ThreadSnapshot;

/// Trait for formatting thread snapshots
pub trait OutputFormatter {
    /// Format the complete thread: status, answer and iteration log
    fn format(&self, snapshot: &ThreadSnapshot) -> String;

    /// Format as JSON
    fn format_json(&self, snapshot: &ThreadSnapshot) -> String;

    /// Format the final answer only (concise output)
    fn format_response_only(&self, snapshot: &ThreadSnapshot) -> String;
}
