use super::types::ExportReason;

/// Decide whether the completion that produced `completed` is an export
/// boundary. The final completion always exports, even off-batch.
pub fn export_trigger(completed: usize, total: usize, batch_size: usize) -> Option<ExportReason> {
    if completed == 0 {
        return None;
    }
    if completed == total {
        return Some(ExportReason::Final);
    }
    if batch_size > 0 && completed % batch_size == 0 {
        return Some(ExportReason::Batch);
    }
    None
}
