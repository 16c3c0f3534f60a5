use crate::tasks::{OUTCOME_THRESHOLD, Task, TaskStatus};

/// Read-time status rule: enough outcomes with at least one success means the
/// task is `Completed`, whatever it was before (including `Failed`).
pub fn settle(task: &mut Task) -> bool {
    if task.outcome_count() >= OUTCOME_THRESHOLD && !task.loaded_files.is_empty() {
        task.status = TaskStatus::Completed;
        return true;
    }
    false
}
