//! Task records and the in-memory store that owns them.
//!
//! The store lives for the lifetime of the process; nothing is persisted.
//! Components that need task state get an `Arc<TaskStore>` handed to them at
//! startup.

pub mod error;
pub mod model;
pub mod store;

pub use error::{Result, TaskError};
pub use model::{OUTCOME_THRESHOLD, Task, TaskStatus, TaskView};
pub use store::TaskStore;
