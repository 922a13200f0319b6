mod completion;
pub mod task;

pub use task::{BackgroundTask, TaskContext, TaskError};
