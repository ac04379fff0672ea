use crate::error::AppError;
use crate::model::Task;

mod json_store;
pub use json_store::{JsonFile, store_path};

/// Seam between the task store and durable storage. The whole collection is
/// written wholesale on every save; there is no incremental diffing.
pub trait Persistence {
    fn load(&self) -> Result<Vec<Task>, AppError>;

    fn save(&self, tasks: &[Task]) -> Result<(), AppError>;
}
