//! Task domain — model, list filters, and REST routes.

pub mod model;
pub mod query;
pub mod routes;

pub use model::{Priority, Task, TaskType};
pub use query::TaskQuery;
pub use routes::task_routes;
