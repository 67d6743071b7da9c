//! Worker domain — identity, profiles, provisioning, and REST routes.

pub mod model;
pub mod provision;
pub mod routes;

pub use model::{Position, Profile, Worker};
pub use provision::{provision_profile, sync_profile};
pub use routes::worker_routes;
