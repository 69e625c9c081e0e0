pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod identity;
pub mod roster;
pub mod router;

pub use context::AppContext;
pub use error::{AppError, AppResult};
