//! Session state and authorization decisions for the client.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod guard;

pub use principal::{Identity, RoleClaim, LoginRequest, ROLE_ADMIN};
pub use session::{Session, SessionState};
pub use guard::{evaluate, GuardConfig, GuardDecision};
