//! Managers
//!
//! Caller-facing façades over stores. Managers add no behaviour of their own apart from the
//! user manager's companion data store.

mod application;
mod resource;
mod user;

pub use application::ApplicationManager;
pub use resource::{ApiManager, GrantManager, ResourceManager};
pub use user::UserManager;
