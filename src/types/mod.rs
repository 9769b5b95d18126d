//! Identity Types
//!
//! Keys, models, paging and configuration types.

mod config;
mod key;
mod model;
mod models;
mod page;

pub use config::*;
pub use key::*;
pub use model::*;
pub use models::*;
pub use page::*;
