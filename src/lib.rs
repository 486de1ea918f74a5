//! See README.md for more

mod attempt_log;
mod command;
mod error;
mod magento;
mod notify;
mod search;
mod strategy;

pub use attempt_log::*;
pub use command::*;
pub use error::*;
pub use magento::*;
pub use notify::*;
pub use search::*;
pub use stacked_errors;
pub use strategy::*;
