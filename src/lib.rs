pub mod aggregate;
pub mod audit;
pub mod canonical;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod inventory;
pub mod matcher;
pub mod normalize;
pub mod table;

pub use error::{DiecastError, Result};
