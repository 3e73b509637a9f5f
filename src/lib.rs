pub mod auth;
pub mod commands;
pub mod config;
pub mod db;
pub mod duration;
pub mod editor;
pub mod error;
pub mod load;
pub mod logging;
pub mod models;
pub mod report;
pub mod schedule;
pub mod store;
pub mod weeks;

#[cfg(test)]
mod test_utils;

pub use error::{PlannerError, PlannerResult};
