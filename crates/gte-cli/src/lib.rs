//! Git time estimator CLI library.

mod cli;
mod config;
pub mod gitlog;

pub use cli::Cli;
pub use config::Config;
