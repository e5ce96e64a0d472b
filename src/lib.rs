pub mod config;
mod db;
pub mod observability;

pub use config::Config;
pub use db::{create_pool, run_migrations};
