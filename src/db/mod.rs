pub mod connection;
pub mod migration_runner;
pub mod settings;

pub use connection::Database;
pub use settings::{get_settings, update_settings};
