pub mod catalog;
pub mod client;
pub mod config;
pub mod daemon;
pub mod db;
pub mod domains;
pub mod error;
pub mod events;
pub mod generator;
pub mod interfaces;
pub mod inventory;
pub mod providers;
pub mod scheduler;
pub mod services;
pub mod tools;
#[cfg(feature = "desktop")]
pub mod ui;

pub use crate::client::Dashboard;
pub use crate::config::Config;
pub use crate::db::Database;
pub use crate::domains::chat::{ChatMessage, ChatRole, ChatSession};
pub use crate::error::{AdspotError, Result};
