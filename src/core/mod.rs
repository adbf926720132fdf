mod config;
pub use config::{AppConfig, DEFAULT_CLEAR_PROMPT_THRESHOLD};
pub mod db;
