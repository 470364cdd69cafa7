pub mod config;
pub mod context;
pub mod generate;
pub mod history;
pub mod render;
pub mod themes;
