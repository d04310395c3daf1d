pub mod config;
pub mod db;
pub mod document;
pub mod errors;
pub mod layout;
pub mod preferences;
pub mod reflow;
pub mod render;
pub mod routes;
pub mod state;
pub mod sync;
