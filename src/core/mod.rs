pub mod catalog;
pub mod config;
pub mod content;
pub mod decor;
pub mod engine;
pub mod events;
pub mod limbo;
pub mod render;
pub mod schedule;
pub mod seed;
pub mod session;
