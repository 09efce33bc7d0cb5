pub mod analytics;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod query;
pub mod session;
pub mod storage;
