pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod metrics;
pub mod models;
pub mod phone;
pub mod seal;
pub mod submit_guard;
pub mod web;
