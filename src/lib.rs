pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod model;
pub mod render;
pub mod state;
pub mod stats;
pub mod web;
