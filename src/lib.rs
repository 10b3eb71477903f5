pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod download;
pub mod driver;
pub mod error;
pub mod http;
pub mod metadata;
pub mod report;
pub mod resolver;
pub mod session;
pub mod ui;
