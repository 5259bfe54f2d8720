//! Application service layer - analysis runs, estimates, config, page scanning

pub mod app;
pub mod config;
pub mod scanner;
