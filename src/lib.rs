pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
