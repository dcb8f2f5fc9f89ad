//! Terminal client for the tariffs server

pub mod client;
pub mod commands;
pub mod display;
