//! Tariffs - lookup, semantic search and what-if scenarios over a tariff table
//!
//! The library holds the record store, the embedding index and the scenario
//! engines. The `tariffs_server` binary exposes them over HTTP and the
//! `tariffs` binary is a thin terminal client with an optional AI advisor.

pub mod advisor;
pub mod calculator;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod index;
pub mod logging;
pub mod materials;
pub mod records;
pub mod resolver;
pub mod scenarios;
pub mod server;
pub mod similarity;
