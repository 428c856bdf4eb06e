//! VocabMaster: AI-assisted vocabulary generation with saved-word review.
//!
//! - [`vocabulary`]: word models, curated sampling, prompt building and the
//!   Gemini word source
//! - [`db`]: SQLite store for generated and saved words
//! - [`server`]: the HTTP API
//! - [`client`]: local persistence, the API client and the learning session
//! - [`config`]: server and client configuration

pub mod client;
pub mod config;
pub mod db;
pub mod server;
pub mod vocabulary;

#[cfg(test)]
mod testing;
