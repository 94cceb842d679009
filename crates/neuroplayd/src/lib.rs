//! NeuroPlay daemon: asynchronous game-completion pipeline.
//!
//! The intake path accepts a gameplay submission, validates its shape,
//! stores a pending job with a TTL and acknowledges immediately. A worker
//! pool pulls jobs, runs the completion orchestrator with retry and
//! exponential backoff, and publishes the terminal result for polling.

pub mod config;
pub mod dispatcher;
pub mod intake;
pub mod orchestrator;
pub mod repos;
pub mod routes;
pub mod server;
