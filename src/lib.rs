//! Scores spoken answers against reference texts.
//!
//! An uploaded recording is transcribed by an external, asynchronous job
//! ([`runner::JobRunner`]) and the transcript is compared to the problem's
//! reference text with a normalized edit-distance score ([`scoring`]).

pub mod config;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod scoring;
pub mod state_machine;
pub mod store;
pub mod transcribe;
pub mod trigger;
