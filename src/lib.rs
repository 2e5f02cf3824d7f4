//! Wayfarer - Conversational Travel-Planning Assistant
//!
//! This crate implements a stateful workflow over a hybrid retrieval engine:
//! a user query is parsed, routed, matched against a lexical + vector hotel
//! index with staged relaxation, enriched concurrently (weather, prices,
//! currency, safety) and answered, with a feedback loop that refines or
//! re-parses follow-up messages.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
