//! Site Copilot - Task routing and structured generation for construction sites
//!
//! This crate classifies a site professional's request, gates it by engine
//! tier, and dispatches it to a conversational answer, a structured
//! engineering calculation or a structured compliance document.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
