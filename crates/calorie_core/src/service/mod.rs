//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store writes and view emissions for tracker commands.
//! - Keep hosts decoupled from storage and rendering details.

pub mod tracker;
pub mod view;
