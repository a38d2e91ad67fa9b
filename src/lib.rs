//! Subburn - Automated Caption Burn-In Workflow
//!
//! A Rust implementation of an automated workflow for burning word-level
//! captions onto video files using ffmpeg and a hosted Whisper API.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod style;
pub mod subtitle;
pub mod transcribe;
pub mod workspace;
