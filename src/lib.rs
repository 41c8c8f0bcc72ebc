//! Deterministic core of a 2D side-scrolling runner: one snail, poison to
//! jump over, pines to collect, and a high score kept in an external store.
//!
//! `compute` holds the state machine and the per-tick pipeline; `runner`
//! wires it to input, audio and storage collaborators.

pub mod clock;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod persist;
pub mod physics;
pub mod ports;
pub mod runner;
pub mod score;
pub mod snapshot;
pub mod spawner;
pub mod world;
