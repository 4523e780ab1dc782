//! Greedy two-pass allocation of board games onto bookshelves.
//!
//! Games are stacked flat: a stack's footprint is set by its bottom game and
//! only narrower-or-equal games may go on top. The allocator first tries
//! every existing stack, then opens a new stack on the first shelf with
//! enough length left.

pub mod api;
pub mod cli;
pub mod config;
pub mod geometry;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod render;
pub mod report;
pub mod types;
