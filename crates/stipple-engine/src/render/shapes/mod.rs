//! Batch shape renderers.

mod common;

pub mod rect;
