// src/graph/mod.rs
//! Graph construction stages and structural analysis.

pub mod assemble;
pub mod classify;
pub mod cluster;
pub mod coupling;
pub mod cycles;
pub mod validate;
