pub mod cli;
pub mod config;
pub mod enrich;
pub mod error;
pub mod exit;
pub mod graph;
pub mod inventory;
pub mod layout;
pub mod model;
pub mod palette;
pub mod pipeline;
pub mod report;
