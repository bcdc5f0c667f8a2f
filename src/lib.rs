pub mod app;
pub mod config;
pub mod direction;
pub mod domain;
pub mod edges;
pub mod error;
pub mod expand;
pub mod filter;
pub mod graph;
pub mod mapping;
pub mod output;
pub mod sif;
