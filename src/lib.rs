pub mod config;
pub mod dates;
pub mod engine;
pub mod holiday;
pub mod merge;
pub mod model;
pub mod observability;
pub mod plan;
pub mod runner;
