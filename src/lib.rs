pub mod analyzer;
pub mod config;
pub mod geometry;
pub mod pose;
pub mod protocol;
pub mod report;
