pub mod config;
pub mod easings;
pub mod sample;
pub mod simulate;
