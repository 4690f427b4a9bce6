pub mod cache;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod generator;
pub mod model;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod storage;
pub mod validate;
