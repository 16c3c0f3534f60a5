pub mod api;
pub mod archive;
pub mod config;
pub mod observability;
pub mod queue;
pub mod service;
pub mod storage;
pub mod tasks;
pub mod worker;
