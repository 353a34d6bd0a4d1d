pub mod backend;
pub mod batch;
pub mod batch_plan;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod pool;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod retry;
pub mod unit;
pub mod util;
