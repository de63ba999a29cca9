pub mod config;
pub mod error;
pub mod logging;
pub mod matchups;
pub mod page;
pub mod pipeline;
pub mod projector;
pub mod render;
pub mod snapshot;
