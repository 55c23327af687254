pub mod audio;
pub mod config;
pub mod detection;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod stt;
pub mod timeline;

pub use error::{KwsError, Result};
