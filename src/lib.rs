pub mod cli;
pub mod error;
pub mod extract;
pub mod filter;
pub mod parser;
pub mod pipeline;
pub mod progress;
pub mod realms;
pub mod schema;
pub mod warehouse;
pub mod writer;

pub use cli::{Cli, Commands};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineSummary};
pub use progress::Progress;
pub use writer::WritePolicy;
