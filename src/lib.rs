pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::{connect, AnyStorage};
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    compare::compare_results, etl::EtlEngine, line_pipeline::LinePipeline,
    table_pipeline::TablePipeline,
};
pub use utils::error::{EtlError, Result};
