// Adapters: where trip data comes from and where event data goes.

pub mod location;
pub mod parquet;
pub mod sink;
pub mod source;
pub mod storage;
