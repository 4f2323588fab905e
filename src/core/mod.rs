pub mod compare;
pub mod etl;
pub mod line_pipeline;
pub mod splitter;
pub mod table;
pub mod table_pipeline;

pub use crate::domain::model::{EventRecord, TripRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
