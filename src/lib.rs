pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod present;
pub mod reshape;
pub mod table;

pub use config::Config;
pub use document::RawDocument;
pub use error::{Error, Result};
pub use pipeline::{Dashboard, Snapshot};
pub use table::{Indicator, IndicatorTable};
