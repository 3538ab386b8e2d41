//! Records Module - Raw rows to typed sensor records
//!
//! Row-level problems are recovered here and never reach the caller:
//! short rows and unparsable timestamps drop the row, unparsable numeric
//! cells become `None`.

pub mod schema;
pub mod record;
pub mod timestamp;
pub mod normalizer;
pub mod filter;


pub use schema::{ColumnKind, SchemaListing, SensorColumn, SensorSchema};
pub use record::{CategoricalValue, SensorRecord};
pub use timestamp::{parse_decimal, parse_timestamp};
pub use normalizer::{normalize_rows, NormalizeStats, NormalizedBatch};
pub use filter::RecordFilter;
