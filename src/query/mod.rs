pub mod engine;
pub mod error;
pub mod order;
pub mod params;
pub mod types;

pub use engine::{ListQueryEngine, RecordSource};
pub use error::QueryError;
pub use params::ListQuery;
pub use types::*;
