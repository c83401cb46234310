pub mod etl;
pub mod extract;
pub mod transform;

pub use crate::domain::model::{CleanRecord, CleanTable, RawRecord, RawTable};
pub use crate::domain::ports::{Fetch, Sink};
pub use crate::utils::error::Result;
