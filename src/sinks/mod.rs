// Adapters for the output destinations. Each sink is independent; the
// engine runs them sequentially and a failure in one never rolls back or
// blocks another.

pub mod csv_file;
pub mod postgres;
pub mod sheets;

pub use csv_file::CsvSink;
pub use postgres::{create_database, PostgresSink};
pub use sheets::SheetsSink;
