//! Bulk user import and account tooling used by `karma-admin`

pub mod importer;
pub mod reader;
pub mod record;
pub mod report;

pub use importer::{AdminAccount, ConfirmSummary, UserImporter};
pub use reader::{read_sheet, RawRow, Sheet};
pub use record::{normalize_record, ImportRecord, ValidRecord};
pub use report::{latest_results_file, ImportResults, WrittenReport};
