pub mod fetch;
pub mod report_write;
pub mod sheet_read;
