pub mod log_file;
pub mod log_record;
pub mod stats;
