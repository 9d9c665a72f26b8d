pub mod cat;
pub mod files;
pub mod import;
pub mod importable;
pub mod init;
pub mod logs;
pub mod show;
pub mod stats;
