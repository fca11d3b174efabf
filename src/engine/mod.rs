//! Engine module: CLI surface and shared file utilities

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use hashing::{hash_file, hash_file_hex, token_for};
pub use tools::{
    content_type_for, detect_category, detect_file_type, format_size, parse_size,
    sanitize_filename, title_from_filename,
};
