mod format;
mod table;
pub mod theme;

pub use format::{print_error, print_json, print_json_line, print_success, print_warning, OutputMode};
pub use table::build_table;
