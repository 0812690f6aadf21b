pub mod lexer;
mod reader;
mod scan;

pub use reader::read;
pub use reader::read_many;
pub use reader::read_program;
pub use scan::scan_identifiers;
