//! Report generation: the incremental console log and the final XML document

pub mod console;
pub mod text;
pub mod xml;

pub use text::TextLog;
