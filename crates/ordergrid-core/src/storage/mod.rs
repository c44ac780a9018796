//! Clipboard, persistence and export formats.

pub mod clipboard;
pub mod html;
pub mod json;

pub use clipboard::{parse_clipboard, to_clipboard};
pub use html::{export_html, write_html};
pub use json::{JsonFileStore, MemoryStore, SheetStore};
