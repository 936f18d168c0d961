pub mod unicode;
pub mod clipboard;
