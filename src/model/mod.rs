pub mod board;
pub mod config;
pub mod prompts;
pub mod ticket;

pub use board::*;
pub use config::*;
pub use ticket::*;
