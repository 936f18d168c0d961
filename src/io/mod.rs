pub mod config_io;
pub mod recovery;
pub mod ticket_store;
pub mod watcher;
