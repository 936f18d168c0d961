pub mod board_ops;
pub mod prompt_ops;
