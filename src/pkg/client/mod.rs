pub mod api;
pub mod board;
pub mod repl;
pub mod tracker;
