pub mod config;
pub mod countdown;
pub mod history;
pub mod stopwatch;
