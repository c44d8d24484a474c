//! Message handling - Turns raw host input into incoming messages

pub mod parser;

pub use parser::MessageParser;
