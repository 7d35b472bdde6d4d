//! Input Processing Module
//!
//! Turns command-line paths or change-set documents into the ordered file
//! list passed to the tool.

mod parser;

pub use parser::InputParser;
