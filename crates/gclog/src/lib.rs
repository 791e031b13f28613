// Module structure for the gclog crate.

// Parsing
pub mod parser;
pub mod reader;

// Process
pub mod conf;
pub mod runtime;
