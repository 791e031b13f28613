//! Reader module — line reassembly and read sessions over a [`LineSource`].
//!
//! [`LineSource`]: crate::parser::traits::LineSource

pub mod reassembler;
pub mod session;

pub use reassembler::{BlockKind, LineReassembler, RawLine, Step};
pub use session::DataReaderSun1_6;
