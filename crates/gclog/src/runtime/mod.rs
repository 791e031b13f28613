//! Runtime module — process lifecycle: arguments, boot, run.

pub mod cli;
pub mod boot;
pub mod run;
