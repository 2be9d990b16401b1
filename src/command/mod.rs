//! Host command resolution and execution

pub mod resolver;
pub mod runner;

pub use resolver::{quote_posix, resolve, Invocation, Platform};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner, RunnerError};
