//! JVM method bytecode decoding.

mod decode;
pub mod opcodes;

#[cfg(test)]
mod tests;

pub use decode::{decode, Immediates, Instruction, MalformedBytecode, Operands, SwitchTarget};
