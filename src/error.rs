//! Error types shared by the codec, the disassembler and the assembler.

use thiserror::Error;

use crate::bytecode::{Operand, OperandWidth};

/// Failures of the encoding layer. None of these are fatal; every codec operation returns them
/// to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
  #[error("opcode {opcode} undefined")]
  UnknownOpcode { opcode: u8 },

  #[error("{name} takes {expected} operand(s) but was given {given}")]
  OperandCountMismatch { name: String, expected: usize, given: usize },

  #[error("operand of width {width} needs {width} byte(s) at offset {offset} but only {available} remain")]
  TruncatedOperand { offset: usize, width: OperandWidth, available: usize },

  #[error("no opcode at offset {offset}: the stream is {length} byte(s) long")]
  OffsetOutOfRange { offset: usize, length: usize },

  #[error("operand {value} does not fit in {width} byte(s)")]
  OperandOverflow { value: Operand, width: OperandWidth },

  #[error("operand width {width} is not supported")]
  UnsupportedWidth { width: OperandWidth },

  #[error("opcode {opcode} is already defined")]
  DuplicateOpcode { opcode: u8 },

  #[error("an opcode named {name} is already defined")]
  DuplicateName { name: String },
}

/// Failures while turning assembly text into bytecode. Line numbers count from 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
  #[error("error on line {line}: cannot parse `{text}`")]
  Syntax { line: u32, text: String },

  #[error("error on line {line}: {name} is not an operation")]
  NotAnOperation { line: u32, name: String },

  #[error("error on line {line}: {name} requires {expected} argument(s) but was given {given}")]
  WrongArity { line: u32, name: String, expected: usize, given: usize },

  #[error("error on line {line}: {source}")]
  Encode { line: u32, source: CodecError },
}

pub type CodecResult<T> = Result<T, CodecError>;
