use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use super::OperandWidth;

/**
  Opcodes of the v1 instruction set.

  Rust stores enum variants as bytes. As in C, enum values are represented by consecutive
  natural numbers, and the discriminant of each variant is the byte written to the instruction
  stream. Consequently, the order the opcodes are listed below is significant: reordering them
  changes the binary format. New opcodes go at the end.

  The strum serializations are the names used by the disassembler and the assembler.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,          Hash
)]
#[repr(u8)]
pub enum Opcode {
  // Constants //
  #[strum(serialize = "OpConstant")]      Constant,        // OpConstant index
  // Arithmetic //
  #[strum(serialize = "OpAdd")]           Add,
  #[strum(serialize = "OpPop")]           Pop,
  #[strum(serialize = "OpSub")]           Sub,
  #[strum(serialize = "OpMul")]           Mul,
  #[strum(serialize = "OpDiv")]           Div,
  // Booleans //
  #[strum(serialize = "OpTrue")]          True,
  #[strum(serialize = "OpFalse")]         False,
  #[strum(serialize = "OpNull")]          Null,
  // Comparisons //
  #[strum(serialize = "OpEqual")]         Equal,
  #[strum(serialize = "OpNotEqual")]      NotEqual,
  #[strum(serialize = "OpGreaterThan")]   GreaterThan,
  // Prefix operators //
  #[strum(serialize = "OpMinus")]         Minus,
  #[strum(serialize = "OpBang")]          Bang,
  // Control flow //
  #[strum(serialize = "OpJumpNotTruthy")] JumpNotTruthy,   // OpJumpNotTruthy target
  #[strum(serialize = "OpJump")]          Jump,            // OpJump target
  // Globals //
  #[strum(serialize = "OpGetGlobal")]     GetGlobal,       // OpGetGlobal index
  #[strum(serialize = "OpSetGlobal")]     SetGlobal,       // OpSetGlobal index
  // Composite values //
  #[strum(serialize = "OpArray")]         Array,           // OpArray element_count
  #[strum(serialize = "OpHash")]          Hash,            // OpHash key_and_value_count
  #[strum(serialize = "OpIndex")]         Index,
}

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn name(&self) -> &'static str {
    (*self).into()
  }

  /// The widths in bytes of the operands of this opcode, in the order they are encoded.
  pub fn operand_widths(&self) -> &'static [OperandWidth] {
    match self {
      | Opcode::Constant
      | Opcode::JumpNotTruthy
      | Opcode::Jump
      | Opcode::GetGlobal
      | Opcode::SetGlobal
      | Opcode::Array
      | Opcode::Hash => &[2],
      _ => &[]
    }
  }

  pub fn arity(&self) -> usize {
    self.operand_widths().len()
  }
}


#[cfg(test)]
mod tests {
  use std::convert::TryFrom;
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn byte_values_are_stable() {
    assert_eq!(Opcode::Constant.code(), 0);
    assert_eq!(Opcode::Add.code(), 1);
    assert_eq!(Opcode::Null.code(), 8);
    assert_eq!(Opcode::JumpNotTruthy.code(), 14);
    assert_eq!(Opcode::Index.code(), 20);
  }

  #[test]
  fn byte_to_opcode() {
    assert_eq!(Opcode::try_from(15u8).ok(), Some(Opcode::Jump));
    assert!(Opcode::try_from(21u8).is_err());
    assert!(Opcode::try_from(255u8).is_err());
  }

  #[test]
  fn names_round_trip() {
    for opcode in Opcode::iter() {
      assert_eq!(Opcode::from_str(opcode.name()).ok(), Some(opcode));
      assert_eq!(format!("{}", opcode), opcode.name());
    }
    assert_eq!(Opcode::Constant.name(), "OpConstant");
    assert!(Opcode::from_str("Constant").is_err());
  }

  #[test]
  fn operand_widths() {
    assert_eq!(Opcode::Constant.operand_widths(), &[2]);
    assert_eq!(Opcode::Hash.arity(), 1);
    assert_eq!(Opcode::Add.operand_widths(), &[] as &[OperandWidth]);
    assert_eq!(Opcode::Index.arity(), 0);
  }
}
