/*!
  The definition table is the registry mapping an opcode byte to its name and operand layout.
  It is built once, either from the standard instruction set or from a builder, and is immutable
  afterward. Codec functions take it by reference rather than consulting a global.
*/

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use bimap::BiMap;
use string_cache::DefaultAtom;
use strum::IntoEnumIterator;

use super::{Opcode, OperandWidth};
use crate::error::{CodecError, CodecResult};

/// Operand widths in bytes that the encoder and decoder know how to handle.
pub const SUPPORTED_WIDTHS: [OperandWidth; 4] = [1, 2, 4, 8];

/// The name and operand layout of a single opcode. Names are interned.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Definition {
  pub name           : DefaultAtom,
  pub operand_widths : Vec<OperandWidth>,
}

impl Definition {
  pub fn arity(&self) -> usize {
    self.operand_widths.len()
  }

  /// The size in bytes of an instruction with this definition, including the opcode byte.
  pub fn instruction_size(&self) -> usize {
    1 + self.operand_width_sum()
  }

  pub fn operand_width_sum(&self) -> usize {
    self.operand_widths.iter().sum()
  }
}

impl Display for Definition {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}({})",
      self.name,
      self.operand_widths
          .iter()
          .map(OperandWidth::to_string)
          .collect::<Vec<String>>()
          .join(", ")
    )
  }
}

/**
  Maps opcode bytes to definitions. The name index is a convenience wrapper around a `BiMap` so
  the assembler can go from a name back to its opcode.
*/
#[derive(Clone, Debug)]
pub struct DefinitionTable {
  definitions : HashMap<u8, Definition>,
  names       : BiMap<u8, DefaultAtom>,
}

impl DefinitionTable {

  pub fn builder() -> DefinitionTableBuilder {
    DefinitionTableBuilder{
      table: DefinitionTable{
        definitions : HashMap::new(),
        names       : BiMap::new()
      }
    }
  }

  /// The table for the v1 instruction set.
  pub fn standard() -> CodecResult<DefinitionTable> {
    Opcode::iter()
      .try_fold(DefinitionTable::builder(), |builder, opcode| {
        builder.define(opcode, opcode.name(), opcode.operand_widths())
      })
      .map(DefinitionTableBuilder::build)
  }

  fn insert(&mut self, opcode: u8, name: DefaultAtom, operand_widths: Vec<OperandWidth>) {
    self.names.insert(opcode, name.clone());
    self.definitions.insert(opcode, Definition{ name, operand_widths });
  }

  pub fn lookup(&self, opcode: u8) -> CodecResult<&Definition> {
    self.definitions
        .get(&opcode)
        .ok_or(CodecError::UnknownOpcode { opcode })
  }

  /// Reverse lookup from an opcode name to its byte.
  pub fn opcode_named(&self, name: &str) -> Option<u8> {
    self.names.get_by_right(&DefaultAtom::from(name)).cloned()
  }

  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  /// Iterates over `(opcode, definition)` pairs in opcode order.
  pub fn iter(&self) -> impl Iterator<Item = (u8, &Definition)> {
    let mut entries: Vec<(u8, &Definition)> =
      self.definitions.iter().map(|(op, def)| (*op, def)).collect();
    entries.sort_by_key(|(op, _)| *op);
    entries.into_iter()
  }
}

/// Collects definitions, validating each as it is added.
pub struct DefinitionTableBuilder {
  table: DefinitionTable
}

impl DefinitionTableBuilder {

  pub fn define<O>(mut self, opcode: O, name: &str, operand_widths: &[OperandWidth])
    -> CodecResult<DefinitionTableBuilder>
    where O: Into<u8>
  {
    let opcode = opcode.into();
    if self.table.definitions.contains_key(&opcode) {
      return Err(CodecError::DuplicateOpcode { opcode });
    }
    let name = DefaultAtom::from(name);
    if self.table.names.contains_right(&name) {
      return Err(CodecError::DuplicateName { name: name.to_string() });
    }
    if let Some(&width) = operand_widths.iter().find(|w| !SUPPORTED_WIDTHS.contains(*w)) {
      return Err(CodecError::UnsupportedWidth { width });
    }

    self.table.insert(opcode, name, operand_widths.to_vec());
    Ok(self)
  }

  pub fn build(self) -> DefinitionTable {
    self.table
  }
}

lazy_static! {
  /// The v1 table, built on first use and shared by everything that does not need its own.
  pub static ref STANDARD_DEFINITIONS: DefinitionTable =
    DefinitionTable::standard().expect("the v1 opcodes have unique bytes, names and valid widths");
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn standard_lookup() {
    let table = DefinitionTable::standard().unwrap();
    let def = table.lookup(Opcode::Constant.code()).unwrap();
    assert_eq!(&*def.name, "OpConstant");
    assert_eq!(def.operand_widths, vec![2]);
    assert_eq!(def.instruction_size(), 3);
    assert_eq!(table.len(), 21);
  }

  #[test]
  fn unknown_lookup() {
    let table = DefinitionTable::standard().unwrap();
    assert_eq!(table.lookup(200), Err(CodecError::UnknownOpcode { opcode: 200 }));
  }

  #[test]
  fn standard_matches_opcodes() {
    let table = DefinitionTable::standard().unwrap();
    for opcode in Opcode::iter() {
      let def = table.lookup(opcode.code()).unwrap();
      assert_eq!(&*def.name, opcode.name());
      assert_eq!(def.operand_widths.as_slice(), opcode.operand_widths());
      assert_eq!(table.opcode_named(opcode.name()), Some(opcode.code()));
    }
  }

  #[test]
  fn reverse_lookup() {
    assert_eq!(STANDARD_DEFINITIONS.opcode_named("OpJump"), Some(Opcode::Jump.code()));
    assert_eq!(STANDARD_DEFINITIONS.opcode_named("OpNope"), None);
  }

  #[test]
  fn iterates_in_opcode_order() {
    let opcodes: Vec<u8> = STANDARD_DEFINITIONS.iter().map(|(op, _)| op).collect();
    assert_eq!(opcodes, (0..21).collect::<Vec<u8>>());
  }

  #[test]
  fn builder_accepts_custom_widths() {
    let table = DefinitionTable::builder()
      .define(0x10u8, "OpWide", &[1, 4, 8]).unwrap()
      .define(0x11u8, "OpNothing", &[]).unwrap()
      .build();
    let def = table.lookup(0x10).unwrap();
    assert_eq!(def.instruction_size(), 14);
    assert_eq!(def.to_string(), "OpWide(1, 4, 8)");
    assert_eq!(table.opcode_named("OpNothing"), Some(0x11));
  }

  #[test]
  fn builder_rejects_bad_definitions() {
    let duplicate_opcode = DefinitionTable::builder()
      .define(Opcode::Constant, "OpConstant", &[2]).unwrap()
      .define(Opcode::Constant, "OpOther", &[]);
    assert_eq!(duplicate_opcode.err(), Some(CodecError::DuplicateOpcode { opcode: 0 }));

    let duplicate_name = DefinitionTable::builder()
      .define(1u8, "OpX", &[]).unwrap()
      .define(2u8, "OpX", &[]);
    assert_eq!(duplicate_name.err(), Some(CodecError::DuplicateName { name: "OpX".to_string() }));

    let bad_width = DefinitionTable::builder().define(1u8, "OpOdd", &[2, 3]);
    assert_eq!(bad_width.err(), Some(CodecError::UnsupportedWidth { width: 3 }));
  }
}
