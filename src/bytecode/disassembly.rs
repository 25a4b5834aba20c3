/*!
  Turns a byte stream back into human readable text, one line per instruction:

  ```text
  0000 OpConstant 1
  0003 OpConstant 2
  0006 OpAdd
  ```

  Offsets are zero-padded decimal, at least four digits wide and wider when the stream is long
  enough to need it. A byte that cannot be decoded produces an `ERROR:` line in place of an
  instruction and the scan resumes at the next byte, so a corrupt stream is still scanned to the
  end. Nothing here prints; diagnostics go through the `log` facade.
*/

use std::fmt::Write;

use prettytable::{format as TableFormat, Table};

use super::binary::{decode_instruction, DecodedInstruction};
use super::{Definition, DefinitionTable, Operand};
use crate::error::CodecError;

/// A position in the stream that could not be decoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fault {
  pub offset : usize,
  pub error  : CodecError,
}

/**
  Walks a byte stream instruction by instruction. Every call to `next` advances the cursor by at
  least one byte: by the size of the instruction on success, by exactly one byte on a fault.
*/
pub struct InstructionIter<'t, 'b> {
  table  : &'t DefinitionTable,
  bytes  : &'b [u8],
  cursor : usize,
}

impl<'t, 'b> Iterator for InstructionIter<'t, 'b> {
  type Item = Result<DecodedInstruction<'t>, Fault>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.cursor >= self.bytes.len() {
      return None;
    }

    let offset = self.cursor;
    let item = match decode_instruction(self.table, self.bytes, offset) {
      Ok(instruction) => {
        self.cursor += instruction.len();
        #[cfg(feature = "trace_computation")]
        log::trace!(
          "{:04} {}",
          offset,
          fmt_instruction(instruction.definition, &instruction.operands)
        );
        Ok(instruction)
      }
      Err(error) => {
        self.cursor += 1;
        log::debug!("cannot decode byte {} at offset {}: {}", self.bytes[offset], offset, error);
        Err(Fault{ offset, error })
      }
    };

    debug_assert!(self.cursor > offset);
    Some(item)
  }
}

/// Iterates over the decoded instructions of `bytes`.
pub fn instructions<'t, 'b>(table: &'t DefinitionTable, bytes: &'b [u8]) -> InstructionIter<'t, 'b> {
  InstructionIter{ table, bytes, cursor: 0 }
}

/// The number of digits used for offsets when disassembling a stream of `length` bytes.
pub fn offset_width(length: usize) -> usize {
  let largest_offset = length.saturating_sub(1);
  largest_offset.to_string().len().max(4)
}

fn fmt_instruction(definition: &Definition, operands: &[Operand]) -> String {
  let operand_count = definition.arity();

  if operands.len() != operand_count {
    return format!(
      "ERROR: operand len {} does not match defined {}",
      operands.len(), operand_count
    );
  }

  let mut text = definition.name.to_string();
  for operand in operands {
    text.push(' ');
    text.push_str(&operand.to_string());
  }
  text
}

fn fmt_item(item: &Result<DecodedInstruction<'_>, Fault>) -> (usize, String) {
  match item {
    Ok(instruction) => {
      (instruction.offset, fmt_instruction(instruction.definition, &instruction.operands))
    }
    Err(fault) => {
      (fault.offset, format!("ERROR: {}", fault.error))
    }
  }
}

/// Disassembles `bytes` into text. Every line, including the last, ends in a newline.
pub fn disassemble(table: &DefinitionTable, bytes: &[u8]) -> String {
  let width    = offset_width(bytes.len());
  let mut text = String::new();

  for item in instructions(table, bytes) {
    let (offset, line) = fmt_item(&item);
    // Writing to a `String` cannot fail.
    let _ = writeln!(text, "{:0width$} {}", offset, line, width = width);
  }

  text
}

/// Renders the disassembly of `bytes` as a table of offsets, raw bytes and instructions.
pub fn disassembly_table(table: &DefinitionTable, bytes: &[u8]) -> Table {
  let width = offset_width(bytes.len());
  let mut display_table = Table::new();

  display_table.set_format(*TABLE_DISPLAY_FORMAT);
  display_table.set_titles(row![ubr->"Offset", ubl->"Bytes", ubl->"Instruction"]);

  for item in instructions(table, bytes) {
    let (offset, line) = fmt_item(&item);
    let size = match &item {
      Ok(instruction) => instruction.len(),
      Err(_)          => 1
    };
    let raw =
      bytes[offset..offset + size]
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<String>>()
        .join(" ");

    display_table.add_row(
      row![r->format!("{:0width$}", offset, width = width), raw, line]
    );
  }

  display_table
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::{make, Opcode, STANDARD_DEFINITIONS};

  fn constants(values: &[Operand]) -> Vec<u8> {
    values
      .iter()
      .map(|value| make(&*STANDARD_DEFINITIONS, Opcode::Constant, &[*value]).unwrap())
      .collect::<Vec<Vec<u8>>>()
      .concat()
  }

  #[test]
  fn three_constants() {
    let bytes = constants(&[1, 2, 65535]);
    assert_eq!(bytes.len(), 9);

    let text = disassemble(&*STANDARD_DEFINITIONS, &bytes);
    assert_eq!(text, "0000 OpConstant 1\n0003 OpConstant 2\n0006 OpConstant 65535\n");
    assert_eq!(text.lines().count(), 3);
  }

  #[test]
  fn single_instruction() {
    let bytes = constants(&[65535]);
    assert_eq!(disassemble(&*STANDARD_DEFINITIONS, &bytes), "0000 OpConstant 65535\n");
  }

  #[test]
  fn operandless_instructions() {
    let table = &*STANDARD_DEFINITIONS;
    let bytes = [
      make(table, Opcode::Add, &[]).unwrap(),
      make(table, Opcode::GetGlobal, &[2]).unwrap(),
      make(table, Opcode::Pop, &[]).unwrap(),
    ].concat();
    assert_eq!(disassemble(table, &bytes), "0000 OpAdd\n0001 OpGetGlobal 2\n0004 OpPop\n");
  }

  #[test]
  fn unknown_opcode_does_not_stall() {
    let mut bytes = vec![0xFF];
    bytes.extend(constants(&[1, 2]));

    let text = disassemble(&*STANDARD_DEFINITIONS, &bytes);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
      lines,
      vec!["0000 ERROR: opcode 255 undefined", "0001 OpConstant 1", "0004 OpConstant 2"]
    );
  }

  #[test]
  fn consecutive_unknown_bytes() {
    let bytes = [0xF0, 0xF1, 0xF2];
    let faults: Vec<usize> =
      instructions(&*STANDARD_DEFINITIONS, &bytes)
        .map(|item| item.unwrap_err().offset)
        .collect();
    assert_eq!(faults, vec![0, 1, 2]);
  }

  #[test]
  fn truncated_tail_terminates() {
    // OpConstant missing the low byte of its operand.
    let bytes = [Opcode::Constant.code(), 0x00];
    let items: Vec<_> = instructions(&*STANDARD_DEFINITIONS, &bytes).collect();
    assert_eq!(items.len(), 2);
    assert!(matches!(
      items[0],
      Err(Fault{ offset: 0, error: CodecError::TruncatedOperand { .. } })
    ));
    assert!(matches!(items[1], Err(Fault{ offset: 1, .. })));
  }

  #[test]
  fn truncated_operand_reports_stream_offset() {
    let mut bytes = constants(&[1]);
    bytes.extend(&[Opcode::Constant.code(), 0x00]);

    let text = disassemble(&*STANDARD_DEFINITIONS, &bytes);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
      lines,
      vec![
        "0000 OpConstant 1",
        "0003 ERROR: operand of width 2 needs 2 byte(s) at offset 4 but only 1 remain",
        "0004 ERROR: operand of width 2 needs 2 byte(s) at offset 5 but only 0 remain",
      ]
    );
  }

  #[test]
  fn empty_stream() {
    assert_eq!(disassemble(&*STANDARD_DEFINITIONS, &[]), "");
    assert_eq!(instructions(&*STANDARD_DEFINITIONS, &[]).count(), 0);
  }

  #[test]
  fn idempotent() {
    let mut bytes = constants(&[7, 8]);
    bytes.push(0xEE);
    let first  = disassemble(&*STANDARD_DEFINITIONS, &bytes);
    let second = disassemble(&*STANDARD_DEFINITIONS, &bytes);
    assert_eq!(first, second);
  }

  #[test]
  fn offsets_widen_for_long_streams() {
    assert_eq!(offset_width(0), 4);
    assert_eq!(offset_width(10_000), 4);
    assert_eq!(offset_width(10_001), 5);

    let bytes = vec![Opcode::Pop.code(); 10_001];
    let text  = disassemble(&*STANDARD_DEFINITIONS, &bytes);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 10_001);
    assert_eq!(lines[0], "00000 OpPop");
    assert_eq!(lines[10_000], "10000 OpPop");
  }

  #[test]
  fn arity_mismatch_is_reported_inline() {
    let definition = STANDARD_DEFINITIONS.lookup(Opcode::Constant.code()).unwrap();
    assert_eq!(
      fmt_instruction(definition, &[1, 2]),
      "ERROR: operand len 2 does not match defined 1"
    );
  }

  #[test]
  fn custom_table() {
    let table = DefinitionTable::builder()
      .define(1u8, "OpPair", &[1, 4]).unwrap()
      .build();
    let bytes = make(&table, 1u8, &[3, 70_000]).unwrap();
    assert_eq!(disassemble(&table, &bytes), "0000 OpPair 3 70000\n");
  }

  #[test]
  fn table_rendering() {
    let mut bytes = constants(&[258]);
    bytes.push(0xFF);
    let rendered = disassembly_table(&*STANDARD_DEFINITIONS, &bytes).to_string();
    assert!(rendered.contains("00 01 02"));
    assert!(rendered.contains("OpConstant 258"));
    assert!(rendered.contains("ERROR: opcode 255 undefined"));
  }
}
