/*!
  This module is responsible for the encoding and decoding of binary instructions.

  Operands are big-endian and occupy exactly the width their definition declares, so the length
  of an encoded instruction depends only on its opcode.
*/

use super::{Definition, DefinitionTable, Instructions, Operand, OperandWidth, SUPPORTED_WIDTHS};
use crate::error::{CodecError, CodecResult};

/// An instruction read back out of a byte stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedInstruction<'t> {
  /// Position of the opcode byte in the stream.
  pub offset     : usize,
  pub opcode     : u8,
  pub definition : &'t Definition,
  pub operands   : Vec<Operand>,
}

impl<'t> DecodedInstruction<'t> {
  /// The number of bytes the instruction occupies, opcode included.
  pub fn len(&self) -> usize {
    self.definition.instruction_size()
  }
}

/// Largest value representable in `width` bytes.
fn max_value(width: OperandWidth) -> Operand {
  match width {
    8 => Operand::max_value(),
    _ => (1 << (8 * width)) - 1
  }
}

/**
  Writes `value` into the front of `buffer` big-endian in exactly `width` bytes. Values that do
  not fit are rejected rather than truncated, as are buffers shorter than `width`.
*/
pub fn write_uint(buffer: &mut [u8], value: Operand, width: OperandWidth) -> CodecResult<()> {
  if !SUPPORTED_WIDTHS.contains(&width) {
    return Err(CodecError::UnsupportedWidth { width });
  }
  if value > max_value(width) {
    return Err(CodecError::OperandOverflow { value, width });
  }
  if buffer.len() < width {
    return Err(CodecError::TruncatedOperand { offset: 0, width, available: buffer.len() });
  }
  for (i, byte) in buffer[..width].iter_mut().enumerate() {
    let shift = 8 * (width - 1 - i);
    *byte = ((value >> shift) & 0xFF) as u8;
  }
  Ok(())
}

/**
  Reads a big-endian unsigned integer of `width` bytes from the front of `window`, ignoring
  anything after it.
*/
pub fn read_uint(window: &[u8], width: OperandWidth) -> CodecResult<Operand> {
  if !SUPPORTED_WIDTHS.contains(&width) {
    return Err(CodecError::UnsupportedWidth { width });
  }
  if window.len() < width {
    return Err(CodecError::TruncatedOperand { offset: 0, width, available: window.len() });
  }
  Ok(
    window[..width]
      .iter()
      .fold(0, |acc, byte| (acc << 8) | *byte as Operand)
  )
}

pub fn read_uint16(window: &[u8]) -> CodecResult<u16> {
  read_uint(window, 2).map(|value| value as u16)
}

/**
  Builds a single instruction from an opcode and its operands.

  The opcode must be defined in `table`, exactly as many operands as the definition has widths
  must be given, and each must fit its width.
*/
pub fn make<O>(table: &DefinitionTable, opcode: O, operands: &[Operand]) -> CodecResult<Instructions>
  where O: Into<u8>
{
  let opcode     = opcode.into();
  let definition = table.lookup(opcode)?;

  if operands.len() != definition.arity() {
    return Err(CodecError::OperandCountMismatch {
      name     : definition.name.to_string(),
      expected : definition.arity(),
      given    : operands.len()
    });
  }

  let mut instruction = vec![0u8; definition.instruction_size()];
  instruction[0] = opcode;

  let mut offset = 1;
  for (operand, width) in operands.iter().zip(definition.operand_widths.iter()) {
    write_uint(&mut instruction[offset..], *operand, *width)?;
    offset += width;
  }

  Ok(instruction)
}

/**
  Reads the operands of an instruction with the given definition from `window`, which starts
  immediately after the opcode byte. Returns the operands and the number of bytes read, which is
  always the sum of the definition's widths.
*/
pub fn read_operands(definition: &Definition, window: &[u8]) -> CodecResult<(Vec<Operand>, usize)> {
  let mut operands = Vec::with_capacity(definition.arity());
  let mut offset   = 0;

  for &width in definition.operand_widths.iter() {
    let operand = read_uint(&window[offset.min(window.len())..], width).map_err(|_| {
      CodecError::TruncatedOperand {
        offset,
        width,
        available: window.len().saturating_sub(offset)
      }
    })?;
    operands.push(operand);
    offset += width;
  }

  Ok((operands, offset))
}

/**
  Decodes the instruction whose opcode byte is at `bytes[offset]`. Offsets in the errors returned
  count from the start of `bytes`.
*/
pub fn decode_instruction<'t>(table: &'t DefinitionTable, bytes: &[u8], offset: usize)
  -> CodecResult<DecodedInstruction<'t>>
{
  let opcode = match bytes.get(offset) {
    Some(byte) => *byte,
    None => {
      return Err(CodecError::OffsetOutOfRange { offset, length: bytes.len() });
    }
  };
  let definition = table.lookup(opcode)?;
  let (operands, _read) =
    read_operands(definition, &bytes[offset + 1..]).map_err(|error| match error {
      CodecError::TruncatedOperand { offset: window_offset, width, available } => {
        CodecError::TruncatedOperand { offset: offset + 1 + window_offset, width, available }
      }
      other => other
    })?;

  Ok(DecodedInstruction{ offset, opcode, definition, operands })
}
