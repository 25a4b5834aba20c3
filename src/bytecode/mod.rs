/*!

  The VM executes a flat byte stream. Instructions are variable length but the length of any
  particular instruction is fixed by its opcode: one opcode byte followed by each of the
  opcode's operands, most significant byte first, in exactly the width the opcode declares.
  There is no header, no alignment and no length prefix, so the consumer of a stream must know
  where it ends. The sizes of instruction components are as follows:

    Opcode:   8 bits
    Operand:  8, 16, 32 or 64 bits, per the opcode's definition

  Opcodes do not carry their own layout. The layout lives in a `DefinitionTable`, which maps an
  opcode byte to its name and the widths of its operands. The table is built once and is only
  ever read afterward, so it is passed by reference to everything that encodes or decodes. The
  standard table for the v1 instruction set is available as `STANDARD_DEFINITIONS`.

  One design decision that needed to be made is whether to keep a decoded instruction object
  around at all. Operands are small and the compiler appends instructions to a growing buffer,
  patching jump targets in place, so the byte buffer itself is the only representation that is
  stored. `DecodedInstruction` exists only transiently for the disassembler.

*/

mod assembly;
mod binary;
mod definition;
mod disassembly;
mod opcode;

pub use assembly::{assemble, parse_assembly, ParsedAssemblySyntax};
pub use binary::{decode_instruction, make, read_operands, read_uint, read_uint16, write_uint,
                 DecodedInstruction};
pub use definition::{Definition, DefinitionTable, DefinitionTableBuilder, STANDARD_DEFINITIONS,
                     SUPPORTED_WIDTHS};
pub use disassembly::{disassemble, disassembly_table, instructions, offset_width, Fault,
                      InstructionIter};
pub use opcode::Opcode;

/// A stream of encoded instructions.
pub type Instructions = Vec<u8>;
/// The decoded value of a single operand.
pub type Operand = u64;
/// The width of an operand in bytes.
pub type OperandWidth = usize;
