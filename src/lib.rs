/*!
  Instruction encoding for a stack-based bytecode VM: packing opcodes and their operands into a
  byte stream, reading them back, and rendering a stream as text.

  ```
  use stackcode::bytecode::{disassemble, make, Opcode, STANDARD_DEFINITIONS};

  let table = &*STANDARD_DEFINITIONS;
  let mut code = make(table, Opcode::Constant, &[1]).unwrap();
  code.extend(make(table, Opcode::Constant, &[2]).unwrap());
  code.extend(make(table, Opcode::Add, &[]).unwrap());

  assert_eq!(
    disassemble(table, &code),
    "0000 OpConstant 1\n0003 OpConstant 2\n0006 OpAdd\n"
  );
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod bytecode;
pub mod error;

pub use error::{AssemblyError, CodecError, CodecResult};
