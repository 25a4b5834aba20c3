/*!
  The human readable textual form of bytecode is called assembly. This module parses assembly
  back into bytecode. The syntax is the disassembler's output, so a disassembly can be edited and
  reassembled:

  ```text
  # Comments run to the end of the line.
  0000 OpConstant 1
       OpConstant 2      # the offset column is optional and ignored
  OpAdd
  ```

  Each line holds at most one instruction: an optional decimal offset, the opcode name, then its
  operands as decimal integers separated by whitespace.
*/

use std::fmt::{Display, Formatter};

use nom::{
  IResult,
  bytes::complete::tag,
  character::complete::{
    alpha1,
    alphanumeric0,
    digit1,
    not_line_ending,
    space0,
    space1
  },
  combinator::{all_consuming, map, map_res, opt, recognize},
  multi::many0,
  sequence::{pair, preceded, terminated, tuple}
};

use super::{make, DefinitionTable, Instructions, Operand};
use crate::error::AssemblyError;

/// One parsed line of assembly. Lines that fail to parse are kept as error items so that every
/// problem in a listing can be reported, not only the first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParsedAssemblySyntax<'a> {
  Instruction{
    line     : u32,
    opcode   : u8,
    operands : Vec<Operand>
  },
  NotAnOperation{
    line : u32,
    name : &'a str
  },
  WrongArity{
    line     : u32,
    name     : &'a str,
    expected : usize,
    args     : Vec<Operand>
  },
  Malformed{
    line : u32,
    text : &'a str
  }
}
// Abbreviated name internally
use ParsedAssemblySyntax as Syntax;

impl<'a> Display for ParsedAssemblySyntax<'a>{
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self{
      Syntax::Instruction{ line, opcode, operands } => {
        write!(f, "Line {}: opcode {}", line, opcode)?;
        for operand in operands {
          write!(f, " {}", operand)?;
        }
        Ok(())
      }
      Syntax::NotAnOperation{ line, name } => {
        write!(f, "Error on line {}: {} is not an operation.", line, name)
      }
      Syntax::WrongArity{ line, name, expected, args } => {
        write!(f,
          "Error on line {}: {} requires {} arguments but was given {}: ({})",
          line, name, expected, args.len(),
          args.iter()
              .map(Operand::to_string)
              .collect::<Vec<String>>()
              .join(", ")
        )
      }
      Syntax::Malformed{ line, text } => {
        write!(f, "Error on line {}: cannot parse `{}`.", line, text)
      }
    }
  }
}

impl<'a> ParsedAssemblySyntax<'a> {
  /// Converts an error item to an `AssemblyError`. Instructions yield `None`.
  fn to_error(&self) -> Option<AssemblyError> {
    match self {
      Syntax::Instruction{ .. } => None,
      Syntax::NotAnOperation{ line, name } => {
        Some(AssemblyError::NotAnOperation{ line: *line, name: name.to_string() })
      }
      Syntax::WrongArity{ line, name, expected, args } => {
        Some(AssemblyError::WrongArity{
          line     : *line,
          name     : name.to_string(),
          expected : *expected,
          given    : args.len()
        })
      }
      Syntax::Malformed{ line, text } => {
        Some(AssemblyError::Syntax{ line: *line, text: text.to_string() })
      }
    }
  }
}

// region Parsers

fn comment_p(input: &str) -> IResult<&str, &str> {
  preceded(tag("#"), not_line_ending)(input)
}

fn offset_p(input: &str) -> IResult<&str, &str> {
  terminated(digit1, space1)(input)
}

fn name_p(input: &str) -> IResult<&str, &str> {
  recognize(pair(alpha1, alphanumeric0))(input)
}

fn operand_p(input: &str) -> IResult<&str, Operand> {
  map_res(digit1, |digits: &str| digits.parse::<Operand>())(input)
}

fn blank_p(input: &str) -> IResult<&str, ()> {
  map(tuple((space0, opt(comment_p))), |_| ())(input)
}

fn instruction_p(input: &str) -> IResult<&str, (&str, Vec<Operand>)> {
  let (input, _)        = space0(input)?;
  let (input, _)        = opt(offset_p)(input)?;
  let (input, name)     = name_p(input)?;
  let (input, operands) = many0(preceded(space1, operand_p))(input)?;
  let (input, _)        = blank_p(input)?;
  Ok((input, (name, operands)))
}

// endregion

fn parse_line<'a>(table: &DefinitionTable, line: u32, text: &'a str) -> Option<Syntax<'a>> {
  let (name, operands) = match all_consuming(instruction_p)(text) {
    Ok((_rest, parsed)) => parsed,
    Err(_e) => {
      return match all_consuming(blank_p)(text) {
        Ok(_)   => None,
        Err(_e) => Some(Syntax::Malformed{ line, text: text.trim() })
      };
    }
  };

  let opcode = match table.opcode_named(name) {
    Some(opcode) => opcode,
    None         => return Some(Syntax::NotAnOperation{ line, name })
  };

  // `opcode_named` only returns opcodes that are in the table.
  let expected = table.lookup(opcode).map(|def| def.arity()).unwrap_or(0);
  if operands.len() != expected {
    return Some(Syntax::WrongArity{ line, name, expected, args: operands });
  }

  Some(Syntax::Instruction{ line, opcode, operands })
}

/// Parses assembly text line by line. Blank and comment-only lines produce nothing.
pub fn parse_assembly<'a>(table: &DefinitionTable, text: &'a str) -> Vec<Syntax<'a>> {
  text
    .lines()
    .enumerate()
    .filter_map(|(i, line_text)| parse_line(table, (i + 1) as u32, line_text))
    .collect()
}

/// Assembles `text` into bytecode, stopping at the first line that cannot be assembled.
pub fn assemble(table: &DefinitionTable, text: &str) -> Result<Instructions, AssemblyError> {
  let mut code: Instructions = Vec::new();

  for syntax in parse_assembly(table, text) {
    if let Some(error) = syntax.to_error() {
      return Err(error);
    }
    if let Syntax::Instruction{ line, opcode, operands } = syntax {
      let instruction =
        make(table, opcode, &operands)
          .map_err(|source| AssemblyError::Encode{ line, source })?;
      code.extend(instruction);
    }
  }

  Ok(code)
}
