use std::env;
use std::fs;
use std::process;

use anyhow::{bail, Context, Result};
use log::info;

use stackcode::bytecode::{assemble, disassemble, disassembly_table, STANDARD_DEFINITIONS};

const USAGE: &str = "usage:
  stackcode assemble <input.asm> <output.bin>
  stackcode disassemble [--table] <input.bin>";

fn run(args: &[String]) -> Result<()> {
  let table = &*STANDARD_DEFINITIONS;

  match args {

    [command, input, output] if command == "assemble" => {
      let text = fs::read_to_string(input)
        .with_context(|| format!("cannot read assembly from {}", input))?;
      let code = assemble(table, &text)
        .with_context(|| format!("cannot assemble {}", input))?;
      fs::write(output, &code)
        .with_context(|| format!("cannot write bytecode to {}", output))?;
      info!("assembled {} bytes into {}", code.len(), output);
    }

    [command, rest @ ..] if command == "disassemble" => {
      let (as_table, input) = match rest {
        [flag, input] if flag == "--table" => (true, input),
        [input]                            => (false, input),
        _                                  => bail!("{}", USAGE)
      };
      let code = fs::read(input)
        .with_context(|| format!("cannot read bytecode from {}", input))?;
      match as_table {
        true  => print!("{}", disassembly_table(table, &code)),
        false => print!("{}", disassemble(table, &code))
      }
    }

    _ => bail!("{}", USAGE)

  }

  Ok(())
}

fn main() {
  env_logger::init();

  let args: Vec<String> = env::args().skip(1).collect();
  if let Err(e) = run(&args) {
    eprintln!("{:#}", e);
    process::exit(1);
  }
}
