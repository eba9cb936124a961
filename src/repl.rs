//! Read-evaluate-print loop.
//!
//! Each line is evaluated on its own against one long-lived [`Environment`],
//! so definitions carry over while a bad line only costs its own diagnostic.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::env::Environment;
use crate::{Config, evaluate};

pub const PROMPT: &str = "> ";

/// Run the loop until `input` is exhausted.
///
/// Lines are read as raw bytes; anything that is not UTF-8 reaches the
/// tokenizer as a replacement character and is rejected like any other
/// illegal byte.
pub fn run(
  env: &mut Environment,
  config: &Config,
  mut input: impl BufRead,
  mut output: impl Write,
) -> io::Result<()> {
  let mut buf = Vec::new();
  loop {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;

    buf.clear();
    if input.read_until(b'\n', &mut buf)? == 0 {
      writeln!(output)?;
      debug!(symbols = env.len(), "end of input, leaving repl");
      return Ok(());
    }
    let line = String::from_utf8_lossy(&buf);
    if line.trim().is_empty() {
      continue;
    }

    match evaluate(env, &line, config) {
      Ok(text) => writeln!(output, "{text}")?,
      Err(err) => {
        warn!(%err, "line rejected");
        writeln!(output, "{err}")?;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Mode;

  fn session(input: &str) -> String {
    let mut env = Environment::new();
    let mut output = Vec::new();
    run(&mut env, &Config::new(Mode::Value), input.as_bytes(), &mut output).unwrap();
    String::from_utf8(output).unwrap()
  }

  #[test]
  fn definitions_persist_across_lines() {
    assert_eq!(
      session("(define x 5)\n(* x 2)\n"),
      "> 5\n> 10\n> \n"
    );
  }

  #[test]
  fn errors_do_not_end_the_session() {
    let out = session("(/ 5 0)\n)\n(+ 1 2)\n");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "> division by zero: 5 / 0");
    assert_eq!(lines[1], "> ')'");
    assert_eq!(lines[3], "> 3");
    assert_eq!(lines[4], "> ");
  }

  #[test]
  fn invalid_utf8_line_is_rejected_alone() {
    let mut env = Environment::new();
    let mut output = Vec::new();
    let input: &[u8] = b"\xff\n(+ 1 2)\n";
    run(&mut env, &Config::new(Mode::Value), input, &mut output).unwrap();
    let out = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "> '\u{fffd}'");
    assert_eq!(
      lines[1],
      " ^ illegal character \"\u{fffd}\", expected a number, a symbol or \"(\""
    );
    assert_eq!(lines[2], "> 3");
    assert_eq!(lines[3], "> ");
  }

  #[test]
  fn rejected_line_leaves_no_bindings() {
    assert_eq!(
      session("(define x 5) 3\nx\n(+ (define y 1) (/ 1 0))\ny\n"),
      concat!(
        "> '(define x 5) 3'\n",
        "              ^ expected end of input after the expression, but got \"3\"\n",
        "> unbound symbol \"x\"\n",
        "> division by zero: 1 / 0\n",
        "> unbound symbol \"y\"\n",
        "> \n",
      )
    );
  }

  #[test]
  fn blank_lines_are_skipped() {
    assert_eq!(session("\n   \n7"), "> > > 7\n> \n");
  }
}
