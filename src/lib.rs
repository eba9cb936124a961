//! Crate root: wires together the pipeline.
//!
//! - `tokenizer` classifies raw input into a flat token vector.
//! - `cursor` is the forward-only view the parser reads tokens through.
//! - `parser` builds one expression tree and records `define` bindings.
//! - `env` holds those bindings for the length of a session.
//! - `eval` reduces a tree to an integer; `codegen` lowers it to assembly
//!   for the program template described by `target`.
//! - `repl` drives `evaluate` line by line.
//! - `error` is the taxonomy shared by every stage.

pub mod cursor;
pub mod env;
pub mod error;
pub mod eval;
pub mod parser;
pub mod repl;
pub mod target;
pub mod tokenizer;

mod codegen;

use std::fmt::Write as _;

use snafu::OptionExt;

pub use env::Environment;
pub use error::{CompileError, CompileResult};
pub use parser::Expr;
pub use target::AsmTarget;

/// What `evaluate` produces from its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  /// Decimal result of the expression.
  #[default]
  Value,
  /// One line per token.
  Tokens,
  /// Assembly program for the target.
  Compile,
}

/// Driver settings. The core never picks these itself.
#[derive(Debug, Clone, Default)]
pub struct Config {
  pub mode: Mode,
  /// Prefix the output with the symbol table and the parsed tree.
  pub debug: bool,
  pub target: AsmTarget,
}

impl Config {
  pub fn new(mode: Mode) -> Self {
    Self {
      mode,
      ..Self::default()
    }
  }
}

/// Run `source` through the pipeline selected by `config.mode`.
///
/// On failure `env` is left as it was before the call, including any
/// `define` forms that parsed before evaluation or emission failed.
pub fn evaluate(env: &mut Environment, source: &str, config: &Config) -> CompileResult<String> {
  let snapshot = env.clone();
  let result = run_pipeline(env, source, config);
  if result.is_err() {
    *env = snapshot;
  }
  result
}

fn run_pipeline(env: &mut Environment, source: &str, config: &Config) -> CompileResult<String> {
  let tokens = tokenizer::tokenize(source)?;
  if config.mode == Mode::Tokens {
    return Ok(tokenizer::dump(&tokens));
  }

  let tree = parser::parse(env, tokens, source)?;
  let mut out = if config.debug {
    inspect(env, tree.as_ref())
  } else {
    String::new()
  };

  match config.mode {
    Mode::Compile => {
      let tree = tree.context(error::EmptyProgramSnafu)?;
      out.push_str(&codegen::generate(env, &tree, &config.target)?);
    }
    _ => {
      let value = eval::evaluate(env, tree.as_ref())?;
      out.push_str(&value.to_string());
    }
  }
  Ok(out)
}

/// Compile `source` to assembly for the default target.
pub fn generate_assembly(env: &mut Environment, source: &str) -> CompileResult<String> {
  evaluate(env, source, &Config::new(Mode::Compile))
}

/// Symbol table followed by the tree, as printed by `--debug`.
pub fn inspect(env: &Environment, tree: Option<&Expr>) -> String {
  let mut out = String::new();
  for (name, value) in env.sorted() {
    let _ = writeln!(out, "sym {name}: {value}");
  }
  match tree {
    Some(tree) => {
      let _ = writeln!(out, "tree {tree}");
    }
    None => out.push_str("tree <empty>\n"),
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn run(env: &mut Environment, source: &str, mode: Mode) -> CompileResult<String> {
    evaluate(env, source, &Config::new(mode))
  }

  #[test]
  fn value_mode() {
    let mut env = Environment::new();
    assert_eq!(run(&mut env, "(+ 3 4)\n", Mode::Value).unwrap(), "7");
    assert_eq!(run(&mut env, "", Mode::Value).unwrap(), "0");
  }

  #[test]
  fn tokens_mode_does_not_parse() {
    let mut env = Environment::new();
    let dump = run(&mut env, "(define x 5) )", Mode::Tokens).unwrap();
    assert_eq!(dump, "LPAREN\nDEF: define\nSYM: x\nNUM: 5\nRPAREN\nRPAREN\nEOF\n");
    assert!(env.is_empty());
  }

  #[test]
  fn compile_mode_rejects_empty_program() {
    let mut env = Environment::new();
    let err = generate_assembly(&mut env, "  \n").unwrap_err();
    assert!(matches!(err, CompileError::EmptyProgram));
    assert!(err.is_parse());
  }

  #[test]
  fn malformed_input_differs_from_empty_result() {
    let mut env = Environment::new();
    for source in [")", "(+ 1"] {
      let err = run(&mut env, source, Mode::Value).unwrap_err();
      assert!(matches!(err, CompileError::Parse { .. }), "{source}: {err}");
    }
  }

  #[test]
  fn failed_line_keeps_environment_unchanged() {
    let mut env = Environment::new();
    env.define("x", 1);
    for source in ["(+ (define x 2) (/ 1 0))", "(define y 3) 4"] {
      assert!(run(&mut env, source, Mode::Value).is_err(), "{source}");
    }
    assert!(run(&mut env, "(* (define z 2) 3)", Mode::Compile).is_err());
    assert_eq!(env.sorted(), vec![("x", 1)]);
  }

  #[test]
  fn debug_output_precedes_result() {
    let mut env = Environment::new();
    let config = Config {
      debug: true,
      ..Config::new(Mode::Value)
    };
    assert_eq!(
      evaluate(&mut env, "(define x 5)", &config).unwrap(),
      "sym x: 5\ntree x\n5"
    );
  }

  #[test]
  fn inspect_lists_symbols_and_tree() {
    let mut env = Environment::new();
    env.define("b", 2);
    env.define("a", 1);
    let tree = Expr::binary(parser::BinaryOp::Add, Expr::symbol("a"), Expr::number(3));
    assert_eq!(
      inspect(&env, Some(&tree)),
      "sym a: 1\nsym b: 2\ntree (+ a 3)\n"
    );
    assert_eq!(inspect(&Environment::new(), None), "tree <empty>\n");
  }
}
