//! Error taxonomy shared by every stage of the pipeline.
//!
//! Lexical and syntactic failures point at the offending byte with a caret,
//! in the style of the classic small-compiler diagnostics. Evaluation and
//! emission failures name the value or operator involved instead, since the
//! tree no longer carries source positions.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("{expr_line}\n{marker} {message}"))]
  Lex {
    expr_line: String,
    marker: String,
    message: String,
  },

  #[snafu(display("{expr_line}\n{marker} {message}"))]
  Parse {
    expr_line: String,
    marker: String,
    message: String,
  },

  #[snafu(display("nothing to compile: the program is empty"))]
  EmptyProgram,

  #[snafu(display("unbound symbol \"{name}\""))]
  UnboundSymbol { name: String },

  #[snafu(display("division by zero: {lhs} / 0"))]
  DivideByZero { lhs: i64 },

  #[snafu(display("arithmetic overflow: {lhs} {op} {rhs}"))]
  ArithmeticOverflow { op: char, lhs: i64, rhs: i64 },

  #[snafu(display("register pool exhausted: {pool} are all in use"))]
  RegisterExhausted { pool: String },

  #[snafu(display("operator '{op}' is not implemented by the assembly backend"))]
  Unsupported { op: char },

  #[snafu(display("value {value} does not fit a 16-bit register"))]
  ImmediateOutOfRange { value: i64 },
}

impl CompileError {
  /// Lexical error anchored at a byte offset in the source.
  pub fn lex_at(expr: &str, loc: usize, message: impl Into<String>) -> Self {
    let (expr_line, marker) = caret(expr, loc);
    LexSnafu {
      expr_line,
      marker,
      message,
    }
    .build()
  }

  /// Syntax error anchored at a byte offset in the source.
  pub fn parse_at(expr: &str, loc: usize, message: impl Into<String>) -> Self {
    let (expr_line, marker) = caret(expr, loc);
    ParseSnafu {
      expr_line,
      marker,
      message,
    }
    .build()
  }

  pub fn is_parse(&self) -> bool {
    matches!(self, Self::Parse { .. } | Self::EmptyProgram)
  }

  /// Message part of a located error, without the source line and caret.
  pub fn message(&self) -> Option<&str> {
    match self {
      Self::Lex { message, .. } | Self::Parse { message, .. } => Some(message),
      _ => None,
    }
  }
}

fn caret(expr: &str, loc: usize) -> (String, String) {
  // REPL lines keep their newline; it would split the quoted source.
  let trimmed = expr.trim_end_matches(['\n', '\r']);
  let expr_line = format!("'{trimmed}'");
  let mut safe_loc = loc.min(trimmed.len());
  while !trimmed.is_char_boundary(safe_loc) {
    safe_loc -= 1;
  }
  let char_offset = trimmed[..safe_loc].chars().count() + 1; // account for opening quote
  let marker = format!("{}^", " ".repeat(char_offset));
  (expr_line, marker)
}
