//! Recursive-descent parser producing a single expression tree.
//!
//! Grammar:
//!
//! ```text
//! expr := NUMBER
//!       | SYMBOL
//!       | '(' OPERATOR expr expr ')'
//!       | '(' DEFINE SYMBOL NUMBER ')'
//! ```
//!
//! A `define` form binds the symbol in the [`Environment`] and leaves a
//! reference to that symbol in the tree. Bindings are recorded as the forms
//! are read and only reach the environment once the whole input has parsed,
//! so a rejected input binds nothing.

use std::fmt;

use tracing::debug;

use crate::cursor::TokenCursor;
use crate::env::Environment;
use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Token, TokenKind};

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
}

impl BinaryOp {
  pub fn from_char(c: char) -> Option<Self> {
    match c {
      '+' => Some(Self::Add),
      '-' => Some(Self::Sub),
      '*' => Some(Self::Mul),
      '/' => Some(Self::Div),
      _ => None,
    }
  }

  pub fn symbol(self) -> char {
    match self {
      Self::Add => '+',
      Self::Sub => '-',
      Self::Mul => '*',
      Self::Div => '/',
    }
  }
}

/// Expression tree produced by the parser. Each node owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  Num {
    value: i64,
  },
  Sym {
    name: String,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
}

impl Expr {
  pub fn number(value: i64) -> Self {
    Self::Num { value }
  }

  pub fn symbol(name: impl Into<String>) -> Self {
    Self::Sym { name: name.into() }
  }

  pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }
}

impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Num { value } => write!(f, "{value}"),
      Self::Sym { name } => f.write_str(name),
      Self::Binary { op, lhs, rhs } => write!(f, "({} {lhs} {rhs})", op.symbol()),
    }
  }
}

/// Tokens in, at most one expression out.
///
/// `Ok(None)` means the input held no expression at all; anything that starts
/// an expression but does not complete it, or is followed by more tokens, is
/// a syntax error.
pub fn parse(
  env: &mut Environment,
  tokens: Vec<Token>,
  source: &str,
) -> CompileResult<Option<Expr>> {
  let mut cursor = TokenCursor::new(tokens, source);
  let mut bindings = Vec::new();
  let tree = read_expression(&mut bindings, &mut cursor)?;

  if !cursor.is_eof() {
    return Err(cursor.unexpected("end of input after the expression"));
  }

  bind(env, bindings);
  if let Some(tree) = &tree {
    debug!(%tree, "parsed");
  }
  Ok(tree)
}

/// Parse one expression from the cursor, leaving any following tokens.
pub fn parse_expression(
  env: &mut Environment,
  cursor: &mut TokenCursor,
) -> CompileResult<Option<Expr>> {
  let mut bindings = Vec::new();
  let tree = read_expression(&mut bindings, cursor)?;
  bind(env, bindings);
  Ok(tree)
}

/// `(name, value)` pairs from `define` forms, in source order.
type Bindings = Vec<(String, i64)>;

fn bind(env: &mut Environment, bindings: Bindings) {
  for (name, value) in bindings {
    env.define(name, value);
  }
}

fn read_expression(
  bindings: &mut Bindings,
  cursor: &mut TokenCursor,
) -> CompileResult<Option<Expr>> {
  if cursor.is_eof() {
    return Ok(None);
  }
  parse_expr(bindings, cursor).map(Some)
}

fn parse_expr(bindings: &mut Bindings, cursor: &mut TokenCursor) -> CompileResult<Expr> {
  match cursor.peek().kind {
    TokenKind::Num => {
      let value = cursor.get_number()?;
      Ok(Expr::number(value))
    }
    TokenKind::Sym => {
      let name = cursor.get_symbol()?;
      Ok(Expr::symbol(name))
    }
    TokenKind::LParen => {
      cursor.advance();
      parse_form(bindings, cursor)
    }
    _ => Err(cursor.unexpected("a number, a symbol or \"(\"")),
  }
}

/// Everything after an opening parenthesis.
fn parse_form(bindings: &mut Bindings, cursor: &mut TokenCursor) -> CompileResult<Expr> {
  let token = cursor.peek();
  match token.kind {
    TokenKind::Op => {
      let op = operator(token, cursor.source())?;
      cursor.advance();
      // Operand order matters for `-` and `/`.
      let lhs = parse_expr(bindings, cursor)?;
      let rhs = parse_expr(bindings, cursor)?;
      cursor.skip(TokenKind::RParen, "\")\"")?;
      Ok(Expr::binary(op, lhs, rhs))
    }
    TokenKind::Define => {
      cursor.advance();
      let name = cursor.get_symbol()?;
      let value = cursor.get_number()?;
      cursor.skip(TokenKind::RParen, "\")\"")?;
      bindings.push((name.clone(), value));
      Ok(Expr::symbol(name))
    }
    _ => Err(cursor.unexpected("an operator or \"define\"")),
  }
}

fn operator(token: &Token, source: &str) -> CompileResult<BinaryOp> {
  token
    .word
    .as_deref()
    .and_then(|word| word.chars().next())
    .and_then(BinaryOp::from_char)
    .ok_or_else(|| CompileError::parse_at(source, token.loc, "unknown operator"))
}
