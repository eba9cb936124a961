//! Lexical analysis: turns the raw input into a vector of classified tokens.
//!
//! The tokenizer never rejects a byte it does not understand. Such bytes
//! become `Illegal` tokens and it is up to the parser to refuse them, so a
//! stray character is reported with grammar context. The only lexical error
//! is a number literal too large for an `i64`.

use std::fmt;

use tracing::{debug, trace};

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Num,
  Op,
  Sym,
  Define,
  LParen,
  RParen,
  Eof,
  Illegal,
}

impl TokenKind {
  /// Name used by the token dump and in diagnostics.
  pub fn name(self) -> &'static str {
    match self {
      TokenKind::Num => "NUM",
      TokenKind::Op => "OP",
      TokenKind::Sym => "SYM",
      TokenKind::Define => "DEF",
      TokenKind::LParen => "LPAREN",
      TokenKind::RParen => "RPAREN",
      TokenKind::Eof => "EOF",
      TokenKind::Illegal => "ILLEG",
    }
  }
}

/// A classified lexeme. `value` is set for numbers, `word` for operators,
/// symbols and the `define` keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub value: Option<i64>,
  pub word: Option<String>,
  pub loc: usize,
  pub len: usize,
}

/// Returned by the cursor once it has run past the last token.
pub static EOF_TOKEN: Token = Token {
  kind: TokenKind::Eof,
  value: None,
  word: None,
  loc: usize::MAX,
  len: 0,
};

impl Token {
  pub fn new(kind: TokenKind, loc: usize, len: usize) -> Self {
    Self {
      kind,
      value: None,
      word: None,
      loc,
      len,
    }
  }

  pub fn number(value: i64, loc: usize, len: usize) -> Self {
    Self {
      value: Some(value),
      ..Self::new(TokenKind::Num, loc, len)
    }
  }

  pub fn word(kind: TokenKind, word: impl Into<String>, loc: usize, len: usize) -> Self {
    Self {
      word: Some(word.into()),
      ..Self::new(kind, loc, len)
    }
  }

  pub fn is_eof(&self) -> bool {
    self.kind == TokenKind::Eof
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = self.kind.name();
    match (&self.value, &self.word) {
      (Some(value), _) => write!(f, "{name}: {value}"),
      (None, Some(word)) => write!(f, "{name}: {word}"),
      (None, None) => f.write_str(name),
    }
  }
}

/// Lex the input into a flat vector of tokens terminated by exactly one
/// `Eof` marker.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if matches!(c, b' ' | b'\t' | b'\n') {
      i += 1;
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      let mut value: i64 = 0;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        let digit = i64::from(bytes[i] - b'0');
        value = value
          .checked_mul(10)
          .and_then(|v| v.checked_add(digit))
          .ok_or_else(|| {
            CompileError::lex_at(input, start, "number literal does not fit a 64-bit integer")
          })?;
        i += 1;
      }
      push(&mut tokens, Token::number(value, start, i - start));
      continue;
    }

    if c.is_ascii_alphabetic() {
      let start = i;
      while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
        i += 1;
      }
      let word = &input[start..i];
      let kind = if word == "define" {
        TokenKind::Define
      } else {
        TokenKind::Sym
      };
      push(&mut tokens, Token::word(kind, word, start, i - start));
      continue;
    }

    // A multi-byte character is one illegal token, not one per byte.
    let len = input[i..].chars().next().map_or(1, char::len_utf8);
    let token = match c {
      b'+' | b'-' | b'*' | b'/' => Token::word(TokenKind::Op, char::from(c), i, 1),
      b'(' => Token::new(TokenKind::LParen, i, 1),
      b')' => Token::new(TokenKind::RParen, i, 1),
      _ => Token::new(TokenKind::Illegal, i, len),
    };
    push(&mut tokens, token);
    i += len;
  }

  tokens.push(Token::new(TokenKind::Eof, input.len(), 0));
  debug!(count = tokens.len(), "tokenized input");
  Ok(tokens)
}

fn push(tokens: &mut Vec<Token>, token: Token) {
  trace!(%token, loc = token.loc, "token");
  tokens.push(token);
}

/// One line per token, e.g. `NUM: 42` or `SYM: x`.
pub fn dump(tokens: &[Token]) -> String {
  tokens
    .iter()
    .map(|token| format!("{token}\n"))
    .collect()
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token, source: &str) -> String {
  match token.kind {
    TokenKind::Eof => "end of input".to_string(),
    _ => source
      .get(token.loc..token.loc + token.len)
      .map(|text| format!("\"{text}\""))
      .unwrap_or_else(|| token.kind.name().to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
      .unwrap()
      .into_iter()
      .map(|token| token.kind)
      .collect()
  }

  #[test]
  fn tokenize_operator_form() {
    let tokens = tokenize("(+ 12 3)").unwrap();
    assert_eq!(
      tokens,
      vec![
        Token::new(TokenKind::LParen, 0, 1),
        Token::word(TokenKind::Op, "+", 1, 1),
        Token::number(12, 3, 2),
        Token::number(3, 6, 1),
        Token::new(TokenKind::RParen, 7, 1),
        Token::new(TokenKind::Eof, 8, 0),
      ]
    );
  }

  #[test]
  fn tokenize_define_keyword() {
    let tokens = tokenize("(define answer 42)").unwrap();
    assert_eq!(tokens[1].kind, TokenKind::Define);
    assert_eq!(tokens[2], Token::word(TokenKind::Sym, "answer", 8, 6));
    assert_eq!(tokens[3].value, Some(42));
  }

  #[test]
  fn tokenize_define_prefix_is_symbol() {
    assert_eq!(kinds("defined"), vec![TokenKind::Sym, TokenKind::Eof]);
    assert_eq!(kinds("Define"), vec![TokenKind::Sym, TokenKind::Eof]);
  }

  #[test]
  fn tokenize_splits_letters_and_digits() {
    assert_eq!(
      kinds("ab12cd"),
      vec![TokenKind::Sym, TokenKind::Num, TokenKind::Sym, TokenKind::Eof]
    );
  }

  #[test]
  fn tokenize_illegal_bytes_are_carried() {
    assert_eq!(
      kinds("(% 1 2)"),
      vec![
        TokenKind::LParen,
        TokenKind::Illegal,
        TokenKind::Num,
        TokenKind::Num,
        TokenKind::RParen,
        TokenKind::Eof,
      ]
    );
  }

  #[test]
  fn tokenize_multibyte_char_is_one_illegal_token() {
    let tokens = tokenize("(\u{fffd} 1)").unwrap();
    assert_eq!(tokens[1], Token::new(TokenKind::Illegal, 1, 3));
    assert_eq!(tokens[2], Token::number(1, 5, 1));
    assert_eq!(describe_token(&tokens[1], "(\u{fffd} 1)"), "\"\u{fffd}\"");
  }

  #[test]
  fn tokenize_empty_input() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(kinds(" \t\n"), vec![TokenKind::Eof]);
  }

  #[test]
  fn tokenize_number_overflow() {
    let err = tokenize("99999999999999999999").unwrap_err();
    assert!(matches!(err, CompileError::Lex { .. }));
  }

  #[test]
  fn dump_one_line_per_token() {
    let tokens = tokenize("(define x 42)").unwrap();
    assert_eq!(
      dump(&tokens),
      "LPAREN\nDEF: define\nSYM: x\nNUM: 42\nRPAREN\nEOF\n"
    );
  }
}
