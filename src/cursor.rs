use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{EOF_TOKEN, Token, TokenKind, describe_token};

/// Forward-only cursor over the token vector. This is the only way the
/// parser reads tokens.
pub struct TokenCursor<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
}

impl<'a> TokenCursor<'a> {
  /// Take ownership of the token stream; `source` is kept for diagnostics.
  pub fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
    }
  }

  pub fn source(&self) -> &'a str {
    self.source
  }

  /// Current token, or the `Eof` sentinel once past the end.
  pub fn peek(&self) -> &Token {
    self.tokens.get(self.pos).unwrap_or(&EOF_TOKEN)
  }

  /// Consume the current token if it has the given kind.
  pub fn equal(&mut self, kind: TokenKind) -> bool {
    if self.peek().kind == kind {
      self.advance();
      return true;
    }
    false
  }

  pub fn advance(&mut self) {
    if self.pos < self.tokens.len() {
      self.pos += 1;
    }
  }

  pub fn is_eof(&self) -> bool {
    self.peek().is_eof()
  }

  /// Like `equal`, but a mismatch is a syntax error.
  pub fn skip(&mut self, kind: TokenKind, what: &str) -> CompileResult<()> {
    if self.equal(kind) {
      Ok(())
    } else {
      Err(self.unexpected(what))
    }
  }

  /// Consume a number token and return its value.
  pub fn get_number(&mut self) -> CompileResult<i64> {
    let token = self.peek();
    if token.kind == TokenKind::Num
      && let Some(value) = token.value
    {
      self.advance();
      return Ok(value);
    }
    Err(self.unexpected("a number"))
  }

  /// Consume a symbol token and return its name.
  pub fn get_symbol(&mut self) -> CompileResult<String> {
    let token = self.peek();
    if token.kind == TokenKind::Sym
      && let Some(word) = token.word.clone()
    {
      self.advance();
      return Ok(word);
    }
    Err(self.unexpected("a symbol"))
  }

  /// Syntax error pointing at the current token.
  pub fn unexpected(&self, expected: &str) -> CompileError {
    let token = self.peek();
    let got = describe_token(token, self.source);
    let message = if token.kind == TokenKind::Illegal {
      format!("illegal character {got}, expected {expected}")
    } else {
      format!("expected {expected}, but got {got}")
    };
    CompileError::parse_at(self.source, token.loc, message)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tokenizer::tokenize;

  fn cursor(source: &str) -> TokenCursor<'_> {
    TokenCursor::new(tokenize(source).unwrap(), source)
  }

  #[test]
  fn equal_only_advances_on_match() {
    let mut cursor = cursor("(+ 1 2)");
    assert!(!cursor.equal(TokenKind::Op));
    assert!(cursor.equal(TokenKind::LParen));
    assert_eq!(cursor.peek().word.as_deref(), Some("+"));
  }

  #[test]
  fn peek_past_end_yields_sentinel() {
    let mut cursor = cursor("x");
    cursor.advance();
    assert!(cursor.is_eof());
    for _ in 0..5 {
      cursor.advance();
      assert_eq!(cursor.peek().kind, TokenKind::Eof);
    }
    assert!(cursor.equal(TokenKind::Eof));
    assert!(cursor.is_eof());
  }

  #[test]
  fn empty_vector_yields_sentinel() {
    let cursor = TokenCursor::new(Vec::new(), "");
    assert_eq!(cursor.peek(), &EOF_TOKEN);
  }

  #[test]
  fn getters_report_mismatch() {
    let mut cursor = cursor("x 7");
    assert!(cursor.get_number().is_err());
    assert_eq!(cursor.get_symbol().unwrap(), "x");
    assert_eq!(cursor.get_number().unwrap(), 7);
    let err = cursor.get_symbol().unwrap_err();
    assert_eq!(err.message(), Some("expected a symbol, but got end of input"));
  }

  #[test]
  fn illegal_tokens_are_named() {
    let mut cursor = cursor("?");
    let err = cursor.skip(TokenKind::LParen, "\"(\"").unwrap_err();
    assert_eq!(
      err.message(),
      Some("illegal character \"?\", expected \"(\"")
    );
  }
}
