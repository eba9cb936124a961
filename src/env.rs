use std::collections::HashMap;

use tracing::debug;

/// Symbol table for one session. The REPL keeps a single instance alive
/// across lines; a compile run starts from a fresh one.
#[derive(Debug, Clone, Default)]
pub struct Environment {
  symbols: HashMap<String, i64>,
}

impl Environment {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bind `name`, replacing any previous value.
  pub fn define(&mut self, name: impl Into<String>, value: i64) {
    let name = name.into();
    debug!(%name, value, "define");
    self.symbols.insert(name, value);
  }

  pub fn lookup(&self, name: &str) -> Option<i64> {
    self.symbols.get(name).copied()
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }

  /// Bindings sorted by name.
  pub fn sorted(&self) -> Vec<(&str, i64)> {
    let mut bindings: Vec<_> = self
      .symbols
      .iter()
      .map(|(name, value)| (name.as_str(), *value))
      .collect();
    bindings.sort_unstable_by(|a, b| a.0.cmp(b.0));
    bindings
  }
}
