/// Program template and register pool the emitter writes against.
#[derive(Debug, Clone)]
pub struct AsmTarget {
  pub header: String,
  pub footer: String,
  /// Allocation order; the first register also holds the result.
  pub registers: Vec<&'static str>,
}

const TI83_HEADER: &str = "\
.nolist
#include \"ti83plus.inc\"
.list
.org 9D93h
.db $BB,$6D
\tbcall(_ClrLCDFull)
\tld a,0
\tld (CURCOL),a
\tld (CURROW),a
";

const TI83_FOOTER: &str = "\
\tbcall(_DispHL)
\tbcall(_NewLine)
\tret
.end
.end
";

impl AsmTarget {
  /// TI-83 Plus assembly program: clears the screen, runs the generated
  /// code and prints `hl`.
  pub fn ti83plus() -> Self {
    Self {
      header: TI83_HEADER.to_string(),
      footer: TI83_FOOTER.to_string(),
      registers: vec!["hl", "bc"],
    }
  }

  pub fn result_register(&self) -> &'static str {
    self.registers.first().copied().unwrap_or("hl")
  }
}

impl Default for AsmTarget {
  fn default() -> Self {
    Self::ti83plus()
  }
}
