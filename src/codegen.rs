//! Code generation: lower the expression tree into Z80-style assembly text.
//!
//! This is a textual register-transfer emitter, not a constant folder.
//! Number leaves produce no code and travel upwards as immediates; symbol
//! leaves load their bound value into the next register of the target's
//! pool. `+` lands its result in the first pool register. `-` keeps the
//! reversed `sub <rhs>,<lhs>` form, and `*` and `/` have no lowering yet.

use std::fmt;

use snafu::{OptionExt, ensure};
use tracing::debug;

use crate::env::Environment;
use crate::error::{
  CompileResult, ImmediateOutOfRangeSnafu, RegisterExhaustedSnafu, UnboundSymbolSnafu,
  UnsupportedSnafu,
};
use crate::parser::{BinaryOp, Expr};
use crate::target::AsmTarget;

/// Where the value of an emitted subtree lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
  Imm(i64),
  Reg(&'static str),
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Imm(value) => write!(f, "{value}"),
      Operand::Reg(reg) => f.write_str(reg),
    }
  }
}

/// Emit a complete program for `tree`: prologue, generated code, epilogue.
pub fn generate(env: &Environment, tree: &Expr, target: &AsmTarget) -> CompileResult<String> {
  let mut emitter = Emitter::new(env, target);
  emitter.asm.push_str(&target.header);
  let result = emitter.emit_expr(tree)?;
  emitter.move_to_result(result)?;
  emitter.asm.push_str(&target.footer);
  Ok(emitter.asm)
}

struct Emitter<'a> {
  env: &'a Environment,
  target: &'a AsmTarget,
  /// Index of the next free register in the pool.
  next_reg: usize,
  asm: String,
}

impl<'a> Emitter<'a> {
  fn new(env: &'a Environment, target: &'a AsmTarget) -> Self {
    Self {
      env,
      target,
      next_reg: 0,
      asm: String::new(),
    }
  }

  fn line(&mut self, instruction: String) {
    debug!(%instruction, "emit");
    self.asm.push('\t');
    self.asm.push_str(&instruction);
    self.asm.push('\n');
  }

  fn exhausted(&self) -> RegisterExhaustedSnafu<String> {
    RegisterExhaustedSnafu {
      pool: self.target.registers.join(", "),
    }
  }

  fn alloc(&mut self) -> CompileResult<&'static str> {
    let reg = self
      .target
      .registers
      .get(self.next_reg)
      .copied()
      .with_context(|| self.exhausted())?;
    self.next_reg += 1;
    Ok(reg)
  }

  /// An operator writes the result register, so it must not hold a value
  /// that was live before the operator's subtree started.
  fn check_result_free(&self, live_before: usize) -> CompileResult<()> {
    ensure!(live_before == 0, self.exhausted());
    Ok(())
  }

  /// Only the result register stays held after an operator.
  fn hold_result(&mut self) -> Operand {
    self.next_reg = 1;
    Operand::Reg(self.target.result_register())
  }

  fn emit_expr(&mut self, node: &Expr) -> CompileResult<Operand> {
    match node {
      Expr::Num { value } => {
        check_range(*value)?;
        Ok(Operand::Imm(*value))
      }
      Expr::Sym { name } => {
        let value = self
          .env
          .lookup(name)
          .context(UnboundSymbolSnafu { name })?;
        check_range(value)?;
        let reg = self.alloc()?;
        self.line(format!("ld {reg},{value}"));
        Ok(Operand::Reg(reg))
      }
      Expr::Binary { op, lhs, rhs } => {
        let live_before = self.next_reg;
        let lhs = self.emit_expr(lhs)?;
        let rhs = self.emit_expr(rhs)?;
        self.check_result_free(live_before)?;
        match op {
          BinaryOp::Add => self.emit_add(lhs, rhs),
          BinaryOp::Sub => {
            self.line(format!("sub {rhs},{lhs}"));
            Ok(self.hold_result())
          }
          BinaryOp::Mul | BinaryOp::Div => UnsupportedSnafu { op: op.symbol() }.fail(),
        }
      }
    }
  }

  /// Put an operand in a register, loading immediates into the next free one.
  fn place(&mut self, operand: Operand) -> CompileResult<&'static str> {
    match operand {
      Operand::Reg(reg) => Ok(reg),
      Operand::Imm(value) => {
        let reg = self.alloc()?;
        self.line(format!("ld {reg},{value}"));
        Ok(reg)
      }
    }
  }

  fn emit_add(&mut self, lhs: Operand, rhs: Operand) -> CompileResult<Operand> {
    let lhs = self.place(lhs)?;
    let rhs = self.place(rhs)?;
    let result = self.target.result_register();
    // Addition commutes, so either operand may already sit in the result register.
    let other = if lhs == result {
      rhs
    } else if rhs == result {
      lhs
    } else {
      return Err(self.exhausted().build());
    };
    self.line(format!("add {result},{other}"));
    Ok(self.hold_result())
  }

  /// Leave the final value in the result register for the epilogue.
  fn move_to_result(&mut self, operand: Operand) -> CompileResult<()> {
    let result = self.target.result_register();
    match operand {
      Operand::Imm(value) => self.line(format!("ld {result},{value}")),
      Operand::Reg(reg) if reg == result => {}
      Operand::Reg(reg) => {
        // Register pairs are copied one half at a time.
        for (dst, src) in result.chars().zip(reg.chars()) {
          self.line(format!("ld {dst},{src}"));
        }
      }
    }
    Ok(())
  }
}

fn check_range(value: i64) -> CompileResult<()> {
  ensure!(
    (0..=i64::from(u16::MAX)).contains(&value),
    ImmediateOutOfRangeSnafu { value }
  );
  Ok(())
}
