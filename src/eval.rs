//! Tree-walking evaluator reducing an expression to an `i64`.

use snafu::{OptionExt, ensure};

use crate::env::Environment;
use crate::error::{ArithmeticOverflowSnafu, CompileResult, DivideByZeroSnafu, UnboundSymbolSnafu};
use crate::parser::{BinaryOp, Expr};

/// Evaluate a parsed tree. A missing tree evaluates to `0`.
pub fn evaluate(env: &Environment, tree: Option<&Expr>) -> CompileResult<i64> {
  match tree {
    Some(node) => eval_expr(env, node),
    None => Ok(0),
  }
}

fn eval_expr(env: &Environment, node: &Expr) -> CompileResult<i64> {
  match node {
    Expr::Num { value } => Ok(*value),
    Expr::Sym { name } => env.lookup(name).context(UnboundSymbolSnafu { name }),
    Expr::Binary { op, lhs, rhs } => {
      let lhs = eval_expr(env, lhs)?;
      let rhs = eval_expr(env, rhs)?;
      apply(*op, lhs, rhs)
    }
  }
}

/// Apply `op` to two already evaluated operands. Division truncates toward
/// zero.
pub fn apply(op: BinaryOp, lhs: i64, rhs: i64) -> CompileResult<i64> {
  if op == BinaryOp::Div {
    ensure!(rhs != 0, DivideByZeroSnafu { lhs });
  }

  let result = match op {
    BinaryOp::Add => lhs.checked_add(rhs),
    BinaryOp::Sub => lhs.checked_sub(rhs),
    BinaryOp::Mul => lhs.checked_mul(rhs),
    BinaryOp::Div => lhs.checked_div(rhs),
  };
  result.context(ArithmeticOverflowSnafu {
    op: op.symbol(),
    lhs,
    rhs,
  })
}
