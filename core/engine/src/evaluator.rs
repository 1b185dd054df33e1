//! FILENAME: core/engine/src/evaluator.rs
//! PURPOSE: Folds a parsed arithmetic AST into a single number.
//! CONTEXT: The rewriter has already replaced every name with a number, so
//! there is nothing to look up here: the tree only holds literals and
//! operators. Division by zero and non-finite results are reported as
//! errors instead of leaking Infinity/NaN into quantities. Recursion is
//! bounded by the parser's nesting limit.

use cotiza_parser::{BinaryOperator, Expression, UnaryOperator};

/// Why an expression could not be reduced to a finite number.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
}

pub type EvalResult = Result<f64, EvalError>;

/// Evaluates an arithmetic expression tree.
pub fn evaluate_expression(expr: &Expression) -> EvalResult {
    let value = match expr {
        Expression::Number(n) => *n,

        Expression::UnaryOp { op, operand } => {
            let v = evaluate_expression(operand)?;
            match op {
                UnaryOperator::Negate => -v,
                UnaryOperator::Plus => v,
            }
        }

        Expression::BinaryOp { left, op, right } => {
            let l = evaluate_expression(left)?;
            let r = evaluate_expression(right)?;
            match op {
                BinaryOperator::Add => l + r,
                BinaryOperator::Subtract => l - r,
                BinaryOperator::Multiply => l * r,
                BinaryOperator::Divide => {
                    if r == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    l / r
                }
            }
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}
