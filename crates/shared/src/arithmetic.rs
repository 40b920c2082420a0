//! The four-function arithmetic shared by the service and the client's
//! chained-operator fast path.

use thiserror::Error;

use crate::domain::Operator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Unsupported operation")]
    UnsupportedOperator(String),
    #[error("Result is not a finite number")]
    NonFinite,
}

/// Applies `op` to `a` and `b`.
///
/// Dividing by exactly zero (either sign) fails with
/// [`ArithmeticError::DivisionByZero`]. Results that overflow to infinity are
/// rejected since they cannot be carried in a JSON body.
pub fn evaluate(a: f64, b: f64, op: Operator) -> Result<f64, ArithmeticError> {
    let result = match op {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => {
            if b == 0.0 {
                return Err(ArithmeticError::DivisionByZero);
            }
            a / b
        }
    };

    if !result.is_finite() {
        return Err(ArithmeticError::NonFinite);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_all_four_operations() {
        assert_eq!(evaluate(2.0, 3.0, Operator::Add), Ok(5.0));
        assert_eq!(evaluate(2.0, 3.0, Operator::Subtract), Ok(-1.0));
        assert_eq!(evaluate(2.0, 3.0, Operator::Multiply), Ok(6.0));
        assert_eq!(evaluate(3.0, 2.0, Operator::Divide), Ok(1.5));
    }

    #[test]
    fn division_by_zero_is_distinguishable() {
        assert_eq!(
            evaluate(9.0, 0.0, Operator::Divide),
            Err(ArithmeticError::DivisionByZero)
        );
        assert_eq!(
            evaluate(9.0, -0.0, Operator::Divide),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    fn zero_divided_by_non_zero_is_fine() {
        assert_eq!(evaluate(0.0, 4.0, Operator::Divide), Ok(0.0));
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(
            evaluate(f64::MAX, 10.0, Operator::Multiply),
            Err(ArithmeticError::NonFinite)
        );
    }

    #[test]
    fn error_text_matches_service_detail() {
        assert_eq!(ArithmeticError::DivisionByZero.to_string(), "Division by zero");
        assert_eq!(
            ArithmeticError::UnsupportedOperator("%".into()).to_string(),
            "Unsupported operation"
        );
    }
}
