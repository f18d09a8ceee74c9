//! Arithmetic and comparison kernels used by the specialized variants.

use crate::specialize::{ArithOp, CompareOp};

/// Evaluate a binary operation on two integers.
///
/// Uses wrapping arithmetic: overflow wraps like native fixed-width integers.
#[inline]
pub(crate) fn eval_binary_int(op: ArithOp, left: i64, right: i64) -> i64 {
    match op {
        ArithOp::Add => left.wrapping_add(right),
        ArithOp::Sub => left.wrapping_sub(right),
        ArithOp::Mul => left.wrapping_mul(right),
    }
}

/// Evaluate a binary operation on two floats.
///
/// Follows IEEE 754 semantics (produces inf/nan rather than panicking).
#[inline]
pub(crate) fn eval_binary_float(op: ArithOp, left: f64, right: f64) -> f64 {
    match op {
        ArithOp::Add => left + right,
        ArithOp::Sub => left - right,
        ArithOp::Mul => left * right,
    }
}

#[inline]
pub(crate) fn eval_comparison_int(op: CompareOp, left: i64, right: i64) -> bool {
    match op {
        CompareOp::Lt => left < right,
        CompareOp::Le => left <= right,
        CompareOp::Eq => left == right,
    }
}

#[inline]
pub(crate) fn eval_comparison_float(op: CompareOp, left: f64, right: f64) -> bool {
    match op {
        CompareOp::Lt => left < right,
        CompareOp::Le => left <= right,
        CompareOp::Eq => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_add() {
        assert_eq!(eval_binary_int(ArithOp::Add, 2, 3), 5);
        assert_eq!(eval_binary_int(ArithOp::Add, -5, 3), -2);
    }

    #[test]
    fn test_int_sub() {
        assert_eq!(eval_binary_int(ArithOp::Sub, 10, 4), 6);
        assert_eq!(eval_binary_int(ArithOp::Sub, 3, 10), -7);
    }

    #[test]
    fn test_int_mul() {
        assert_eq!(eval_binary_int(ArithOp::Mul, 3, 4), 12);
        assert_eq!(eval_binary_int(ArithOp::Mul, -2, 5), -10);
    }

    #[test]
    fn test_int_wrapping_overflow() {
        // Test that we wrap on overflow rather than panic
        let result = eval_binary_int(ArithOp::Add, i64::MAX, 1);
        assert_eq!(result, i64::MIN);

        let result = eval_binary_int(ArithOp::Mul, i64::MAX, 2);
        assert_eq!(result, -2);

        let result = eval_binary_int(ArithOp::Sub, i64::MIN, 1);
        assert_eq!(result, i64::MAX);
    }

    #[test]
    fn test_float_add() {
        let result = eval_binary_float(ArithOp::Add, 3.14, 2.0);
        assert!((result - 5.14).abs() < 0.0001);
    }

    #[test]
    fn test_float_overflow_is_infinite() {
        let result = eval_binary_float(ArithOp::Mul, f64::MAX, 2.0);
        assert!(result.is_infinite() && result.is_sign_positive());
    }

    #[test]
    fn test_comparisons() {
        assert!(eval_comparison_int(CompareOp::Lt, 1, 2));
        assert!(!eval_comparison_int(CompareOp::Lt, 2, 2));
        assert!(eval_comparison_int(CompareOp::Le, 2, 2));
        assert!(eval_comparison_float(CompareOp::Eq, 0.5, 0.5));
        assert!(!eval_comparison_float(CompareOp::Lt, f64::NAN, 1.0));
    }
}
