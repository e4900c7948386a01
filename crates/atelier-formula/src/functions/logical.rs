//! Logical functions

use crate::error::FormulaResult;
use crate::evaluator::Value;

/// IF(condition, if_true, [if_false]) - ternary selection.
/// A missing else-branch yields Empty, which coerces to zero.
pub fn fn_if(args: &[Value]) -> FormulaResult<Value> {
    let condition = &args[0];
    let if_true = &args[1];
    let if_false = args.get(2);

    if condition.is_truthy() {
        Ok(if_true.clone())
    } else {
        Ok(if_false.cloned().unwrap_or(Value::Empty))
    }
}

/// NVL(value, fallback) - the fallback when value is empty or not
/// coercible to a number, otherwise value as a number.
pub fn fn_nvl(args: &[Value]) -> FormulaResult<Value> {
    let value = &args[0];
    let fallback = &args[1];

    match value {
        Value::Empty => Ok(Value::Number(fallback.to_number()?)),
        v => match v.as_number() {
            Some(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Ok(Value::Number(fallback.to_number()?)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_if() {
        assert_eq!(
            fn_if(&[Value::Boolean(true), Value::Number(1.0), Value::Number(2.0)]).unwrap(),
            Value::Number(1.0)
        );
        assert_eq!(
            fn_if(&[Value::Number(0.0), Value::Number(1.0), Value::Number(2.0)]).unwrap(),
            Value::Number(2.0)
        );
        // Two-argument form
        assert_eq!(
            fn_if(&[Value::Boolean(false), Value::Number(1.0)]).unwrap(),
            Value::Empty
        );
    }

    #[test]
    fn test_nvl() {
        assert_eq!(
            fn_nvl(&[Value::Empty, Value::Number(9.0)]).unwrap(),
            Value::Number(9.0)
        );
        assert_eq!(
            fn_nvl(&[Value::Number(2.0), Value::Number(9.0)]).unwrap(),
            Value::Number(2.0)
        );
        assert_eq!(
            fn_nvl(&[Value::Text("n/a".into()), Value::Number(9.0)]).unwrap(),
            Value::Number(9.0)
        );
        assert_eq!(
            fn_nvl(&[Value::Text("4,5".into()), Value::Number(9.0)]).unwrap(),
            Value::Number(4.5)
        );
    }
}
