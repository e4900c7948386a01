//! Numeric functions

use crate::error::FormulaResult;
use crate::evaluator::Value;

/// CEIL(x) - round up to the next integer
pub fn fn_ceil(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Number(args[0].to_number()?.ceil()))
}

/// FLOOR(x) - round down to the previous integer
pub fn fn_floor(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Number(args[0].to_number()?.floor()))
}

/// ROUND(x, [digits]) - round half away from zero
pub fn fn_round(args: &[Value]) -> FormulaResult<Value> {
    let x = args[0].to_number()?;
    let digits = match args.get(1) {
        Some(d) => d.to_number()?.trunc() as i32,
        None => 0,
    };

    let factor = 10f64.powi(digits);
    Ok(Value::Number((x * factor).round() / factor))
}

/// ABS(x) - absolute value
pub fn fn_abs(args: &[Value]) -> FormulaResult<Value> {
    Ok(Value::Number(args[0].to_number()?.abs()))
}

/// MIN(a, ...) - smallest argument
pub fn fn_min(args: &[Value]) -> FormulaResult<Value> {
    let mut min = f64::INFINITY;
    for arg in args {
        min = min.min(arg.to_number()?);
    }
    Ok(Value::Number(min))
}

/// MAX(a, ...) - largest argument
pub fn fn_max(args: &[Value]) -> FormulaResult<Value> {
    let mut max = f64::NEG_INFINITY;
    for arg in args {
        max = max.max(arg.to_number()?);
    }
    Ok(Value::Number(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_floor() {
        assert_eq!(fn_ceil(&[Value::Number(3.2)]).unwrap(), Value::Number(4.0));
        assert_eq!(fn_ceil(&[Value::Number(-3.2)]).unwrap(), Value::Number(-3.0));
        assert_eq!(fn_floor(&[Value::Number(3.8)]).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_round() {
        assert_eq!(fn_round(&[Value::Number(2.5)]).unwrap(), Value::Number(3.0));
        assert_eq!(fn_round(&[Value::Number(2.4)]).unwrap(), Value::Number(2.0));
        assert_eq!(
            fn_round(&[Value::Number(80.25), Value::Number(1.0)]).unwrap(),
            Value::Number(80.3)
        );
    }

    #[test]
    fn test_min_max() {
        let args = [Value::Number(5.0), Value::Number(2.0), Value::Number(8.0)];
        assert_eq!(fn_min(&args).unwrap(), Value::Number(2.0));
        assert_eq!(fn_max(&args).unwrap(), Value::Number(8.0));
    }
}
