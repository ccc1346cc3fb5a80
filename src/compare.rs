//! Total order over values, used by comparison filters.
//!
//! `null < false < true < numbers < strings < arrays < objects`. Numbers
//! compare by value whatever their representation, so `1 == 1.0`.

use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::FromPrimitive};

use crate::value::Value;

fn rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Boolean(false) => 1,
        Value::Boolean(true) => 2,
        Value::Integer(_) | Value::Float(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

pub fn compare(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)),
        (Value::Integer(a), Value::Float(b)) => compare_int_float(*a, *b),
        (Value::Float(a), Value::Integer(b)) => compare_int_float(*b, *a).reverse(),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b) {
                let ord = compare(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut a_keys: Vec<&String> = a.keys().collect();
            let mut b_keys: Vec<&String> = b.keys().collect();
            a_keys.sort();
            b_keys.sort();

            let ord = a_keys.cmp(&b_keys);
            if ord != Ordering::Equal {
                return ord;
            }
            for key in a_keys {
                let ord = match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => compare(x, y),
                    _ => Ordering::Equal,
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        }
        _ => rank(left).cmp(&rank(right)),
    }
}

/// Exact when both sides fit a decimal, otherwise falls back to `f64`.
fn compare_int_float(a: i64, b: f64) -> Ordering {
    if let Some(ad) = Decimal::from_i64(a)
        && let Some(bd) = Decimal::from_f64(b)
    {
        return ad.cmp(&bd);
    }
    (a as f64).total_cmp(&b)
}
