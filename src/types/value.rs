use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::condition::CompareOp;

/// A dataset cell or a literal from the rule text.
///
/// Tokens are coerced independently: anything that parses as a finite number
/// becomes [`Value::Number`], everything else stays [`Value::Text`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A finite 64-bit floating-point number.
    Number(f64),
    /// A UTF-8 string.
    Text(String),
}

impl Value {
    /// Coerce a raw token. Surrounding whitespace is ignored when deciding
    /// whether the token is numeric, and trimmed from text values.
    #[must_use]
    pub fn coerce(token: &str) -> Value {
        let trimmed = token.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_owned()),
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Compare this value to another using the given operator.
    ///
    /// Equality operators work across types (a number never equals a text).
    /// Returns `None` when an ordering operator is applied to text.
    #[must_use]
    pub fn compare(&self, op: CompareOp, other: &Value) -> Option<bool> {
        match op {
            CompareOp::Eq => Some(self == other),
            CompareOp::Neq => Some(self != other),
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
                let ord = self.as_number()?.partial_cmp(&other.as_number()?)?;
                Some(match op {
                    CompareOp::Gt => ord == Ordering::Greater,
                    CompareOp::Gte => ord != Ordering::Less,
                    CompareOp::Lt => ord == Ordering::Less,
                    _ => ord != Ordering::Greater,
                })
            }
        }
    }

    // -0.0 and 0.0 compare equal, so they must hash equal.
    fn number_bits(n: f64) -> u64 {
        if n == 0.0 {
            0
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

// Values are always finite, so equality is reflexive.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Number(n) => {
                0u8.hash(state);
                Self::number_bits(*n).hash(state);
            }
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn coerce_numbers() {
        assert_eq!(Value::coerce("42"), Value::Number(42.0));
        assert_eq!(Value::coerce(" 3.5 "), Value::Number(3.5));
        assert_eq!(Value::coerce("-7"), Value::Number(-7.0));
        assert_eq!(Value::coerce("1e3"), Value::Number(1000.0));
    }

    #[test]
    fn coerce_text() {
        assert_eq!(Value::coerce("approve"), Value::Text("approve".into()));
        assert_eq!(Value::coerce(" red "), Value::Text("red".into()));
        assert_eq!(Value::coerce("12abc"), Value::Text("12abc".into()));
    }

    #[test]
    fn coerce_rejects_non_finite() {
        assert_eq!(Value::coerce("NaN"), Value::Text("NaN".into()));
        assert_eq!(Value::coerce("inf"), Value::Text("inf".into()));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Number(30.0).to_string(), "30");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Text("red".into()).to_string(), "red");
    }

    #[test]
    fn compare_numbers() {
        let a = Value::Number(10.0);
        let b = Value::Number(20.0);
        assert_eq!(a.compare(CompareOp::Eq, &b), Some(false));
        assert_eq!(a.compare(CompareOp::Neq, &b), Some(true));
        assert_eq!(a.compare(CompareOp::Lt, &b), Some(true));
        assert_eq!(a.compare(CompareOp::Lte, &b), Some(true));
        assert_eq!(a.compare(CompareOp::Gt, &b), Some(false));
        assert_eq!(a.compare(CompareOp::Gte, &b), Some(false));
        assert_eq!(a.compare(CompareOp::Gte, &a), Some(true));
        assert_eq!(a.compare(CompareOp::Lte, &a), Some(true));
    }

    #[test]
    fn compare_text_equality_only() {
        let a = Value::Text("red".into());
        let b = Value::Text("blue".into());
        assert_eq!(a.compare(CompareOp::Eq, &a), Some(true));
        assert_eq!(a.compare(CompareOp::Neq, &b), Some(true));
        assert_eq!(a.compare(CompareOp::Lt, &b), None);
        assert_eq!(a.compare(CompareOp::Gte, &b), None);
    }

    #[test]
    fn compare_mixed_types() {
        let n = Value::Number(1.0);
        let t = Value::Text("1x".into());
        assert_eq!(n.compare(CompareOp::Eq, &t), Some(false));
        assert_eq!(n.compare(CompareOp::Neq, &t), Some(true));
        assert_eq!(n.compare(CompareOp::Gt, &t), None);
    }

    #[test]
    fn signed_zero_hashes_equal() {
        let mut set = HashSet::new();
        set.insert(Value::Number(0.0));
        assert!(set.contains(&Value::Number(-0.0)));
    }
}
