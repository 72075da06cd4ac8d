#![forbid(unsafe_code)]

//! The state tree value model.
//!
//! A [`Value`] is an arbitrarily nested tree of mappings and sequences with
//! scalar leaves. It mirrors the data shapes an application hands to a
//! binding session: numbers, strings, booleans, `null`, and `undefined`.
//!
//! # Conversion rules
//!
//! The binding layer moves values between the state tree and a rendered
//! document, where everything is text. The conversions used for that are
//! spelled out here rather than left to ambient semantics:
//!
//! | Operation | Rule |
//! |-----------|------|
//! | [`Value::truthy`] | `false`, `0`, `NaN`, `""`, `null`, `undefined` are falsy; everything else is truthy |
//! | [`Value::to_display_string`] | integral numbers print without a fraction, `NaN`/`Infinity` by name, arrays join with `,`, objects print `[object Object]` |
//! | [`Value::from_literal`] | `undefined`, `null`, `true`, `false`, then the [`parse_float`] prefix, else the raw text |
//! | [`Value::to_number`] | whole-string numeric conversion; `""` is `0`, `null` is `0`, booleans are `0`/`1` |
//!
//! # Invariants
//!
//! 1. Equality is structural. Two `NaN` numbers are never equal.
//! 2. `from_literal` never fails; the raw text is the fallback.
//! 3. `parse_float` returns `NaN` exactly when the text has no numeric prefix.

use std::collections::BTreeMap;
use std::fmt;

/// Keyed children of an object node.
pub type Map = BTreeMap<String, Value>;

/// A node in the state tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value at all. Distinct from `Null`.
    #[default]
    Undefined,
    /// Explicit absence of a value.
    Null,
    /// Boolean leaf.
    Bool(bool),
    /// Numeric leaf. All numbers are double precision.
    Number(f64),
    /// Text leaf.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// String-keyed mapping.
    Object(Map),
}

impl Value {
    /// Build an object from key/value pairs.
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an array from items.
    pub fn array<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Coerce a literal token.
    ///
    /// ```
    /// use bindery_core::Value;
    ///
    /// assert_eq!(Value::from_literal("true"), Value::Bool(true));
    /// assert_eq!(Value::from_literal("18"), Value::Number(18.0));
    /// assert_eq!(Value::from_literal("admin"), Value::String("admin".into()));
    /// ```
    #[must_use]
    pub fn from_literal(raw: &str) -> Self {
        match raw {
            "undefined" => Self::Undefined,
            "null" => Self::Null,
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => {
                let number = parse_float(raw);
                if number.is_nan() {
                    Self::String(raw.to_string())
                } else {
                    Self::Number(number)
                }
            }
        }
    }

    /// Whether this is an array or an object.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Whether this is `null` or `undefined`.
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Short type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Truthiness used for class toggling and checkbox state.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) => true,
        }
    }

    /// Text form written into the document.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// Whole-value numeric conversion.
    ///
    /// Unlike [`parse_float`], trailing garbage yields `NaN`.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined | Self::Object(_) => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
            Self::Array(items) => match items.as_slice() {
                [] => 0.0,
                [single] => string_to_number(&single.to_display_string()),
                _ => f64::NAN,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    // Nullish elements render empty inside a joined array.
                    if !item.is_nullish() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Self::Object(_) => f.write_str("[object Object]"),
        }
    }
}

/// Format a number the way the document layer expects to see it.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form outside the fixed-notation range, with an explicit
        // `+` on positive exponents: `1e+21`, `1.5e-7`.
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        format!("{n}")
    }
}

/// Length in bytes of the longest numeric prefix of `s`, if any.
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// optional exponent. `Infinity` is handled by the callers.
fn numeric_prefix_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < len && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < len && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - (end + 1);
        if digits + frac_digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < len && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < len && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < len && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    Some(end)
}

fn signed_infinity(s: &str) -> Option<f64> {
    match s.strip_prefix('-') {
        Some(rest) if rest.starts_with("Infinity") => Some(f64::NEG_INFINITY),
        _ => {
            let rest = s.strip_prefix('+').unwrap_or(s);
            rest.starts_with("Infinity").then_some(f64::INFINITY)
        }
    }
}

/// Parse the longest leading floating-point number of `raw`.
///
/// Leading whitespace is skipped and trailing text ignored, so `"18px"`
/// parses as `18`. Returns `NaN` when there is no numeric prefix.
#[must_use]
pub fn parse_float(raw: &str) -> f64 {
    let s = raw.trim_start();
    if let Some(inf) = signed_infinity(s) {
        return inf;
    }
    match numeric_prefix_len(s) {
        Some(end) => s[..end].parse::<f64>().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

fn string_to_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    if let Some(inf) = signed_infinity(s) {
        let bare = s.trim_start_matches(['+', '-']);
        return if bare == "Infinity" { inf } else { f64::NAN };
    }
    match numeric_prefix_len(s) {
        Some(end) if end == s.len() => s.parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Object(map)
    }
}

#[cfg(feature = "serde")]
mod serde_support {
    use super::{Map, Value};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl From<serde_json::Value> for Value {
        fn from(json: serde_json::Value) -> Self {
            match json {
                serde_json::Value::Null => Self::Null,
                serde_json::Value::Bool(b) => Self::Bool(b),
                serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
                serde_json::Value::String(s) => Self::String(s),
                serde_json::Value::Array(items) => {
                    Self::Array(items.into_iter().map(Value::from).collect())
                }
                serde_json::Value::Object(map) => Self::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, Value::from(v)))
                        .collect::<Map>(),
                ),
            }
        }
    }

    impl From<&Value> for serde_json::Value {
        fn from(value: &Value) -> Self {
            match value {
                // JSON has no `undefined`; it collapses to null.
                Value::Undefined | Value::Null => Self::Null,
                Value::Bool(b) => Self::Bool(*b),
                Value::Number(n) => json_number(*n).map_or(Self::Null, Self::Number),
                Value::String(s) => Self::String(s.clone()),
                Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
                Value::Object(map) => Self::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), Self::from(v)))
                        .collect(),
                ),
            }
        }
    }

    /// Integral numbers inside the exact `f64` range serialize as JSON
    /// integers, so `1` round-trips as `1` rather than `1.0`.
    fn json_number(n: f64) -> Option<serde_json::Number> {
        const EXACT: f64 = 9_007_199_254_740_992.0;
        if n.fract() == 0.0 && n.abs() <= EXACT {
            if n >= 0.0 {
                return Some(serde_json::Number::from(n as u64));
            }
            return Some(serde_json::Number::from(n as i64));
        }
        serde_json::Number::from_f64(n)
    }

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serde_json::Value::from(self).serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Value {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            serde_json::Value::deserialize(deserializer).map(Value::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_keywords() {
        assert_eq!(Value::from_literal("undefined"), Value::Undefined);
        assert_eq!(Value::from_literal("null"), Value::Null);
        assert_eq!(Value::from_literal("true"), Value::Bool(true));
        assert_eq!(Value::from_literal("false"), Value::Bool(false));
    }

    #[test]
    fn literal_numeric_prefix() {
        assert_eq!(Value::from_literal("18"), Value::Number(18.0));
        assert_eq!(Value::from_literal("-2.5e2"), Value::Number(-250.0));
        assert_eq!(Value::from_literal("3px"), Value::Number(3.0));
        assert_eq!(Value::from_literal("NaN"), Value::String("NaN".into()));
        assert_eq!(Value::from_literal("admin"), Value::String("admin".into()));
    }

    #[test]
    fn parse_float_edges() {
        assert_eq!(parse_float("  42"), 42.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("5."), 5.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("-Infinity and beyond"), f64::NEG_INFINITY);
        assert!(parse_float(".").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float("e5").is_nan());
    }

    #[test]
    fn to_number_is_whole_string() {
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from(" 12 ").to_number(), 12.0);
        assert_eq!(Value::from("0x1f").to_number(), 31.0);
        assert!(Value::from("12px").to_number().is_nan());
        assert!(Value::from("inf").to_number().is_nan());
        assert_eq!(Value::Null.to_number(), 0.0);
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::array([7]).to_number(), 7.0);
    }

    #[test]
    fn truthiness_table() {
        for falsy in [
            Value::Bool(false),
            Value::Number(0.0),
            Value::Number(f64::NAN),
            Value::from(""),
            Value::Null,
            Value::Undefined,
        ] {
            assert!(!falsy.truthy(), "{falsy:?} should be falsy");
        }
        for truthy in [
            Value::Bool(true),
            Value::Number(-1.0),
            Value::from("0"),
            Value::Array(Vec::new()),
            Value::Object(Map::new()),
        ] {
            assert!(truthy.truthy(), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn display_matches_document_text() {
        assert_eq!(Value::Number(1.0).to_display_string(), "1");
        assert_eq!(Value::Number(1.5).to_display_string(), "1.5");
        assert_eq!(Value::Number(-0.0).to_display_string(), "0");
        assert_eq!(Value::Number(f64::INFINITY).to_display_string(), "Infinity");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(Value::array([1, 2]).to_display_string(), "1,2");
        assert_eq!(
            Value::Array(vec![Value::Null, Value::from("a")]).to_display_string(),
            ",a"
        );
        assert_eq!(
            Value::object([("a", 1)]).to_display_string(),
            "[object Object]"
        );
    }

    #[test]
    fn nan_is_never_equal() {
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_conversion_keeps_shape() {
        let json = serde_json::json!({"user": {"name": "Alice", "tags": [1, true, null]}});
        let value = Value::from(json.clone());
        assert_eq!(serde_json::Value::from(&value), json);
    }
}
