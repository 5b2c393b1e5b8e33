//! Tagged representation of a product values document.
//!
//! A document is split into four sections. Values under the channel sections
//! are tagged once, at decode time, as either a plain [`Scalar`] or a
//! currency-keyed map, so the comparison code never has to re-inspect shapes.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Fields of one channel (or one channel/locale pair), in document order.
pub type FieldMap = IndexMap<String, FieldValue>;

/// A leaf value of a product values document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    /// The value used whenever one side of a comparison is absent.
    pub fn empty() -> Self {
        Scalar::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_empty()
    }

    /// Printed form of the value, used for equality and for category joins.
    ///
    /// Integral floats print without a fraction (`10.0` → `"10"`), large or
    /// tiny floats in exponent form (`1e20` → `"1.0E+20"`), `true`
    /// prints as `"1"` and `false` as the empty string.
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Bool(true) => "1".to_string(),
            Scalar::Bool(false) => String::new(),
            Scalar::Number(n) => format_number(n),
            Scalar::Text(s) => s.clone(),
        }
    }

    /// Loose equality: two scalars are equal when they print the same.
    pub fn loosely_equals(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => self.as_text() == other.as_text(),
        }
    }

    /// Returns a short display form of the value, truncated to `max_len` characters.
    pub fn preview(&self, max_len: usize) -> String {
        let preview = match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => format_number(n),
            Scalar::Text(s) => format!("\"{}\"", s),
        };

        if preview.chars().count() > max_len {
            let kept: String = preview.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        } else {
            preview
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => format_float(f),
        None => n.to_string(),
    }
}

/// Prints a float with 14 significant digits, switching to `1.0E+20` style
/// when the decimal exponent is below -4 or above 13. Integral values print
/// without a fraction and negative zero keeps its sign.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let sci = format!("{:.13e}", f.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return f.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return f.to_string();
    };

    let mut digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
    }
    let decpt = exponent + 1;

    let body = if decpt < -3 || decpt > 14 {
        let (first, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}.{}E{}{}", first, rest, sign, exponent.abs())
    } else if decpt <= 0 {
        format!("0.{}{}", "0".repeat(decpt.unsigned_abs() as usize), digits)
    } else {
        let decpt = decpt as usize;
        if digits.len() <= decpt {
            format!("{}{}", digits, "0".repeat(decpt - digits.len()))
        } else {
            format!("{}.{}", &digits[..decpt], &digits[decpt..])
        }
    };

    if f.is_sign_negative() {
        format!("-{}", body)
    } else {
        body
    }
}

/// A field value under `channel_specific` or `channel_locale_specific`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(Scalar),
    /// Amounts keyed by currency code, e.g. `{"USD": "100", "EUR": "90"}`.
    CurrencyMap(IndexMap<String, Scalar>),
}

impl FieldValue {
    /// Collapses the value to a scalar. A currency map becomes its compact
    /// JSON text so that a scalar/map mismatch still compares unequal.
    pub fn as_scalar(&self) -> Scalar {
        match self {
            FieldValue::Scalar(s) => s.clone(),
            FieldValue::CurrencyMap(map) => Scalar::Text(
                serde_json::to_string(map).unwrap_or_default(),
            ),
        }
    }

    /// Amount for `currency`, if this is a currency map holding it.
    pub fn amount(&self, currency: &str) -> Option<&Scalar> {
        match self {
            FieldValue::CurrencyMap(map) => map.get(currency),
            FieldValue::Scalar(_) => None,
        }
    }
}

impl From<Scalar> for FieldValue {
    fn from(s: Scalar) -> Self {
        FieldValue::Scalar(s)
    }
}

/// Top-level sections of a document, in merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Common,
    Categories,
    ChannelSpecific,
    ChannelLocaleSpecific,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Common,
        Section::Categories,
        Section::ChannelSpecific,
        Section::ChannelLocaleSpecific,
    ];

    /// Key of the section in the encoded document.
    pub fn key(&self) -> &'static str {
        match self {
            Section::Common => "common",
            Section::Categories => "categories",
            Section::ChannelSpecific => "channel_specific",
            Section::ChannelLocaleSpecific => "channel_locale_specific",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Section::Common => "common",
            Section::Categories => "categories",
            Section::ChannelSpecific => "channel-specific",
            Section::ChannelLocaleSpecific => "channel-locale-specific",
        }
    }
}

/// One product's editable values at one point in time.
///
/// Every section defaults to empty; an absent section and an empty one are
/// indistinguishable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductValues {
    pub common: IndexMap<String, Scalar>,
    pub categories: Vec<Scalar>,
    /// channel → field → value
    pub channel_specific: IndexMap<String, FieldMap>,
    /// channel → locale → field → value
    pub channel_locale_specific: IndexMap<String, IndexMap<String, FieldMap>>,
}

impl ProductValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.common.is_empty()
            && self.categories.is_empty()
            && self.channel_specific.is_empty()
            && self.channel_locale_specific.is_empty()
    }

    pub fn with_common(mut self, field: &str, value: impl Into<Scalar>) -> Self {
        self.common.insert(field.to_string(), value.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<Scalar>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn with_channel_value(
        mut self,
        channel: &str,
        field: &str,
        value: impl Into<Scalar>,
    ) -> Self {
        self.channel_specific
            .entry(channel.to_string())
            .or_default()
            .insert(field.to_string(), FieldValue::Scalar(value.into()));
        self
    }

    pub fn with_channel_amount(
        mut self,
        channel: &str,
        field: &str,
        currency: &str,
        amount: impl Into<Scalar>,
    ) -> Self {
        let fields = self
            .channel_specific
            .entry(channel.to_string())
            .or_default();
        insert_amount(fields, field, currency, amount.into());
        self
    }

    pub fn with_locale_value(
        mut self,
        channel: &str,
        locale: &str,
        field: &str,
        value: impl Into<Scalar>,
    ) -> Self {
        self.channel_locale_specific
            .entry(channel.to_string())
            .or_default()
            .entry(locale.to_string())
            .or_default()
            .insert(field.to_string(), FieldValue::Scalar(value.into()));
        self
    }

    pub fn with_locale_amount(
        mut self,
        channel: &str,
        locale: &str,
        field: &str,
        currency: &str,
        amount: impl Into<Scalar>,
    ) -> Self {
        let fields = self
            .channel_locale_specific
            .entry(channel.to_string())
            .or_default()
            .entry(locale.to_string())
            .or_default();
        insert_amount(fields, field, currency, amount.into());
        self
    }
}

// A scalar already stored under `field` is replaced by a fresh currency map.
fn insert_amount(fields: &mut FieldMap, field: &str, currency: &str, amount: Scalar) {
    let entry = fields
        .entry(field.to_string())
        .or_insert_with(|| FieldValue::CurrencyMap(IndexMap::new()));
    if matches!(entry, FieldValue::Scalar(_)) {
        *entry = FieldValue::CurrencyMap(IndexMap::new());
    }
    if let FieldValue::CurrencyMap(map) = entry {
        map.insert(currency.to_string(), amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text_forms() {
        assert_eq!(Scalar::from("abc").as_text(), "abc");
        assert_eq!(Scalar::from(10).as_text(), "10");
        assert_eq!(Scalar::from(true).as_text(), "1");
        assert_eq!(Scalar::from(false).as_text(), "");
        assert_eq!(Scalar::empty().as_text(), "");
    }

    #[test]
    fn test_integral_float_prints_as_integer() {
        let n = serde_json::Number::from_f64(10.0).unwrap();
        assert_eq!(Scalar::Number(n).as_text(), "10");

        let n = serde_json::Number::from_f64(10.5).unwrap();
        assert_eq!(Scalar::Number(n).as_text(), "10.5");
    }

    #[test]
    fn test_float_text_forms() {
        assert_eq!(format_float(1e20), "1.0E+20");
        assert_eq!(format_float(-0.0), "-0");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(1e-5), "1.0E-5");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(1e13), "10000000000000");
        assert_eq!(format_float(1e14), "1.0E+14");
        assert_eq!(format_float(1.5e20), "1.5E+20");
        assert_eq!(format_float(0.1 + 0.2), "0.3");
        assert_eq!(format_float(1.0 / 3.0), "0.33333333333333");
    }

    #[test]
    fn test_large_float_equals_its_exponent_text() {
        let n = serde_json::Number::from_f64(1e20).unwrap();
        assert!(Scalar::Number(n).loosely_equals(&Scalar::from("1.0E+20")));
        assert!(!Scalar::Number(serde_json::Number::from_f64(1e20).unwrap())
            .loosely_equals(&Scalar::from("100000000000000000000")));
    }

    #[test]
    fn test_loose_equality() {
        assert!(Scalar::from("10").loosely_equals(&Scalar::from(10)));
        assert!(Scalar::from(false).loosely_equals(&Scalar::empty()));
        assert!(!Scalar::from("10").loosely_equals(&Scalar::from("10.0")));
        assert!(!Scalar::from("a").loosely_equals(&Scalar::from("b")));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let s = Scalar::from("héllo wörld");
        assert_eq!(s.preview(8), "\"héll...");
        assert_eq!(Scalar::from(true).preview(80), "true");
    }

    #[test]
    fn test_currency_map_as_scalar() {
        let doc = ProductValues::new().with_channel_amount("web", "price", "USD", "100");
        let value = &doc.channel_specific["web"]["price"];
        assert_eq!(value.as_scalar().as_text(), r#"{"USD":"100"}"#);
        assert_eq!(value.amount("USD"), Some(&Scalar::from("100")));
        assert_eq!(value.amount("EUR"), None);
    }

    #[test]
    fn test_builder_keeps_insertion_order() {
        let doc = ProductValues::new()
            .with_common("sku", "A1")
            .with_common("color", "red")
            .with_common("brand", "acme");
        let keys: Vec<&String> = doc.common.keys().collect();
        assert_eq!(keys, vec!["sku", "color", "brand"]);
    }

    #[test]
    fn test_section_keys() {
        let keys: Vec<&str> = Section::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(
            keys,
            vec!["common", "categories", "channel_specific", "channel_locale_specific"]
        );
    }
}
