//! Identity normalizer.
//!
//! Records reach the client from different producers: the spreadsheet may
//! hand back `6`, `"6"`, `6.0` or `" 06 "` for the same bay, and dates either
//! as `YYYY-MM-DD` or as `DD/MM/YYYY`. Every comparison between records goes
//! through the functions below so that those variants compare equal.
//!
//! None of these functions fail: input that is not recognized is returned
//! as-is and comparison degrades to raw string equality.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO date pattern"));

static SLASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid slash date pattern")
});

/// Anything that can be coerced to the text form of a record field.
pub trait FieldText {
    fn field_text(&self) -> String;
}

impl FieldText for str {
    fn field_text(&self) -> String {
        self.to_string()
    }
}

impl FieldText for String {
    fn field_text(&self) -> String {
        self.clone()
    }
}

impl FieldText for u32 {
    fn field_text(&self) -> String {
        self.to_string()
    }
}

impl FieldText for u64 {
    fn field_text(&self) -> String {
        self.to_string()
    }
}

impl FieldText for i64 {
    fn field_text(&self) -> String {
        self.to_string()
    }
}

impl FieldText for Value {
    fn field_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.to_string()
                } else if let Some(u) = n.as_u64() {
                    u.to_string()
                } else {
                    match n.as_f64() {
                        // spreadsheets serialize integer cells as 6.0
                        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
                        _ => n.to_string(),
                    }
                }
            }
            other => other.to_string(),
        }
    }
}

/// Coerce any input to text and strip surrounding whitespace.
pub fn normalize_field<T: FieldText + ?Sized>(raw: &T) -> String {
    raw.field_text().trim().to_string()
}

/// Canonical ISO date (`YYYY-MM-DD`).
///
/// - `2026-02-10` is returned unchanged
/// - `10/02/2026` (day/month/year) becomes `2026-02-10`, zero-padded
/// - anything else is passed through verbatim (trimmed)
pub fn normalize_date<T: FieldText + ?Sized>(raw: &T) -> String {
    let text = normalize_field(raw);

    if ISO_DATE.is_match(&text) {
        return text;
    }

    if let Some(caps) = SLASH_DATE.captures(&text) {
        return format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1]);
    }

    text
}

/// Canonical form of a numeric identity component (bay, seat).
///
/// All-digit values lose their leading zeros (`"06"` → `"6"`); other values
/// are only trimmed.
pub fn normalize_number<T: FieldText + ?Sized>(raw: &T) -> String {
    let text = normalize_field(raw);
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = text.trim_start_matches('0');
        if stripped.is_empty() {
            return "0".to_string();
        }
        return stripped.to_string();
    }
    text
}

/// Loose person-name comparison: trimmed, whitespace-collapsed, case-insensitive.
pub fn same_person(a: &str, b: &str) -> bool {
    let fold = |s: &str| {
        s.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    };
    fold(a) == fold(b)
}
