//! Formatting helpers shared by the ranking displays. All of them are total:
//! malformed input turns into a placeholder, never an error.

use std::fmt;

pub const PLACEHOLDER: &str = "-";

/// Visual treatment of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

/// Local part of an email address, used as the display id of a person.
pub fn display_id(email: Option<&str>) -> String {
    match email.map(str::trim) {
        Some(email) if !email.is_empty() => {
            let local = email.split('@').next().unwrap_or_default();
            if local.is_empty() {
                PLACEHOLDER.to_string()
            } else {
                local.to_string()
            }
        }
        _ => PLACEHOLDER.to_string(),
    }
}

/// `2024-05-01T03:15:22Z` -> `2024-05-01 03:15`.
pub fn format_timestamp(value: Option<&str>) -> String {
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() && !v.eq_ignore_ascii_case("none") => v,
        _ => return PLACEHOLDER.to_string(),
    };

    let minute_precision: String = value.chars().take(16).collect();
    minute_precision.replacen('T', " ", 1)
}

/// Counter with thousands separators, `1234567` -> `1,234,567`.
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Signed feedback rating cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBadge {
    pub value: i64,
}

impl RatingBadge {
    pub fn new(value: i64) -> Self {
        Self { value }
    }

    pub fn tone(&self) -> Tone {
        match self.value {
            v if v > 0 => Tone::Positive,
            v if v < 0 => Tone::Negative,
            _ => Tone::Neutral,
        }
    }
}

impl fmt::Display for RatingBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value > 0 {
            write!(f, "+{}", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// Yes/No indicator for boolean flags such as `is_active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub active: bool,
}

impl StatusBadge {
    pub fn new(active: bool) -> Self {
        Self { active }
    }

    pub fn label(&self) -> &'static str {
        if self.active {
            "Yes"
        } else {
            "No"
        }
    }

    pub fn tone(&self) -> Tone {
        if self.active {
            Tone::Positive
        } else {
            Tone::Neutral
        }
    }
}

impl fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
