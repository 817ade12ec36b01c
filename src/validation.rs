//! Input validation for chat-supplied values: item names, amounts,
//! ingredient lines, user references and time values.

use std::fmt;

/// Default cap on item name length (characters).
pub const DEFAULT_MAX_ITEM_NAME_LEN: usize = 64;

/// Reasons a piece of user input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Item names can't be empty")]
    EmptyName,

    #[error("Item names can be at most {max} characters long")]
    NameTooLong { max: usize },

    #[error("I couldn't convert `{0}` into an integer")]
    NotAnInteger(String),

    #[error("`{0}` isn't an ingredient - use the form `5 cat`")]
    InvalidIngredient(String),

    #[error("Ingredient amounts must be at least 1 (got `{0}`)")]
    ZeroIngredientAmount(String),

    #[error("I couldn't convert `{0}` into a time value")]
    InvalidTimeValue(String),
}

/// Neutralise mentions and strip control characters so text can be echoed
/// back into a channel without pinging anyone.
pub fn clean_content(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match candidate.find('>') {
            Some(end) if mention_id(&candidate[..=end]).is_some() => {
                let inner = &candidate[1..end];
                let id: String = inner.chars().filter(|c| c.is_ascii_digit()).collect();
                if inner.starts_with("@&") {
                    out.push_str(&format!("@role-{}", id));
                } else if inner.starts_with('#') {
                    out.push_str(&format!("#{}", id));
                } else {
                    out.push_str(&format!("@{}", id));
                }
                rest = &candidate[end + 1..];
            }
            _ => {
                out.push('<');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);

    out.replace("@everyone", "@\u{200b}everyone")
        .replace("@here", "@\u{200b}here")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect()
}

/// Parse `<@123>`, `<@!123>`, `<@&123>` or `<#123>` into the numeric id.
fn mention_id(token: &str) -> Option<u64> {
    let inner = token.strip_prefix('<')?.strip_suffix('>')?;
    let digits = inner
        .strip_prefix("@!")
        .or_else(|| inner.strip_prefix("@&"))
        .or_else(|| inner.strip_prefix('@'))
        .or_else(|| inner.strip_prefix('#'))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Resolve a user argument given either as a mention or a bare id.
pub fn parse_user_reference(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.starts_with("<#") || trimmed.starts_with("<@&") {
        return None;
    }
    if let Some(id) = mention_id(trimmed) {
        return Some(id);
    }
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return trimmed.parse().ok();
    }
    None
}

/// Canonical item name: cleaned, whitespace collapsed, lowercase.
pub fn clean_item_name(raw: &str, max_len: usize) -> Result<String, ValidationError> {
    let cleaned = clean_content(raw);
    let name = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > max_len {
        return Err(ValidationError::NameTooLong { max: max_len });
    }
    Ok(name)
}

/// Non-negative integer made only of ASCII digits (no sign, no spaces inside).
pub fn parse_amount(raw: &str) -> Result<u64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotAnInteger(clean_content(trimmed)));
    }
    trimmed
        .parse()
        .map_err(|_| ValidationError::NotAnInteger(clean_content(trimmed)))
}

/// Signed integer, used where zero or negative values mean "abort".
pub fn parse_count(raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| ValidationError::NotAnInteger(clean_content(trimmed)))
}

/// Parse an ingredient line such as `5 cat` or `1 pizza slice`.
pub fn parse_ingredient_line(raw: &str, max_name_len: usize) -> Result<(u64, String), ValidationError> {
    let trimmed = raw.trim();
    let Some((amount_str, name)) = trimmed.split_once(char::is_whitespace) else {
        return Err(ValidationError::InvalidIngredient(clean_content(trimmed)));
    };
    let amount = parse_amount(amount_str)?;
    if amount == 0 {
        return Err(ValidationError::ZeroIngredientAmount(clean_content(trimmed)));
    }
    let name = clean_item_name(name, max_name_len)?;
    Ok((amount, name))
}

const UNITS: [(u64, &str, &[&str]); 5] = [
    (604_800, "week", &["w", "week", "weeks"]),
    (86_400, "day", &["d", "day", "days"]),
    (3_600, "hour", &["h", "hr", "hrs", "hour", "hours"]),
    (60, "minute", &["m", "min", "mins", "minute", "minutes"]),
    (1, "second", &["s", "sec", "secs", "second", "seconds"]),
];

/// A span of whole seconds written the way users type it (`1h30m`, `5m`, `2 days`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeValue {
    pub seconds: u64,
}

impl TimeValue {
    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    /// Round a chrono duration up to whole seconds; negatives clamp to zero.
    pub fn from_duration(duration: chrono::Duration) -> Self {
        let millis = duration.num_milliseconds().max(0) as u64;
        Self {
            seconds: millis.div_ceil(1000),
        }
    }

    /// Parse a sequence of `<number><unit>` groups, spaces optional.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTimeValue(clean_content(raw.trim()));
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return Err(invalid());
        }

        let mut total: u64 = 0;
        let mut chars = text.chars().peekable();
        let mut groups = 0usize;
        loop {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            if chars.peek().is_none() {
                break;
            }

            let mut number = String::new();
            while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
                number.push(c);
                chars.next();
            }
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            let mut unit = String::new();
            while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_alphabetic()) {
                unit.push(c);
                chars.next();
            }
            if number.is_empty() || unit.is_empty() {
                return Err(invalid());
            }

            let value: u64 = number.parse().map_err(|_| invalid())?;
            let (scale, _, _) = UNITS
                .iter()
                .find(|(_, _, names)| names.contains(&unit.as_str()))
                .ok_or_else(invalid)?;
            total = value
                .checked_mul(*scale)
                .and_then(|s| total.checked_add(s))
                .ok_or_else(invalid)?;
            groups += 1;
        }

        if groups == 0 {
            return Err(invalid());
        }
        Ok(Self { seconds: total })
    }

    /// Spelled-out form such as `1 hour 30 minutes`.
    pub fn clean_spaced(&self) -> String {
        if self.seconds == 0 {
            return "0 seconds".to_string();
        }
        let mut remaining = self.seconds;
        let mut parts = Vec::new();
        for (scale, name, _) in UNITS {
            let count = remaining / scale;
            if count > 0 {
                let plural = if count == 1 { "" } else { "s" };
                parts.push(format!("{} {}{}", count, name, plural));
                remaining %= scale;
            }
        }
        parts.join(" ")
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clean_spaced())
    }
}
