// Phone number input mask: `010-dddd-dddd`.

use serde::{Deserialize, Serialize};

/// Fixed prefix every phone value starts with.
pub const PHONE_PREFIX: &str = "010-";

/// Maximum displayed length of a masked phone number.
pub const PHONE_MAX_LEN: usize = 13;

/// Digits before the second hyphen.
const MIDDLE_GROUP_LEN: usize = 4;

/// Result of applying one edit to the phone field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneEdit {
    /// Canonical value to show in the field.
    pub value: String,
    /// Cursor position (in characters) after the edit.
    pub cursor: usize,
}

/// Map the full field contents to the canonical masked value.
///
/// Non-digits are dropped, the leading `010` digits are replaced by the
/// literal prefix, a hyphen is inserted after the fourth remaining digit
/// and the result is cut to 13 characters. Never fails.
pub fn format_phone(input: &str) -> String {
    let digits: String = input
        .chars()
        .filter(char::is_ascii_digit)
        .skip(PHONE_PREFIX.len() - 1)
        .collect();

    let mut formatted = String::with_capacity(PHONE_MAX_LEN);
    formatted.push_str(PHONE_PREFIX);
    for (i, digit) in digits.chars().enumerate() {
        if i == MIDDLE_GROUP_LEN {
            formatted.push('-');
        }
        formatted.push(digit);
    }

    formatted.chars().take(PHONE_MAX_LEN).collect()
}

/// Apply an edit to the phone field.
///
/// If the edit removed or altered the `010-` prefix the field resets to the
/// bare prefix with the cursor right after it.
pub fn apply_phone_edit(input: &str) -> PhoneEdit {
    if !input.starts_with(PHONE_PREFIX) {
        return PhoneEdit {
            value: PHONE_PREFIX.to_string(),
            cursor: focus_cursor(),
        };
    }

    let value = format_phone(input);
    let cursor = value.chars().count();
    PhoneEdit { value, cursor }
}

/// Cursor position used when the phone field gains focus.
pub const fn focus_cursor() -> usize {
    PHONE_PREFIX.len()
}
