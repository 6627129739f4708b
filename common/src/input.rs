/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::consts::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("{0} الزامی است")]
    Required(String),
    #[error("{field} نباید بیشتر از {max} کاراکتر باشد")]
    TooLong { field: String, max: usize },
    #[error("شماره موبایل معتبر نیست")]
    InvalidMobile,
    #[error("رمز عبور باید حداقل ۸ کاراکتر باشد")]
    PasswordTooShort,
    #[error("رمز عبور نباید بیشتر از ۱۲۸ کاراکتر باشد")]
    PasswordTooLong,
    #[error("رمز عبور باید شامل حروف و اعداد باشد")]
    PasswordTooSimple,
    #[error("{field} باید بین {min} و {max} باشد")]
    OutOfRange { field: String, min: i64, max: i64 },
    #[error("{0}")]
    Invalid(String),
}

pub fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a port number"))?;

    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

pub fn greater_than_zero<
    T: std::str::FromStr + std::cmp::PartialOrd + std::fmt::Display + Default,
>(
    s: &str,
) -> Result<T, String> {
    let num: T = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid number", s))?;

    if num > T::default() {
        Ok(num)
    } else {
        Err(format!("`{}` is not larger than 0", s))
    }
}

pub fn load_secret(f: &str) -> String {
    let s = std::fs::read_to_string(f).unwrap_or_default();
    s.trim().replace(char::from(25), "")
}

/// Maps Persian (U+06F0..) and Arabic-Indic (U+0660..) digits to ASCII.
pub fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            _ => c,
        })
        .collect()
}

/// Folds the orthographic variants users type for the same Persian word so
/// that text can be compared: Arabic yeh/kaf, ZWNJ, digits, case, spacing.
pub fn normalize_persian(s: &str) -> String {
    let folded: String = normalize_digits(s)
        .chars()
        .map(|c| match c {
            '\u{064A}' | '\u{0649}' => '\u{06CC}',
            '\u{0643}' => '\u{06A9}',
            '\u{200C}' => ' ',
            _ => c,
        })
        .collect();

    folded
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Accepts `09121234567`, `+989121234567`, `00989121234567`, Persian digits
/// and common separators; returns the canonical `09xxxxxxxxx` form.
pub fn normalize_mobile(s: &str) -> Result<String, InputError> {
    let digits: String = normalize_digits(s)
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    let local = if let Some(rest) = digits.strip_prefix("+98") {
        format!("0{}", rest)
    } else if let Some(rest) = digits.strip_prefix("0098") {
        format!("0{}", rest)
    } else if digits.len() == 12 && digits.starts_with("98") {
        format!("0{}", &digits[2..])
    } else if digits.len() == 10 && digits.starts_with('9') {
        format!("0{}", digits)
    } else {
        digits
    };

    if local.len() == 11 && local.starts_with("09") && local.chars().all(|c| c.is_ascii_digit())
    {
        Ok(local)
    } else {
        Err(InputError::InvalidMobile)
    }
}

pub fn validate_password(password: &str) -> Result<(), InputError> {
    let length = password.chars().count();

    if length < 8 {
        return Err(InputError::PasswordTooShort);
    }

    if length > 128 {
        return Err(InputError::PasswordTooLong);
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = normalize_digits(password).chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err(InputError::PasswordTooSimple);
    }

    Ok(())
}

/// Trims `value` and checks it is non-empty and at most `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<String, InputError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(InputError::Required(field.to_string()));
    }

    if value.chars().count() > max {
        return Err(InputError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Like [`require_text`] but empty input maps to `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, InputError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => require_text(field, v, max).map(Some),
    }
}

pub fn validate_title(value: &str) -> Result<String, InputError> {
    require_text("عنوان", value, MAX_TITLE_LENGTH)
}

pub fn validate_content(value: &str) -> Result<String, InputError> {
    require_text("متن", value, MAX_CONTENT_LENGTH)
}

pub fn validate_display_name(value: &str) -> Result<String, InputError> {
    require_text("نام", value, 100)
}

pub fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), InputError> {
    if value < min || value > max {
        return Err(InputError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }

    Ok(())
}

/// Splits a comma separated keyword list, dropping blanks and duplicates.
pub fn parse_keywords(s: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();

    for keyword in s.split([',', '،']).map(str::trim) {
        if !keyword.is_empty() && !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }

    keywords
}

/// Returns a file name safe to use inside an object storage key.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = sanitized.trim_matches('.').to_string();

    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// One-based page number and clamped page size.
pub fn page_bounds(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    (page, per_page)
}
