// Built-in rule predicates

use crate::errors::RuleFailure;
use crate::value::parse_float;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9])+([A-Za-z0-9._-])*@([A-Za-z0-9_-])+(\.)+([A-Za-z0-9_-]+)$").unwrap()
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").unwrap());

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(http|https)://[^\s$.?#].[^\s]*$|^www\.[^\s$.?#].[^\s]*$").unwrap()
});

static PRICE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").unwrap());

static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap());

// One- or two-digit hour. Fractional seconds take `.` or `,`.
static CLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2}):([0-9]{2})([.,][0-9]+)?$").unwrap());

/// Control letters accepted at either end of a national ID.
pub const DNI_CONTROL_LETTERS: &str = "TRWAGMYFPDXBNJZSQVHLCKE";

// Presence

/// Value must be non-empty.
pub struct Required;

impl Required {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        if value.is_empty() {
            Err(RuleFailure::Required)
        } else {
            Ok(())
        }
    }
}

// Pattern validators

pub struct IsEmail;

impl IsEmail {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        if !value.is_empty() && EMAIL_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(RuleFailure::InvalidEmail)
        }
    }
}

/// E.164: a `+`, a non-zero digit, then 1 to 14 more digits.
pub struct IsPhone;

impl IsPhone {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        if !value.is_empty() && PHONE_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(RuleFailure::InvalidPhone)
        }
    }
}

/// `http://`, `https://` or `www.` followed by a non-blank host.
pub struct IsUrl;

impl IsUrl {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        if URL_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(RuleFailure::InvalidUrl)
        }
    }
}

/// Digits with an optional one or two digit decimal part.
pub struct IsPrice;

impl IsPrice {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        if PRICE_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(RuleFailure::InvalidPrice)
        }
    }
}

// Numeric validators

pub struct IsInteger;

impl IsInteger {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        value
            .parse::<i64>()
            .map(|_| ())
            .map_err(|_| RuleFailure::InvalidInteger)
    }
}

pub struct IsFloat;

impl IsFloat {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        parse_float::<f64>(value)
            .map(|_| ())
            .ok_or(RuleFailure::InvalidFloat)
    }
}

// Calendar validators

/// `YYYY-MM-DD`, and the day must exist.
pub struct IsDate;

impl IsDate {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        if is_calendar_date(value) {
            Ok(())
        } else {
            Err(RuleFailure::InvalidDate)
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS`
pub struct IsDatetime;

impl IsDatetime {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        let valid = value
            .split_once(' ')
            .is_some_and(|(date, clock)| is_calendar_date(date) && is_clock_time(clock));

        if valid {
            Ok(())
        } else {
            Err(RuleFailure::InvalidDatetime)
        }
    }
}

/// `HH:MM:SS` on a 24 hour clock.
pub struct IsTime;

impl IsTime {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        if is_clock_time(value) {
            Ok(())
        } else {
            Err(RuleFailure::InvalidTime)
        }
    }
}

fn is_calendar_date(value: &str) -> bool {
    let Some(caps) = DATE_REGEX.captures(value) else {
        return false;
    };
    let part = |i: usize| caps[i].parse::<u32>().unwrap_or(0);

    let year = caps[1].parse::<i32>().unwrap_or(0);
    chrono::NaiveDate::from_ymd_opt(year, part(2), part(3)).is_some()
}

fn is_clock_time(value: &str) -> bool {
    let Some(caps) = CLOCK_REGEX.captures(value) else {
        return false;
    };
    let part = |i: usize| caps[i].parse::<u32>().unwrap_or(u32::MAX);

    // chrono would accept :60 as a leap second
    part(1) < 24 && part(2) < 60 && part(3) < 60
}

// Credential validators

/// At least 8 bytes with a letter, a digit and a punctuation or symbol
/// character.
pub struct IsPassword;

impl IsPassword {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        if value.len() < 8 {
            return Err(RuleFailure::InvalidPassword);
        }

        let mut has_letter = false;
        let mut has_digit = false;
        let mut has_special = false;

        for c in value.chars() {
            if c.is_alphabetic() {
                has_letter = true;
            } else if c.is_numeric() {
                has_digit = true;
            } else if is_punct_or_symbol(c) {
                has_special = true;
            }
        }

        if has_letter && has_digit && has_special {
            Ok(())
        } else {
            Err(RuleFailure::InvalidPassword)
        }
    }
}

// Non-ASCII: anything visible that is neither alphanumeric, whitespace nor a mark.
fn is_punct_or_symbol(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_punctuation()
    } else {
        !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control() && !is_combining_mark(c)
    }
}

// Common nonspacing and enclosing mark blocks. Marks attach to the previous character and
// are neither punctuation nor symbols.
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{0483}'..='\u{0489}'
            | '\u{0591}'..='\u{05BD}'
            | '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

// Length validators

/// Minimum length in bytes.
pub struct MinLength(pub usize);

impl MinLength {
    pub fn validate(&self, value: &str) -> Result<(), RuleFailure> {
        if value.len() < self.0 {
            Err(RuleFailure::BelowMinLength(self.0))
        } else {
            Ok(())
        }
    }
}

/// Maximum length in bytes.
pub struct MaxLength(pub usize);

impl MaxLength {
    pub fn validate(&self, value: &str) -> Result<(), RuleFailure> {
        if value.len() > self.0 {
            Err(RuleFailure::ExceedsMaxLength(self.0))
        } else {
            Ok(())
        }
    }
}

// National ID

/// Shape check for Spanish DNI/NIE/NIF style identifiers.
///
/// Nine characters; the first and last may be a digit or a control letter,
/// the seven in between must be digits. The control letter is not checked
/// against the number.
pub struct IsDni;

impl IsDni {
    pub fn validate(value: &str) -> Result<(), RuleFailure> {
        let bytes = value.as_bytes();
        if bytes.len() != 9 {
            return Err(RuleFailure::InvalidNationalId);
        }

        let upper: Vec<u8> = bytes.iter().map(u8::to_ascii_uppercase).collect();
        let edge_ok = |b: u8| b.is_ascii_digit() || DNI_CONTROL_LETTERS.as_bytes().contains(&b);

        if !edge_ok(upper[0]) || !edge_ok(upper[8]) {
            return Err(RuleFailure::InvalidNationalId);
        }
        if !upper[1..8].iter().all(u8::is_ascii_digit) {
            return Err(RuleFailure::InvalidNationalId);
        }

        Ok(())
    }
}
