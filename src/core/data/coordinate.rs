use serde::{Deserialize, Serialize};

/// Relative tolerance used when comparing floating coordinates and scales.
pub const COORDINATE_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateParseError {
    #[error("coordinate text is empty")]
    Empty,
    #[error("coordinate text '{text}' has no digits")]
    NoDigits { text: String },
    #[error("unexpected character '{found}' in coordinate text '{text}'")]
    UnexpectedCharacter { text: String, found: char },
    #[error("exponent in coordinate text '{text}' is out of range")]
    ExponentOutOfRange { text: String },
}

/// Decimal text split into sign, significant digits and a power-of-ten exponent.
///
/// The represented value is `(-1)^negative * digits * 10^exponent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalParts {
    pub negative: bool,
    pub digits: String,
    pub exponent: i32,
}

pub fn parse_decimal(text: &str) -> Result<DecimalParts, CoordinateParseError> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(CoordinateParseError::Empty);
    }

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (mantissa, exponent_text) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };

    let mut digits = String::with_capacity(mantissa.len());
    let mut fraction_digits: i32 = 0;
    let mut seen_point = false;

    for c in mantissa.chars() {
        match c {
            '0'..='9' => {
                digits.push(c);
                if seen_point {
                    fraction_digits += 1;
                }
            }
            '.' if !seen_point => seen_point = true,
            _ => {
                return Err(CoordinateParseError::UnexpectedCharacter {
                    text: text.to_string(),
                    found: c,
                });
            }
        }
    }

    if digits.is_empty() {
        return Err(CoordinateParseError::NoDigits {
            text: text.to_string(),
        });
    }

    let explicit_exponent = match exponent_text {
        Some(exp) => exp
            .parse::<i32>()
            .map_err(|_| CoordinateParseError::ExponentOutOfRange {
                text: text.to_string(),
            })?,
        None => 0,
    };

    let exponent = explicit_exponent
        .checked_sub(fraction_digits)
        .ok_or_else(|| CoordinateParseError::ExponentOutOfRange {
            text: text.to_string(),
        })?;

    let significant = digits.trim_start_matches('0');
    let digits = if significant.is_empty() {
        "0".to_string()
    } else {
        significant.to_string()
    };

    Ok(DecimalParts {
        negative,
        digits,
        exponent,
    })
}

/// Tolerance comparison for floating parameters. Two zeros compare equal.
#[must_use]
pub fn values_match(this: f64, other: f64) -> bool {
    if this == other {
        return true;
    }

    let magnitude = this.abs().max(other.abs());
    (this - other).abs() <= magnitude * COORDINATE_TOLERANCE
}

/// A coordinate held as a fast `f64` approximation plus, when it was
/// supplied as text, the exact decimal string for high precision types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordValue {
    approx: f64,
    precise: Option<String>,
}

impl CoordValue {
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self {
            approx: value,
            precise: None,
        }
    }

    pub fn parse(text: &str) -> Result<Self, CoordinateParseError> {
        parse_decimal(text)?;

        let trimmed = text.trim();
        let approx = trimmed
            .parse::<f64>()
            .map_err(|_| CoordinateParseError::ExponentOutOfRange {
                text: text.to_string(),
            })?;

        if !approx.is_finite() {
            return Err(CoordinateParseError::ExponentOutOfRange {
                text: text.to_string(),
            });
        }

        Ok(Self {
            approx,
            precise: Some(trimmed.to_string()),
        })
    }

    #[must_use]
    pub fn approx(&self) -> f64 {
        self.approx
    }

    #[must_use]
    pub fn precise(&self) -> Option<&str> {
        self.precise.as_deref()
    }

    /// Decimal text for this coordinate, falling back to the shortest
    /// round-trip rendering of the approximation.
    #[must_use]
    pub fn to_text(&self) -> String {
        match &self.precise {
            Some(text) => text.clone(),
            None => format!("{:?}", self.approx),
        }
    }
}

impl PartialEq for CoordValue {
    fn eq(&self, other: &Self) -> bool {
        match (&self.precise, &other.precise) {
            (Some(a), Some(b)) => a == b,
            _ => values_match(self.approx, other.approx),
        }
    }
}

impl std::fmt::Display for CoordValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
