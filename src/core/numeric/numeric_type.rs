use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Arithmetic used by the iteration kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum NumericType {
    SinglePrecisionFloat,
    #[default]
    DoublePrecisionFloat,
    CustomFloat20,
    Decimal20,
    Decimal30,
    Decimal50,
    Float80,
    Float128,
    Int32,
    Int64,
    Int128,
}

#[derive(Debug, Clone, Copy)]
pub struct NumericTypeInfo {
    pub numeric_type: NumericType,
    pub code: i32,
    pub short_name: &'static str,
    pub description: &'static str,
    pub supported: bool,
}

pub const NUMERIC_TYPES: [NumericTypeInfo; 11] = [
    NumericTypeInfo {
        numeric_type: NumericType::SinglePrecisionFloat,
        code: 0,
        short_name: "f32",
        description: "float (single precision)",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::DoublePrecisionFloat,
        code: 1,
        short_name: "f64",
        description: "double (double precision)",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::CustomFloat20,
        code: 2,
        short_name: "custom",
        description: "customized floating point type",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::Decimal20,
        code: 3,
        short_name: "dec20",
        description: "20 decimal digit precision float",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::Decimal30,
        code: 4,
        short_name: "dec30",
        description: "30 decimal digit precision float",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::Decimal50,
        code: 5,
        short_name: "dec50",
        description: "50 decimal digit precision float",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::Float80,
        code: 6,
        short_name: "f80",
        description: "80 bit floating type",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::Float128,
        code: 7,
        short_name: "f128",
        description: "128 bit floating type",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::Int32,
        code: 8,
        short_name: "i32",
        description: "32 bit integer",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::Int64,
        code: 9,
        short_name: "i64",
        description: "64 bit integer",
        supported: true,
    },
    NumericTypeInfo {
        numeric_type: NumericType::Int128,
        code: 10,
        short_name: "i128",
        description: "128 bit integer",
        supported: true,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumericTypeError {
    #[error("unknown numeric type code {0}")]
    UnknownCode(i32),
    #[error("unknown numeric type '{0}'")]
    UnknownName(String),
}

impl NumericType {
    #[must_use]
    pub fn info(self) -> &'static NumericTypeInfo {
        &NUMERIC_TYPES[self as usize]
    }

    #[must_use]
    pub fn code(self) -> i32 {
        self.info().code
    }

    #[must_use]
    pub fn short_name(self) -> &'static str {
        self.info().short_name
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        self.info().description
    }

    #[must_use]
    pub fn is_supported(self) -> bool {
        self.info().supported
    }

    pub fn from_code(code: i32) -> Result<Self, NumericTypeError> {
        NUMERIC_TYPES
            .iter()
            .find(|info| info.code == code)
            .map(|info| info.numeric_type)
            .ok_or(NumericTypeError::UnknownCode(code))
    }

    #[must_use]
    pub fn from_description(description: &str) -> Option<Self> {
        NUMERIC_TYPES
            .iter()
            .find(|info| info.description == description)
            .map(|info| info.numeric_type)
    }
}

impl TryFrom<i32> for NumericType {
    type Error = NumericTypeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<NumericType> for i32 {
    fn from(numeric_type: NumericType) -> Self {
        numeric_type.code()
    }
}

impl FromStr for NumericType {
    type Err = NumericTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NUMERIC_TYPES
            .iter()
            .find(|info| info.short_name.eq_ignore_ascii_case(s) || info.description == s)
            .map(|info| info.numeric_type)
            .ok_or_else(|| NumericTypeError::UnknownName(s.to_string()))
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}
