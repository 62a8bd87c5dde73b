//! Driver-neutral row representation.

use std::fmt;

/// A single column value as returned by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Short type name used in decode error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Int(_) => "signed integer",
            Self::UInt(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One fetched row, columns in projection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlRow {
    values: Vec<SqlValue>,
}

impl SqlRow {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Read column `index` as a UTF-8 string.
    ///
    /// # Errors
    /// Returns a description of the mismatch for NULL, numeric or non-UTF-8 values.
    pub fn get_str(&self, index: usize) -> Result<&str, String> {
        match self.column(index)? {
            SqlValue::Text(s) => Ok(s),
            SqlValue::Bytes(b) => std::str::from_utf8(b)
                .map_err(|e| format!("column {index}: invalid UTF-8: {e}")),
            other => Err(format!("column {index}: expected string, got {}", other.kind())),
        }
    }

    /// Read column `index` as an unsigned 64-bit integer.
    ///
    /// Signed values are accepted when non-negative; text values (DECIMAL
    /// columns) must hold a base-10 unsigned integer.
    ///
    /// # Errors
    /// Returns a description of the mismatch for NULL, negative, fractional
    /// or unparsable values.
    pub fn get_u64(&self, index: usize) -> Result<u64, String> {
        match self.column(index)? {
            SqlValue::UInt(v) => Ok(*v),
            SqlValue::Int(v) => u64::try_from(*v)
                .map_err(|_| format!("column {index}: negative value {v} for unsigned column")),
            SqlValue::Text(s) => parse_u64(index, s),
            SqlValue::Bytes(b) => {
                let s = std::str::from_utf8(b)
                    .map_err(|e| format!("column {index}: invalid UTF-8: {e}"))?;
                parse_u64(index, s)
            }
            other => Err(format!(
                "column {index}: expected unsigned integer, got {}",
                other.kind()
            )),
        }
    }

    fn column(&self, index: usize) -> Result<&SqlValue, String> {
        self.values
            .get(index)
            .ok_or_else(|| format!("column {index} out of range for row of {}", self.len()))
    }
}

fn parse_u64(index: usize, s: &str) -> Result<u64, String> {
    s.trim()
        .parse::<u64>()
        .map_err(|e| format!("column {index}: cannot parse {s:?} as unsigned integer: {e}"))
}

impl From<Vec<SqlValue>> for SqlRow {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for SqlRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                SqlValue::Null => f.write_str("NULL")?,
                SqlValue::Int(v) => write!(f, "{v}")?,
                SqlValue::UInt(v) => write!(f, "{v}")?,
                SqlValue::Float(v) => write!(f, "{v}")?,
                SqlValue::Text(v) => write!(f, "{v:?}")?,
                SqlValue::Bytes(v) => write!(f, "<{} bytes>", v.len())?,
            }
        }
        f.write_str(")")
    }
}
