// src/api/types.rs
use serde::{Deserialize, Serialize};

/// Answer of the directory size endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeResult {
    pub bytes: u64,
    pub kb: f64,
    /// Display-only, e.g. `"1,234.50 MB"`.
    pub mb: String,
}

impl SizeResult {
    pub fn from_bytes(bytes: u64) -> Self {
        Self {
            bytes,
            kb: bytes as f64 / 1024.0,
            mb: format_mb(bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Formats `bytes` as megabytes with two decimals and a `,` thousands separator.
pub fn format_mb(bytes: u64) -> String {
    let fixed = format!("{:.2}", bytes as f64 / 1024.0 / 1024.0);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{grouped}.{frac_part} MB")
}
