//! Utility functions and helpers

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::Path;

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    format!("{}{}", sign, result.chars().rev().collect::<String>())
}

/// Format an amount with two decimals and thousands separators
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let units = rounded.trunc();
    let cents = ((rounded - units).abs() * Decimal::from(100)).to_u32().unwrap_or(0);
    let units = units.to_i128().unwrap_or(0);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() && units == 0 {
        "-"
    } else {
        ""
    };
    format!("{}{}.{:02}", sign, format_number(units), cents)
}

/// Replace `path` with `contents` without exposing a half-written file
///
/// The data goes to a hidden sibling file first, which is then renamed over
/// the destination.
pub fn atomic_write(path: impl AsRef<Path>, contents: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

    let tmp = dir.join(format!(".{}.tmp", name.to_string_lossy()));
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        e
    })
}
