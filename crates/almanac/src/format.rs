// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Number formatting shared by insight text, reports and chat answers.

/// At most two decimals, trailing zeros trimmed, no grouping: `1000`, `33.33`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.2}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Like [`format_number`] with thousands separators: `175,025`, `1,234.5`.
pub fn format_grouped(value: f64) -> String {
    let plain = format_number(value);
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if !integer.bytes().all(|b| b.is_ascii_digit()) {
        return plain;
    }
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `part / whole * 100` with one decimal place; `0.0` for an empty whole.
pub fn format_percentage(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 / whole as f64 * 100.0)
}

pub(crate) fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_trim_trailing_zeros() {
        assert_eq!(format_number(1000.0), "1000");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(197342.666), "197342.67");
        assert_eq!(format_number(-0.001), "0");
    }

    #[test]
    fn grouping_inserts_separators() {
        assert_eq!(format_grouped(175025.0), "175,025");
        assert_eq!(format_grouped(-1234567.891), "-1,234,567.89");
        assert_eq!(format_grouped(999.0), "999");
        assert_eq!(format_grouped(0.5), "0.5");
    }

    #[test]
    fn percentage_uses_one_decimal() {
        assert_eq!(format_percentage(1, 3), "33.3");
        assert_eq!(format_percentage(2, 3), "66.7");
        assert_eq!(format_percentage(0, 0), "0.0");
    }
}
