//! FILENAME: core/engine/src/coord.rs
//! PURPOSE: Utilities for converting between spreadsheet coordinate formats.
//! CONTEXT: Converts between A1-style notation (e.g., "A1", "$B$2") and
//! 0-based (row, col) indices. Column "A" = 0, ..., "Z" = 25, "AA" = 26.
//! Row 1 in A1 notation = row 0 internally. Absolute markers ($) carry no
//! meaning for snapshots, so normalization drops them.

/// A cell coordinate as (row, col) with 0-based indices.
pub type CellCoord = (u32, u32);

/// Converts a column string (e.g., "A", "aa") to a 0-based column index.
/// Returns None for an empty string or non-letter characters.
pub fn col_to_index(col_str: &str) -> Option<u32> {
    if col_str.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result.checked_mul(26)?.checked_add(digit)?;
    }
    Some(result - 1)
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// Converts a 0-based (row, col) coordinate to an A1-style reference string.
/// (0, 0) -> "A1", (99, 26) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_col(col), row + 1)
}

/// Parses an A1 reference, with or without `$` anchors, into a 0-based
/// coordinate. "B2", "$B$2", "b$2" -> (1, 1).
pub fn parse_a1(reference: &str) -> Option<CellCoord> {
    let cleaned: String = reference.chars().filter(|c| *c != '$').collect();
    let split = cleaned.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cleaned.split_at(split);
    if letters.len() > 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let col = col_to_index(letters)?;
    let row_num: u32 = digits.parse().ok()?;
    if row_num == 0 {
        return None;
    }
    Some((row_num - 1, col))
}

/// Canonical spelling of a reference: uppercase, no `$` anchors.
/// "$b$2" -> "B2". Returns None if the text is not a cell reference.
pub fn normalize_a1(reference: &str) -> Option<String> {
    parse_a1(reference).map(coord_to_a1)
}
