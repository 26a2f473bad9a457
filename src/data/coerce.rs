//! Value Coercion Module
//! Lenient text-to-number parsing and string normalization helpers.
//!
//! Coercion never fails on bad data: anything that does not parse becomes a
//! null, and only a missing column is reported as an error.

use polars::prelude::*;

/// Parse a whole number. Fractional, non-finite or non-numeric text is `None`.
pub fn parse_int(raw: &str) -> Option<i64> {
    let value = parse_float(raw)?;
    if value.fract() != 0.0 || value < i64::MIN as f64 || value > i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

/// Parse a finite real number.
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word starts at any letter that follows a non-letter, so `"o'neil"`
/// becomes `"O'Neil"` and `"athletic-club"` becomes `"Athletic-Club"`.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

/// Stringify any column so that typed and text inputs coerce the same way.
fn as_text(column: &Column) -> PolarsResult<Column> {
    column.cast(&DataType::String)
}

/// Coerce a column to nullable Int64.
pub fn to_int_column(column: &Column) -> PolarsResult<Column> {
    let text = as_text(column)?;
    let values: Vec<Option<i64>> = text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_int))
        .collect();
    Ok(Column::new(column.name().clone(), values))
}

/// Coerce a column to nullable Float64.
pub fn to_float_column(column: &Column) -> PolarsResult<Column> {
    let text = as_text(column)?;
    let values: Vec<Option<f64>> = text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_float))
        .collect();
    Ok(Column::new(column.name().clone(), values))
}

/// Apply a string normalization to every non-null value of a column.
/// Values the normalization maps to `None` become null.
pub fn map_text_column<F>(column: &Column, f: F) -> PolarsResult<Column>
where
    F: Fn(&str) -> Option<String>,
{
    let text = as_text(column)?;
    let values: Vec<Option<String>> = text.str()?.into_iter().map(|v| v.and_then(&f)).collect();
    Ok(Column::new(column.name().clone(), values))
}

/// Read a column as floats, treating anything unparseable as missing.
pub fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?;
    let floats = match column.dtype() {
        DataType::String => to_float_column(column)?,
        _ => column.cast(&DataType::Float64)?,
    };
    let values = floats.f64()?.into_iter().collect();
    Ok(values)
}
