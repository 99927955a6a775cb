//! Cell-to-number coercion.

use crate::types::Cell;
use crate::utils::parse_numeric_string;

/// Outcome of coercing one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedCell {
    /// A usable number
    Value(f64),
    /// The sentinel token
    Sentinel,
    /// No value (empty cell, blank text, NaN)
    Empty,
    /// Something that is neither a number nor the sentinel, in display form
    Invalid(String),
}

impl CoercedCell {
    pub fn value(&self) -> Option<f64> {
        match self {
            CoercedCell::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Coerce a cell to a number.
///
/// The sentinel must match the whole cell text exactly. Booleans count as
/// 1.0 and 0.0. Dates and spreadsheet error values never coerce.
pub fn coerce_cell(cell: &Cell, sentinel: &str) -> CoercedCell {
    match cell {
        Cell::Empty => CoercedCell::Empty,
        Cell::Number(n) if n.is_nan() => CoercedCell::Empty,
        Cell::Number(n) => CoercedCell::Value(*n),
        Cell::Bool(b) => CoercedCell::Value(if *b { 1.0 } else { 0.0 }),
        Cell::Text(s) if s == sentinel => CoercedCell::Sentinel,
        Cell::Text(s) if s.trim().is_empty() => CoercedCell::Empty,
        Cell::Text(s) => match parse_numeric_string(s) {
            Some(v) if v.is_nan() => CoercedCell::Empty,
            Some(v) => CoercedCell::Value(v),
            None => CoercedCell::Invalid(s.clone()),
        },
        Cell::Other(s) => CoercedCell::Invalid(s.clone()),
    }
}
