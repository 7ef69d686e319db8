use crate::field::Field;
use thiserror::Error;

/// A malformed chunk inside one schedule field.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseFault {
    #[error("Invalid Range {0}")]
    InvalidRange(String),

    #[error("Invalid Value {0}")]
    InvalidValue(String),

    #[error("Invalid Step {0}")]
    InvalidStep(String),

    #[error("Too many fields, 7 expected but {0} supplied")]
    TooManyFields(usize),
}

/// The assembled set of a field reaches outside the field's declared bounds.
/// Informational only, the values are kept.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("Values {lowest}-{highest} outside of bounds {min}-{max}")]
pub struct RangeFault {
    pub lowest: u32,
    pub highest: u32,
    pub min: u32,
    pub max: u32,
}

/// A fault collected while leniently parsing an expression.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ExpressionFault {
    #[error("{field}: {fault}")]
    Parse { field: Field, fault: ParseFault },

    #[error("{field}: {fault}")]
    Range { field: Field, fault: RangeFault },
}

/// Returned by the strict `FromStr` entry point of an expression.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("Invalid {field} field: {fault}")]
pub struct ParseScheduleError {
    pub field: Field,
    pub fault: ParseFault,
}

#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("{starts} starts but {intervals} intervals, using the first {used}")]
pub struct ConfigMismatch {
    pub starts: usize,
    pub intervals: usize,
    pub used: usize,
}

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum OffsetFault {
    #[error("No offset bucket in {0} covers {1} minutes")]
    LookupMiss(String, i32),

    #[error("Invalid offset map: {0}")]
    InvalidMap(String),
}

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum CycleLengthError {
    #[error("Unexpected character {1:?} at {0}")]
    UnexpectedChar(usize, char),

    #[error("Unexpected end of input")]
    UnexpectedEnd,

    #[error("Unbalanced parenthesis at {0}")]
    Unbalanced(usize),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Negative cycle length {0}")]
    Negative(i64),
}
