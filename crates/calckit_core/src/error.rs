use std::fmt;

/// A raw token could not be turned into a finite number
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Token was empty or whitespace only
    Empty,
    /// Character the lexer does not understand
    UnexpectedChar { ch: char, position: usize },
    /// Token sequence does not match the expression grammar
    Syntax(String),
    /// Identifier that is neither a known constant nor a known function
    UnknownIdentifier(String),
    /// Known function called with the wrong number of arguments
    Arity {
        function: &'static str,
        expected: &'static str,
        found: usize,
    },
    /// Expression evaluated to NaN or an infinity
    NotFinite { token: String, value: f64 },
    /// Token expected to name a choice (e.g. a tail type) named none of them
    UnknownChoice {
        field: String,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "value is empty"),
            ParseError::UnexpectedChar { ch, position } => {
                write!(f, "unexpected character '{ch}' at position {position}")
            }
            ParseError::Syntax(msg) => write!(f, "invalid expression: {msg}"),
            ParseError::UnknownIdentifier(name) => write!(f, "unknown name '{name}'"),
            ParseError::Arity {
                function,
                expected,
                found,
            } => write!(
                f,
                "{function}() takes {expected} argument(s), {found} given"
            ),
            ParseError::NotFinite { token, value } => {
                write!(f, "'{token}' does not evaluate to a finite number ({value})")
            }
            ParseError::UnknownChoice {
                field,
                value,
                expected,
            } => write!(f, "{field}: '{value}' is not one of {expected}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A parsed value is outside the domain of the formula
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Failure during evaluation that validation did not rule out.
///
/// Reaching one of these means a validator is incomplete.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputationError {
    NonFinite { quantity: &'static str, value: f64 },
}

impl fmt::Display for ComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputationError::NonFinite { quantity, value } => {
                write!(f, "{quantity} is not finite ({value})")
            }
        }
    }
}

impl std::error::Error for ComputationError {}

/// Guard a computed quantity against NaN/infinity
pub fn ensure_finite(
    quantity: &'static str,
    value: f64,
) -> std::result::Result<f64, ComputationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputationError::NonFinite { quantity, value })
    }
}

/// Any error a single calculation can surface
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    UnknownFormula(String),
    MissingParameter(String),
    Parse { field: String, source: ParseError },
    Validation(ValidationError),
    Computation(ComputationError),
}

impl CalcError {
    /// Attach the parameter name to a parse failure
    pub fn parse(field: impl Into<String>, source: ParseError) -> Self {
        CalcError::Parse {
            field: field.into(),
            source,
        }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::UnknownFormula(id) => write!(f, "unknown formula '{id}'"),
            CalcError::MissingParameter(name) => write!(f, "missing parameter '{name}'"),
            CalcError::Parse { field, source } => write!(f, "{field}: {source}"),
            CalcError::Validation(e) => write!(f, "{e}"),
            CalcError::Computation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CalcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalcError::Parse { source, .. } => Some(source),
            CalcError::Validation(e) => Some(e),
            CalcError::Computation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for CalcError {
    fn from(err: ValidationError) -> Self {
        CalcError::Validation(err)
    }
}

impl From<ComputationError> for CalcError {
    fn from(err: ComputationError) -> Self {
        CalcError::Computation(err)
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

/// Why a single batch row or sweep point produced no result
#[derive(Debug, Clone, PartialEq)]
pub struct SkipReason {
    /// Row (batch) or step (sweep) position, 0-based
    pub index: usize,
    pub error: CalcError,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry {} skipped: {}", self.index + 1, self.error)
    }
}

impl std::error::Error for SkipReason {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Run-level failure of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchError {
    /// Input contained no rows at all
    Empty,
    /// Every row was skipped
    NoSuccessfulRows { attempted: usize, first: SkipReason },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Empty => write!(f, "batch input contains no rows"),
            BatchError::NoSuccessfulRows { attempted, first } => {
                write!(f, "none of {attempted} rows succeeded ({first})")
            }
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::NoSuccessfulRows { first, .. } => Some(first),
            BatchError::Empty => None,
        }
    }
}

/// Run-level failure of a sensitivity sweep
#[derive(Debug, Clone, PartialEq)]
pub enum SweepError {
    /// Percentage is negative or not finite
    InvalidVariation(f64),
    /// Point count is zero or above `analysis::MAX_POINTS`
    InvalidPoints(usize),
    /// Varied key is not a parameter of the formula
    UnknownParameter { formula: String, key: String },
    /// Base parameters do not produce a valid calculation
    InvalidBase(CalcError),
    /// Formula has no output with the requested name
    UnknownOutput(String),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::InvalidVariation(v) => {
                write!(f, "variation percent must be a non-negative number, got {v}")
            }
            SweepError::InvalidPoints(n) => write!(
                f,
                "point count must be between 1 and {}, got {n}",
                crate::analysis::MAX_POINTS
            ),
            SweepError::UnknownParameter { formula, key } => {
                write!(f, "'{key}' is not a numeric parameter of {formula}")
            }
            SweepError::InvalidBase(e) => write!(f, "base parameters are invalid: {e}"),
            SweepError::UnknownOutput(key) => write!(f, "formula has no output '{key}'"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::InvalidBase(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CalcError> for SweepError {
    fn from(err: CalcError) -> Self {
        SweepError::InvalidBase(err)
    }
}
