use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::NormalError;

/// The result type used across the whole crate.
pub type Result<T> = std::result::Result<T, SirErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum SirErr {
    /// A `(name, value, description)` triple is not well formed.
    InvalidQuantity { name: String, reason: &'static str },
    /// The same name was registered twice, in the same or in different classes.
    NameCollision { name: String },
    /// A read or write targeted a name that was never registered.
    UnknownName { name: String },
    /// Two buffers that must agree on a dimension don't.
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    /// A random distribution was built with invalid parameters.
    InvalidDistribution(String),
    /// A configuration document could not be parsed.
    Config(serde_json::Error),
}

impl Display for SirErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SirErr::InvalidQuantity { name, reason } => {
                write!(f, "invalid quantity '{name}': {reason}")
            }
            SirErr::NameCollision { name } => {
                write!(f, "the name '{name}' is registered more than once")
            }
            SirErr::UnknownName { name } => write!(f, "unable to find a quantity named '{name}'"),
            SirErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            SirErr::InvalidDistribution(msg) => write!(f, "invalid distribution: {msg}"),
            SirErr::Config(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl Error for SirErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SirErr::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NormalError> for SirErr {
    fn from(value: NormalError) -> Self {
        Self::InvalidDistribution(value.to_string())
    }
}

impl From<serde_json::Error> for SirErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value)
    }
}
