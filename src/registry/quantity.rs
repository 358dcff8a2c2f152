use crate::error::{Result, SirErr};

/// The three disjoint families a named value can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityClass {
    /// Tunable rate-like scalars (P).
    Parameter,
    /// State variables that evolve over time (Q).
    Quantity,
    /// Values derived from the parameters (C).
    Constant,
}

/// A `(name, value, description)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedQuantity {
    name: String,
    value: f64,
    description: String,
}

impl NamedQuantity {
    /// Creates a new `NamedQuantity`.
    ///
    /// # Arguments
    /// * `name` - The identifier the value is looked up with, case sensitive.
    /// * `value` - The initial value.
    /// * `description` - Free text shown in rendered documentation.
    pub fn new(name: impl Into<String>, value: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(super) fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// Checks the triple is well formed: the name must be an identifier and the value finite.
    pub(super) fn validate(&self) -> Result<()> {
        let mut chars = self.name.chars();
        let valid_name = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };

        if !valid_name {
            return Err(SirErr::InvalidQuantity {
                name: self.name.clone(),
                reason: "names must be non-empty identifiers",
            });
        }

        if !self.value.is_finite() {
            return Err(SirErr::InvalidQuantity {
                name: self.name.clone(),
                reason: "values must be finite",
            });
        }

        Ok(())
    }
}

impl<N: Into<String>, D: Into<String>> From<(N, f64, D)> for NamedQuantity {
    fn from((name, value, description): (N, f64, D)) -> Self {
        Self::new(name, value, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_accepted() {
        assert!(NamedQuantity::new("beta", 0.5, "").validate().is_ok());
        assert!(NamedQuantity::new("_n2", 1.0, "").validate().is_ok());
    }

    #[test]
    fn malformed_triples_are_rejected() {
        let bad = [
            NamedQuantity::new("", 0.5, "empty"),
            NamedQuantity::new("2x", 0.5, "leading digit"),
            NamedQuantity::new("a b", 0.5, "space"),
            NamedQuantity::new("x", f64::NAN, "nan"),
            NamedQuantity::new("y", f64::INFINITY, "inf"),
        ];

        for q in bad {
            assert!(
                matches!(q.validate(), Err(SirErr::InvalidQuantity { .. })),
                "{q:?} should be rejected"
            );
        }
    }
}
