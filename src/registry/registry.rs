use std::collections::HashMap;

use super::{NamedQuantity, QuantityClass};
use crate::error::{Result, SirErr};

/// The resolved location of a registered name.
///
/// Models resolve the slots they need once at construction and then read values
/// through [`ParameterRegistry::value`] without going through the string lookup again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    class: QuantityClass,
    index: usize,
}

impl Slot {
    pub fn class(&self) -> QuantityClass {
        self.class
    }
}

/// Named storage for the parameters (P), quantities (Q) and constants (C) of a model.
///
/// Every name is unique across the three classes.
#[derive(Debug, Clone)]
pub struct ParameterRegistry {
    p: Vec<NamedQuantity>,
    q: Vec<NamedQuantity>,
    c: Vec<NamedQuantity>,
    info: Option<String>,
    lookup: HashMap<String, Slot>,
}

impl ParameterRegistry {
    /// Creates a new `ParameterRegistry`.
    ///
    /// # Arguments
    /// * `p` - The parameters, in declaration order.
    /// * `q` - The quantities, in declaration order.
    /// * `c` - The constants, in declaration order.
    ///
    /// # Returns
    /// An error if a triple is malformed or if a name is used more than once.
    pub fn new<P, Q, C>(p: P, q: Q, c: C) -> Result<Self>
    where
        P: IntoIterator,
        P::Item: Into<NamedQuantity>,
        Q: IntoIterator,
        Q::Item: Into<NamedQuantity>,
        C: IntoIterator,
        C::Item: Into<NamedQuantity>,
    {
        let p: Vec<_> = p.into_iter().map(Into::into).collect();
        let q: Vec<_> = q.into_iter().map(Into::into).collect();
        let c: Vec<_> = c.into_iter().map(Into::into).collect();

        let mut lookup = HashMap::with_capacity(p.len() + q.len() + c.len());
        let classes = [
            (QuantityClass::Parameter, &p),
            (QuantityClass::Quantity, &q),
            (QuantityClass::Constant, &c),
        ];

        for (class, entries) in classes {
            for (index, entry) in entries.iter().enumerate() {
                entry.validate()?;

                let slot = Slot { class, index };
                if lookup.insert(entry.name().to_string(), slot).is_some() {
                    return Err(SirErr::NameCollision {
                        name: entry.name().to_string(),
                    });
                }
            }
        }

        Ok(Self {
            p,
            q,
            c,
            info: None,
            lookup,
        })
    }

    /// Attaches a free-text description of the model.
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Returns every registered name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.lookup.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The parameters, with their current values.
    pub fn p(&self) -> &[NamedQuantity] {
        &self.p
    }

    /// The quantities, with their current values.
    pub fn q(&self) -> &[NamedQuantity] {
        &self.q
    }

    /// The constants, with their current values.
    pub fn c(&self) -> &[NamedQuantity] {
        &self.c
    }

    pub fn class(&self, class: QuantityClass) -> &[NamedQuantity] {
        match class {
            QuantityClass::Parameter => &self.p,
            QuantityClass::Quantity => &self.q,
            QuantityClass::Constant => &self.c,
        }
    }

    /// Resolves a name into a `Slot`.
    ///
    /// # Returns
    /// `SirErr::UnknownName` if the name was never registered.
    pub fn slot(&self, name: &str) -> Result<Slot> {
        self.lookup
            .get(name)
            .copied()
            .ok_or_else(|| SirErr::UnknownName {
                name: name.to_string(),
            })
    }

    /// Reads the current value of a resolved slot.
    pub fn value(&self, slot: Slot) -> f64 {
        self.entries(slot.class)[slot.index].value()
    }

    /// Overwrites the value of a resolved slot.
    pub fn set_value(&mut self, slot: Slot, value: f64) {
        self.entries_mut(slot.class)[slot.index].set_value(value);
    }

    /// Reads the current value registered under `name`.
    pub fn get(&self, name: &str) -> Result<f64> {
        self.slot(name).map(|slot| self.value(slot))
    }

    /// Overwrites the value registered under `name`.
    pub fn set(&mut self, name: &str, value: f64) -> Result<()> {
        let slot = self.slot(name)?;
        self.set_value(slot, value);
        Ok(())
    }

    /// Overwrites several values at once.
    ///
    /// Every name is resolved before anything is written, so an unknown name leaves the
    /// registry untouched.
    pub fn set_many<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let resolved = values
            .into_iter()
            .map(|(name, value)| self.slot(name).map(|slot| (slot, value)))
            .collect::<Result<Vec<_>>>()?;

        for (slot, value) in resolved {
            self.set_value(slot, value);
        }

        Ok(())
    }

    /// Overwrites every value of a class, in declaration order.
    ///
    /// # Returns
    /// `SirErr::SizeMismatch` if `values` doesn't hold exactly one value per entry.
    pub fn set_class<I>(&mut self, class: QuantityClass, values: I) -> Result<()>
    where
        I: ExactSizeIterator<Item = f64>,
    {
        let entries = self.entries_mut(class);
        if values.len() != entries.len() {
            return Err(SirErr::SizeMismatch {
                a: "values",
                b: "registered entries",
                got: values.len(),
                expected: entries.len(),
            });
        }

        entries
            .iter_mut()
            .zip(values)
            .for_each(|(entry, value)| entry.set_value(value));

        Ok(())
    }

    fn entries(&self, class: QuantityClass) -> &[NamedQuantity] {
        self.class(class)
    }

    fn entries_mut(&mut self, class: QuantityClass) -> &mut [NamedQuantity] {
        match class {
            QuantityClass::Parameter => &mut self.p,
            QuantityClass::Quantity => &mut self.q,
            QuantityClass::Constant => &mut self.c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ParameterRegistry {
        ParameterRegistry::new([("p", 0.5, "PP")], [("q", 0.6, "QQ")], [("N", 0.6, "NN")])
            .unwrap()
    }

    #[test]
    fn names_are_the_sorted_union() {
        let models = registry();
        assert_eq!(models.names(), ["N", "p", "q"]);
    }

    #[test]
    fn values_are_readable_by_name() {
        let models = registry();
        assert_eq!(models.get("p").unwrap(), 0.5);
        assert_eq!(models.get("q").unwrap(), 0.6);
        assert_eq!(models.get("N").unwrap(), 0.6);
        assert_eq!(models.p(), [NamedQuantity::new("p", 0.5, "PP")]);
        assert_eq!(models.q(), [NamedQuantity::new("q", 0.6, "QQ")]);
        assert_eq!(models.c(), [NamedQuantity::new("N", 0.6, "NN")]);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let models = registry();
        assert!(matches!(models.get("n"), Err(SirErr::UnknownName { .. })));
        assert!(matches!(models.get("P"), Err(SirErr::UnknownName { .. })));
    }

    #[test]
    fn unknown_names_fail_on_read_and_write() {
        let mut models = registry();
        assert!(matches!(models.get("qq"), Err(SirErr::UnknownName { .. })));
        assert!(matches!(
            models.set("qq", 1.0),
            Err(SirErr::UnknownName { .. })
        ));
    }

    #[test]
    fn written_values_read_back() {
        let mut models = registry();
        for name in ["p", "q", "N"] {
            models.set(name, 6.1).unwrap();
            assert_eq!(models.get(name).unwrap(), 6.1);
        }
        assert_eq!(models.q()[0].value(), 6.1);
        assert_eq!(models.q()[0].description(), "QQ");
    }

    #[test]
    fn collisions_across_classes_are_rejected() {
        let res = ParameterRegistry::new([("x", 0.5, "")], [("y", 0.6, "")], [("x", 0.6, "")]);
        assert!(matches!(res, Err(SirErr::NameCollision { name }) if name == "x"));

        let res = ParameterRegistry::new([("x", 0.5, ""), ("x", 0.1, "")], [("y", 0.6, "")], [
            ("z", 0.6, ""),
        ]);
        assert!(matches!(res, Err(SirErr::NameCollision { .. })));
    }

    #[test]
    fn failed_set_many_writes_nothing() {
        let mut models = registry();
        let res = models.set_many([("p", 2.0), ("missing", 3.0)]);
        assert!(matches!(res, Err(SirErr::UnknownName { .. })));
        assert_eq!(models.get("p").unwrap(), 0.5);

        models.set_many([("p", 2.0), ("q", 3.0)]).unwrap();
        assert_eq!(models.get("p").unwrap(), 2.0);
        assert_eq!(models.get("q").unwrap(), 3.0);
    }

    #[test]
    fn info_is_optional() {
        assert_eq!(registry().info(), None);
        let models = registry().with_info("toy model");
        assert_eq!(models.info(), Some("toy model"));
    }
}
