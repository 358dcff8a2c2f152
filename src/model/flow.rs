/// A directed transfer of population between two compartments.
///
/// `from` and `to` index into the model's compartments (its Q entries). The rate
/// itself is computed by the model; `label` is only the textual formula used when
/// rendering the flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flow {
    from: usize,
    to: usize,
    label: &'static str,
}

impl Flow {
    pub const fn new(from: usize, to: usize, label: &'static str) -> Self {
        Self { from, to, label }
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}
