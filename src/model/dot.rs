use std::fmt::{self, Display};

use super::Flow;

/// The flow graph of a model, rendered in DOT format through `Display`.
pub(super) struct DotGraph<'a> {
    pub(super) compartments: &'a [&'a str],
    pub(super) flows: &'a [Flow],
    pub(super) verbose: bool,
    pub(super) full: bool,
}

impl DotGraph<'_> {
    fn edge(
        &self,
        f: &mut fmt::Formatter<'_>,
        from: &str,
        to: &str,
        label: &str,
    ) -> fmt::Result {
        if self.verbose {
            writeln!(f, "  {from} -> {to} [label=\"{label}\"];")
        } else {
            writeln!(f, "  {from} -> {to};")
        }
    }
}

impl Display for DotGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph {{")?;

        for name in self.compartments {
            writeln!(f, "  {name};")?;
        }

        for flow in self.flows {
            let (from, to) = (self.compartments[flow.from()], self.compartments[flow.to()]);
            self.edge(f, from, to, flow.label())?;
        }

        if self.full {
            for (idx, name) in self.compartments.iter().enumerate() {
                let outflows: Vec<_> = self
                    .flows
                    .iter()
                    .filter(|flow| flow.from() == idx)
                    .map(|flow| flow.label())
                    .collect();

                if !outflows.is_empty() {
                    let label = format!("-{}", outflows.join(" - "));
                    self.edge(f, name, name, &label)?;
                }
            }
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(compartments: &[&str], flows: &[Flow], verbose: bool, full: bool) -> String {
        DotGraph {
            compartments,
            flows,
            verbose,
            full,
        }
        .to_string()
    }

    const FLOWS: [Flow; 2] = [Flow::new(0, 1, "beta*I*S/N"), Flow::new(1, 2, "gamma*I")];

    #[test]
    fn labels_only_when_verbose() {
        let dot = render(&["S", "I", "R"], &FLOWS, false, false);
        assert!(dot.contains("S -> I;"));
        assert!(!dot.contains("beta"));

        let dot = render(&["S", "I", "R"], &FLOWS, true, false);
        assert!(dot.contains("I -> R [label=\"gamma*I\"]"));
        assert!(!dot.contains("I -> I"));
    }

    #[test]
    fn full_adds_negated_self_loops() {
        let dot = render(&["S", "I", "R"], &FLOWS, true, true);
        assert!(dot.contains("S -> S [label=\"-beta*I*S/N\"]"));
        assert!(dot.contains("I -> I [label=\"-gamma*I\"]"));
        assert!(!dot.contains("R -> R"));
    }

    #[test]
    fn plain_full_graph_has_unlabelled_loops() {
        let dot = render(&["S", "I", "R"], &FLOWS, false, true);
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with('}'));
        assert!(dot.contains("  I -> I;\n"));
        assert!(!dot.contains("label"));
    }
}
