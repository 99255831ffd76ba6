use serde::Serialize;
use std::fmt;

use petrel_ir::{CounterSelector, ExtInt};

/// Wall-clock time spent in each analysis phase, in seconds.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PhaseTimings {
    pub min_init_cons_secs: f64,
    pub safe_secs: f64,
    pub safe_pr_secs: f64,
    pub validation_secs: f64,
}

/// Everything the analysis pipeline produces for one model.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Effective capacity (model constant or CLI override).
    pub capacity: u32,
    /// Least resource to guarantee reaching a reload state.
    pub min_init_cons: Vec<ExtInt>,
    /// Least resource to avoid exhaustion forever.
    pub safe: Vec<ExtInt>,
    /// Least resource to survive and reach the target with positive
    /// probability.
    pub safe_pr: Vec<ExtInt>,
    /// Counter selector witnessing the `SafePR` values.
    pub selector: CounterSelector,
    /// Verdict of the semantic validation on the product chain.
    pub selector_valid: bool,
    pub timings: PhaseTimings,
}

fn write_vector(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    values: &[ExtInt],
    secs: f64,
) -> fmt::Result {
    writeln!(f, "{name}")?;
    let mut first = true;
    for value in values {
        if first {
            write!(f, "{value}")?;
            first = false;
        } else {
            write!(f, " {value}")?;
        }
    }
    writeln!(f)?;
    writeln!(f, "{secs:.3}s")
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "capacity = {}", self.capacity)?;
        write_vector(
            f,
            "MinInitCons",
            &self.min_init_cons,
            self.timings.min_init_cons_secs,
        )?;
        write_vector(f, "Safe", &self.safe, self.timings.safe_secs)?;
        write_vector(f, "SafePR", &self.safe_pr, self.timings.safe_pr_secs)?;
        writeln!(f, "counterSelector =")?;
        write!(f, "{}", self.selector)?;
        writeln!(f, "Counter selector satisfies requirements:")?;
        writeln!(f, "{}", self.selector_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AnalysisReport {
        let mut selector = CounterSelector::undefined(2, 2);
        selector.set(0, 0, 0);
        selector.set(1, 1, 0);
        AnalysisReport {
            capacity: 2,
            min_init_cons: vec![ExtInt::finite(1), ExtInt::finite(2)],
            safe: vec![ExtInt::finite(0), ExtInt::finite(1)],
            safe_pr: vec![ExtInt::finite(0), ExtInt::infinity()],
            selector,
            selector_valid: true,
            timings: PhaseTimings::default(),
        }
    }

    #[test]
    fn display_lists_every_section_in_order() {
        let text = sample_report().to_string();
        let sections = [
            "capacity = 2",
            "MinInitCons",
            "1 2",
            "Safe",
            "0 1",
            "SafePR",
            "0 infinity",
            "counterSelector =",
            "Counter selector satisfies requirements:",
            "true",
        ];
        let mut cursor = 0;
        for section in sections {
            let found = text[cursor..]
                .find(section)
                .unwrap_or_else(|| panic!("missing `{section}` after byte {cursor}"));
            cursor += found + section.len();
        }
    }

    #[test]
    fn infinities_render_in_vectors() {
        let text = sample_report().to_string();
        assert!(text.contains("0 infinity"));
    }

    #[test]
    fn json_shape_is_stable() {
        let value = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(value["capacity"], 2);
        assert_eq!(value["min_init_cons"][0], 1);
        assert_eq!(value["safe_pr"][1], "infinity");
        assert_eq!(value["selector_valid"], true);
        assert!(value["timings"]["safe_secs"].is_number());
    }
}
