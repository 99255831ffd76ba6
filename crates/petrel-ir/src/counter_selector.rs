use crate::cmdp::{ActionId, StateId};
use serde::Serialize;
use std::fmt;

/// Policy table for one state: resource level → action, with `None` for
/// levels that carry no obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionRule {
    entries: Vec<Option<ActionId>>,
}

impl SelectionRule {
    fn undefined(capacity: u32) -> Self {
        Self {
            entries: vec![None; capacity as usize + 1],
        }
    }

    /// Number of resource levels, always `capacity + 1`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, level: u32) -> Option<ActionId> {
        self.entries[level as usize]
    }
}

/// A memory-dependent policy using the resource counter as memory: one
/// [`SelectionRule`] per state.
///
/// The builder writes an action only at the tightest level where an
/// improvement first occurred; [`CounterSelector::lookup`] falls back
/// downward through lower levels, so higher levels inherit implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterSelector {
    rules: Vec<SelectionRule>,
    capacity: u32,
}

impl CounterSelector {
    /// A selector with every entry undefined.
    pub fn undefined(num_states: usize, capacity: u32) -> Self {
        Self {
            rules: vec![SelectionRule::undefined(capacity); num_states],
            capacity,
        }
    }

    pub fn num_states(&self) -> usize {
        self.rules.len()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn rule(&self, state: StateId) -> &SelectionRule {
        &self.rules[state]
    }

    pub fn set(&mut self, state: StateId, level: u32, action: ActionId) {
        self.rules[state].entries[level as usize] = Some(action);
    }

    /// The action to play in `state` holding `level` units of resource:
    /// the first defined entry scanning `level, level−1, …, 0`, or action
    /// 0 when the whole prefix is undefined.
    pub fn lookup(&self, state: StateId, level: u32) -> ActionId {
        let rule = &self.rules[state];
        (0..=level as usize)
            .rev()
            .find_map(|l| rule.entries[l])
            .unwrap_or(0)
    }
}

impl fmt::Display for CounterSelector {
    /// Renders the selector as a states × resource-levels table, `-` for
    /// undefined entries.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |x: usize| x.to_string().len();
        let state_width = digits(self.rules.len().saturating_sub(1));
        let max_action = self
            .rules
            .iter()
            .flat_map(|r| r.entries.iter().flatten())
            .max()
            .copied()
            .unwrap_or(0);
        let cell_width = digits(self.capacity as usize).max(digits(max_action));

        writeln!(f, "{:state_width$} resource levels:", "")?;
        write!(f, "{:state_width$}", "")?;
        for level in 0..=self.capacity {
            write!(f, " {level:>cell_width$}")?;
        }
        writeln!(f)?;
        writeln!(f, "{:>state_width$} actions:", "s")?;
        for (state, rule) in self.rules.iter().enumerate() {
            write!(f, "{state:>state_width$}")?;
            for level in 0..=self.capacity {
                match rule.entries[level as usize] {
                    Some(action) => write!(f, " {action:>cell_width$}")?,
                    None => write!(f, " {:>cell_width$}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_selector_is_fully_undefined() {
        let sel = CounterSelector::undefined(3, 2);
        assert_eq!(sel.num_states(), 3);
        assert_eq!(sel.capacity(), 2);
        for s in 0..3 {
            assert_eq!(sel.rule(s).len(), 3);
            for l in 0..=2 {
                assert_eq!(sel.rule(s).entry(l), None);
            }
        }
    }

    #[test]
    fn lookup_scans_downward() {
        let mut sel = CounterSelector::undefined(1, 4);
        sel.set(0, 1, 2);
        sel.set(0, 3, 5);
        assert_eq!(sel.lookup(0, 4), 5);
        assert_eq!(sel.lookup(0, 3), 5);
        assert_eq!(sel.lookup(0, 2), 2);
        assert_eq!(sel.lookup(0, 1), 2);
    }

    #[test]
    fn lookup_falls_back_to_action_zero() {
        let sel = CounterSelector::undefined(2, 3);
        assert_eq!(sel.lookup(1, 3), 0);
        assert_eq!(sel.lookup(0, 0), 0);
    }

    #[test]
    fn table_rendering_uses_dash_for_undefined() {
        let mut sel = CounterSelector::undefined(2, 2);
        sel.set(0, 0, 0);
        sel.set(1, 2, 1);
        let table = sel.to_string();
        assert!(table.contains("resource levels:"));
        assert!(table.contains("actions:"));
        assert!(table.contains("0 0 - -"));
        assert!(table.contains("1 - - 1"));
    }

    #[test]
    fn wide_values_stay_aligned() {
        let mut sel = CounterSelector::undefined(12, 10);
        sel.set(11, 10, 3);
        let table = sel.to_string();
        // 12 states need a 2-wide state column; capacity 10 needs 2-wide cells.
        let rows: Vec<&str> = table.lines().skip(3).collect();
        assert_eq!(rows.len(), 12);
        for row in rows {
            assert_eq!(row.len(), 2 + 11 * 3);
        }
    }
}
