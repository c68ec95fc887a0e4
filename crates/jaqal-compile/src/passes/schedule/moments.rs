//! Moment list and freeze-timestamp table for one unscheduled block.

use rustc_hash::FxHashMap;

use jaqal_ir::{Block, QubitUsage, Statement, UsageKey};

use super::legality::compatible;
use crate::property::ScheduleStats;

/// A time slot: statements intended to run simultaneously.
#[derive(Debug)]
struct Moment {
    statements: Vec<Statement>,
    /// Union of the occupants' usage.
    usage: QubitUsage,
    /// Whether every occupant is parallelizable.
    open: bool,
}

impl Moment {
    fn collapse(mut self) -> Option<Statement> {
        match self.statements.len() {
            0 => None,
            1 => self.statements.pop(),
            _ => Some(Block::parallel(self.statements).into()),
        }
    }
}

/// Moments under construction, plus the last moment each qubit appears in.
#[derive(Debug, Default)]
pub struct Timeline {
    moments: Vec<Moment>,
    freeze: FxHashMap<(UsageKey, usize), usize>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest moment index that respects every prior use of `usage`'s
    /// qubits and comes after `after`.
    pub fn earliest(&self, usage: &QubitUsage, after: Option<usize>) -> usize {
        let mut index = after.map_or(0, |a| a + 1);
        for (key, slot) in usage.iter() {
            if let Some(&frozen) = self.freeze.get(&(key.clone(), slot)) {
                index = index.max(frozen + 1);
            }
        }
        index
    }

    /// Place a parallelizable statement into the first compatible moment at
    /// or after its earliest index, or into a new trailing moment.
    pub fn place(&mut self, statement: Statement, usage: QubitUsage, after: Option<usize>) -> usize {
        match self.find_open(&usage, after) {
            Some(index) => self.merge(index, vec![statement], &usage),
            None => self.push(vec![statement], usage, true),
        }
    }

    /// Place an authored parallel block of parallelizable gates.
    ///
    /// The members join the first compatible moment when there is one.
    /// Otherwise the block keeps its grouping in a new trailing moment that
    /// nothing else may join.
    pub fn place_group(&mut self, block: Block, usage: QubitUsage, after: Option<usize>) -> usize {
        match self.find_open(&usage, after) {
            Some(index) => self.merge(index, block.statements, &usage),
            None => self.isolate(block.into(), usage),
        }
    }

    fn find_open(&self, usage: &QubitUsage, after: Option<usize>) -> Option<usize> {
        let start = self.earliest(usage, after);
        (start..self.moments.len())
            .find(|&i| compatible(self.moments[i].open, &self.moments[i].usage, usage))
    }

    fn merge(&mut self, index: usize, statements: Vec<Statement>, usage: &QubitUsage) -> usize {
        let moment = &mut self.moments[index];
        moment.statements.extend(statements);
        moment.usage.extend(usage);
        self.freeze(usage, index);
        index
    }

    /// Give a statement a new trailing moment of its own.
    pub fn isolate(&mut self, statement: Statement, usage: QubitUsage) -> usize {
        self.push(vec![statement], usage, false)
    }

    fn push(&mut self, statements: Vec<Statement>, usage: QubitUsage, open: bool) -> usize {
        let index = self.moments.len();
        self.freeze(&usage, index);
        self.moments.push(Moment {
            statements,
            usage,
            open,
        });
        index
    }

    fn freeze(&mut self, usage: &QubitUsage, index: usize) {
        for (key, slot) in usage.iter() {
            self.freeze.insert((key.clone(), slot), index);
        }
    }

    /// Number of moments so far.
    pub fn len(&self) -> usize {
        self.moments.len()
    }

    /// Collapse the moments into a sequential block.
    ///
    /// A single-occupant moment becomes its statement; a multi-occupant one
    /// becomes a parallel block in insertion order.
    pub fn finish(self) -> (Block, ScheduleStats) {
        let mut stats = ScheduleStats {
            blocks_scheduled: 1,
            moments: self.moments.len(),
            ..ScheduleStats::default()
        };
        let mut statements = Vec::with_capacity(self.moments.len());
        for moment in self.moments {
            stats.statements_placed += moment.statements.len();
            if moment.statements.len() > 1 {
                stats.parallel_moments += 1;
            }
            statements.extend(moment.collapse());
        }
        (Block::sequential(statements), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaqal_ir::{GateCall, NamedQubit, NativeGateSet};

    fn px(i: usize) -> (Statement, QubitUsage) {
        let def = NativeGateSet::qscout().get("Px").cloned().unwrap();
        let stmt = GateCall::native(def, vec![NamedQubit::new("q", i).into()]).into();
        let mut usage = QubitUsage::new();
        usage.insert(UsageKey::Register("q".into()), i);
        (stmt, usage)
    }

    #[test]
    fn test_disjoint_gates_share_moment() {
        let mut t = Timeline::new();
        let (a, ua) = px(0);
        let (b, ub) = px(1);
        assert_eq!(t.place(a, ua, None), 0);
        assert_eq!(t.place(b, ub, None), 0);
        let (block, stats) = t.finish();
        assert_eq!(block.len(), 1);
        assert!(block.statements[0].as_block().unwrap().is_parallel());
        assert_eq!(stats.parallel_moments, 1);
        assert_eq!(stats.statements_placed, 2);
    }

    #[test]
    fn test_same_qubit_goes_later() {
        let mut t = Timeline::new();
        let (a, ua) = px(0);
        let (b, ub) = px(0);
        assert_eq!(t.place(a, ua, None), 0);
        assert_eq!(t.place(b, ub, None), 1);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_isolated_moment_is_closed() {
        let mut t = Timeline::new();
        let (a, ua) = px(0);
        let (b, ub) = px(1);
        assert_eq!(t.isolate(a, ua), 0);
        assert_eq!(t.place(b, ub, None), 1);
    }

    #[test]
    fn test_after_pushes_past_earlier_moments() {
        let mut t = Timeline::new();
        let (a, ua) = px(0);
        let (b, ub) = px(1);
        t.place(a, ua, None);
        assert_eq!(t.earliest(&ub, Some(0)), 1);
        assert_eq!(t.place(b, ub, Some(0)), 1);
    }

    #[test]
    fn test_group_merges_into_open_moment() {
        let mut t = Timeline::new();
        let (a, ua) = px(0);
        let (b, ub) = px(1);
        let (c, uc) = px(2);
        t.place(a, ua, None);
        let group = Block::parallel(vec![b, c]);
        assert_eq!(t.place_group(group, ub.union(&uc), None), 0);
        let (block, stats) = t.finish();
        assert_eq!(block.len(), 1);
        assert_eq!(block.statements[0].as_block().unwrap().len(), 3);
        assert_eq!(stats.statements_placed, 3);
    }

    #[test]
    fn test_group_without_room_stays_whole_and_closed() {
        let mut t = Timeline::new();
        let (a, ua) = px(0);
        let (b, ub) = px(0);
        let (c, uc) = px(1);
        t.place(a, ua, None);
        let group = Block::parallel(vec![b.clone()]);
        assert_eq!(t.place_group(group.clone(), ub, None), 1);
        assert_eq!(t.place(c, uc, None), 0);
        // q[1] is free in moment 1, but the authored group admits no one.
        let (d, ud) = px(1);
        assert_eq!(t.place(d, ud, Some(0)), 2);
        let (block, _) = t.finish();
        assert_eq!(block.statements[1], Statement::from(group));
    }
}
