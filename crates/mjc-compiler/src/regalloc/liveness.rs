//! Live intervals.
//!
//! One interval per variable over the flat instruction index space. A
//! definition resets the interval start and a use extends its end, so a
//! variable redefined late occupies only its final window. Jumps are not
//! followed; a value kept alive around a loop back edge must show a use
//! after it, which holds for the code the lowerer emits.

use rustc_hash::FxHashMap;

use crate::ir::Method;

/// Closed instruction-index range a variable is live over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Variables of a method body with dense ids and live intervals.
///
/// Ids number variables in first-occurrence order. Parameters and `this`
/// are excluded: their slots are fixed and never recolored. A declared
/// local that no instruction touches gets an id but no interval.
pub struct Liveness {
    names: Vec<String>,
    ids: FxHashMap<String, usize>,
    intervals: Vec<Option<Interval>>,
}

impl Liveness {
    pub fn analyze(method: &Method) -> Self {
        let mut live = Liveness {
            names: Vec::new(),
            ids: FxHashMap::default(),
            intervals: Vec::new(),
        };

        let mut pinned: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
        if !method.is_static {
            pinned.push("this");
        }

        for local in &method.locals {
            live.intern(&local.name);
        }

        for (pos, instr) in method.instrs.iter().enumerate() {
            for var in instr.uses() {
                if pinned.contains(&var.name.as_str()) {
                    continue;
                }
                let id = live.intern(&var.name);
                match &mut live.intervals[id] {
                    Some(interval) => interval.end = pos,
                    slot => *slot = Some(Interval::at(pos)),
                }
            }
            if let Some(var) = instr.dest() {
                if pinned.contains(&var.name.as_str()) {
                    continue;
                }
                let id = live.intern(&var.name);
                match &mut live.intervals[id] {
                    Some(interval) => interval.start = pos,
                    slot => *slot = Some(Interval::at(pos)),
                }
            }
        }

        live
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        self.intervals.push(None);
        id
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    pub fn interval(&self, id: usize) -> Option<Interval> {
        self.intervals[id]
    }

    /// Whether two variables are ever live at the same time.
    pub fn interferes(&self, a: usize, b: usize) -> bool {
        match (self.intervals[a], self.intervals[b]) {
            (Some(ia), Some(ib)) => ia.overlaps(&ib),
            _ => false,
        }
    }
}
