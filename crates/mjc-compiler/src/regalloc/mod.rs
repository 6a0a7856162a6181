//! Register allocation
//!
//! Maps every variable of a method body to a JVM local slot. The receiver
//! and parameters are pinned: slot 0 is `this` in instance methods and
//! parameters follow in declaration order. Locals and temporaries either
//! each get their own slot, or are colored over the interference graph of
//! their live intervals when the budget asks for packing.

mod liveness;

pub use liveness::{Interval, Liveness};

use rustc_hash::FxHashMap;

use crate::error::{CompileError, CompileResult};
use crate::ir::Method;

/// How many slots a method body may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterBudget {
    /// One slot per distinct variable, no packing.
    #[default]
    PerVariable,
    /// Pack into as few slots as the coloring finds.
    Minimize,
    /// Pack, then fail if more than `n` slots beyond the pinned ones are
    /// needed.
    Limit(u32),
}

/// Slot assignment for one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    slots: FxHashMap<String, u32>,
    slot_count: u32,
}

impl Allocation {
    pub fn slot(&self, name: &str) -> Option<u32> {
        self.slots.get(name).copied()
    }

    /// Total slots the method occupies, pinned ones included.
    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }
}

/// Assigns a slot to every variable of `method` under `budget`.
pub fn allocate(method: &Method, budget: RegisterBudget) -> CompileResult<Allocation> {
    let mut slots = FxHashMap::default();
    let mut next = 0u32;

    if !method.is_static {
        slots.insert("this".to_string(), next);
        next += 1;
    }
    for param in &method.params {
        slots.insert(param.name.clone(), next);
        next += 1;
    }
    let base = next;

    let live = Liveness::analyze(method);

    match budget {
        RegisterBudget::PerVariable => {
            for id in 0..live.len() {
                slots.insert(live.name(id).to_string(), base + id as u32);
            }
            Ok(Allocation {
                slots,
                slot_count: base + live.len() as u32,
            })
        }
        RegisterBudget::Minimize | RegisterBudget::Limit(_) => {
            let colors = color(&live);
            let used = colors.iter().map(|&c| c + 1).max().unwrap_or(0);
            if let RegisterBudget::Limit(max) = budget {
                if used > max {
                    return Err(CompileError::NotEnoughRegisters {
                        needed: used,
                        method: method.name.clone(),
                    });
                }
            }
            for (id, &color) in colors.iter().enumerate() {
                slots.insert(live.name(id).to_string(), base + color);
            }
            Ok(Allocation {
                slots,
                slot_count: base + used,
            })
        }
    }
}

/// Greedy graph coloring, highest degree first. Deterministic: ties keep
/// first-occurrence order, and each node takes the smallest color free
/// among its already-colored neighbors.
fn color(live: &Liveness) -> Vec<u32> {
    let n = live.len();
    let mut degree = vec![0usize; n];
    for a in 0..n {
        for b in (a + 1)..n {
            if live.interferes(a, b) {
                degree[a] += 1;
                degree[b] += 1;
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| degree[b].cmp(&degree[a]).then(a.cmp(&b)));

    let mut colors = vec![u32::MAX; n];
    for &id in &order {
        let mut taken: Vec<u32> = (0..n)
            .filter(|&other| colors[other] != u32::MAX && live.interferes(id, other))
            .map(|other| colors[other])
            .collect();
        taken.sort_unstable();
        let mut candidate = 0u32;
        for c in taken {
            if c == candidate {
                candidate += 1;
            } else if c > candidate {
                break;
            }
        }
        colors[id] = candidate;
    }
    colors
}
