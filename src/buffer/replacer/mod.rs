//! Eviction policy implementations (replacers).
//!
//! Currently implements:
//! - [`ClockReplacer`] - CLOCK (second chance)

mod clock;

pub(crate) use clock::ClockReplacer;
pub(crate) use clock::Victim;
