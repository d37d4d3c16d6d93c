//! Assembly: recombining solved word-fragments into the final answer
//!
//! The graph and position map are derived from the authored transforms on
//! demand and never stored in a session. The annotation validator uses the
//! same primitives, so a clue that validates assembles the same way at play
//! time.

mod engine;
pub mod graph;
pub mod positions;

pub use engine::{AssemblyPhase, AssemblyPlan, AssemblyProgress, FragmentOutcome};
pub use graph::{consumed_predecessors, DependencyGraph};
pub use positions::{classify, insertion_offset, ContainerSplit, Layout, PositionMap};
