//! The read-only state `step` observes: the previous step's result plus
//! read access to memory and the current scope chain. `step` never mutates
//! any of this directly — only the driver does, by applying the effects a
//! `StepOutcome` describes.

use crate::control::StepResult;
use crate::memory::Memory;
use crate::scope::{GlobalMap, Scope};
use std::rc::Rc;

/// Everything `step` is allowed to read. Holding `&Memory`/`&GlobalMap`
/// rather than owned copies keeps `step` from being able to mutate either,
/// preserving its purity.
#[derive(Clone, Debug)]
pub struct State<'a> {
    /// The previously produced result, e.g. the just-evaluated child's
    /// value, waiting to be consumed by the parent frame's next step.
    pub result: StepResult,
    pub memory: &'a Memory,
    pub scope: Rc<Scope>,
    pub global_map: &'a GlobalMap,
}

impl<'a> State<'a> {
    pub fn new(memory: &'a Memory, scope: Rc<Scope>, global_map: &'a GlobalMap) -> Self {
        State { result: StepResult::Void, memory, scope, global_map }
    }

    pub fn with_result(mut self, result: StepResult) -> Self {
        self.result = result;
        self
    }
}
