//! Recording counters.

use std::ops::AddAssign;

use crate::command::RenderCommand;

/// Counters maintained while a list records.
///
/// Zeroed by [`CommandList::reset`](crate::CommandList::reset). The
/// executor sums them into per-frame totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommandListStats {
    /// Commands recorded, of every kind.
    pub num_commands: u32,
    /// Draw commands recorded.
    pub num_draw_calls: u32,
    /// Compute and ray dispatches recorded.
    pub num_dispatch_calls: u32,
}

impl CommandListStats {
    pub(crate) fn count(&mut self, command: &RenderCommand) {
        self.num_commands += 1;
        if command.is_draw() {
            self.num_draw_calls += 1;
        }
        if command.is_dispatch() {
            self.num_dispatch_calls += 1;
        }
    }
}

impl AddAssign for CommandListStats {
    fn add_assign(&mut self, rhs: Self) {
        self.num_commands += rhs.num_commands;
        self.num_draw_calls += rhs.num_draw_calls;
        self.num_dispatch_calls += rhs.num_dispatch_calls;
    }
}
