//! Default values of the Pixardis machine.

/// Default display size, matching the sample programs.
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 48;

/// Fixed default RNG seed. Runs are reproducible unless the host picks
/// its own seed at creation.
pub const DEFAULT_SEED: u64 = 0x5049_5841;

/// Levels of nesting allowed in the call stack. Programs that recurse
/// past this stop with a runtime error instead of eating the heap.
pub const MAX_CALL_DEPTH: usize = 256;
