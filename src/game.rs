#![warn(clippy::all, clippy::pedantic)]

// Field layout
pub const PANES: usize = 2;
pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 10;
pub const MAX_COLS: usize = 64; // Row masks are u64

// A clear removes at least one full row, so a cycle can never produce more
// than this many rows per field dimension
pub const ROW_CAPACITY_FACTOR: usize = 2;

// Attack defaults
pub const DEFAULT_LEVEL_UP_ROWS: u32 = 1;

// Snapshot versions
pub const SNAPSHOT_VERSION_ORIGINAL: i32 = 0;
pub const SNAPSHOT_VERSION_LAST_TARGETS: i32 = 1;
pub const SNAPSHOT_VERSION: i32 = SNAPSHOT_VERSION_LAST_TARGETS;

// Unset sentinel for piece type/column and last target codes
pub const UNSET: i32 = -1;

// Versus host
pub const LINES_PER_LEVEL: u32 = 10;
pub const DEFAULT_MATCH_CYCLES: u32 = 200;
