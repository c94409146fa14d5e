#![warn(clippy::all, clippy::pedantic)]

/// Level and game-mode facts the engine reads from the host.
pub trait GameProgress {
    fn level(&self) -> u32;
    fn first_level(&self) -> u32;
    fn first_garbage(&self) -> u32;
    /// Garbage rows per level gained, or 0 to use the behavior default.
    fn garbage_per_level(&self) -> u32;
    fn is_hard(&self) -> bool {
        false
    }
    fn set_level(&mut self, level: u32);
}

/// Fall-rate controller that displacement attacks accelerate.
pub trait Displacement {
    fn accelerate(&mut self, rows: u32);
}

/// Plain host-side game info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameInfo {
    pub level: u32,
    pub first_level: u32,
    pub first_garbage: u32,
    pub garbage_per_level: u32,
    pub hard: bool,
    pub displaced_rows: u32,
}

impl GameInfo {
    #[must_use]
    pub fn new(first_level: u32, first_garbage: u32) -> Self {
        Self {
            level: first_level,
            first_level,
            first_garbage,
            ..Self::default()
        }
    }
}

impl GameProgress for GameInfo {
    fn level(&self) -> u32 {
        self.level
    }

    fn first_level(&self) -> u32 {
        self.first_level
    }

    fn first_garbage(&self) -> u32 {
        self.first_garbage
    }

    fn garbage_per_level(&self) -> u32 {
        self.garbage_per_level
    }

    fn is_hard(&self) -> bool {
        self.hard
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
    }
}

impl Displacement for GameInfo {
    fn accelerate(&mut self, rows: u32) {
        self.displaced_rows += rows;
    }
}
