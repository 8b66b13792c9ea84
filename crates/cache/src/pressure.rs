//! Memory pressure levels delivered by the host runtime
//!
//! The host calls back at unpredictable times with a graded trim level. Only
//! a few of those levels ask the image cache to give memory back; the rest
//! are informational and leave the cache untouched.

/// Memory pressure level reported by the host
///
/// Ordered from least to most severe. The raw values match the trim levels
/// the host passes to its memory callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemoryPressure {
    /// Process is in the foreground, system memory is getting low
    RunningModerate,
    /// Process is in the foreground, system memory is low
    RunningLow,
    /// Process is in the foreground, system memory is critically low
    RunningCritical,
    /// Process UI was hidden
    UiHidden,
    /// Process went to the background and is on the kill list
    Background,
    /// Process is in the middle of the background kill list
    Moderate,
    /// Process is next to be killed if memory is not freed
    Critical,
}

/// What the image cache does in reaction to a pressure level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureResponse {
    /// Leave the cache as it is
    Ignore,
    /// Evict down to half of capacity
    Trim,
    /// Evict every entry
    Clear,
}

impl MemoryPressure {
    /// All levels, least severe first
    pub const ALL: [MemoryPressure; 7] = [
        MemoryPressure::RunningModerate,
        MemoryPressure::RunningLow,
        MemoryPressure::RunningCritical,
        MemoryPressure::UiHidden,
        MemoryPressure::Background,
        MemoryPressure::Moderate,
        MemoryPressure::Critical,
    ];

    /// Map a raw host trim level to a pressure level
    ///
    /// Returns `None` for values the host does not define.
    pub fn from_trim_level(level: i32) -> Option<Self> {
        match level {
            5 => Some(MemoryPressure::RunningModerate),
            10 => Some(MemoryPressure::RunningLow),
            15 => Some(MemoryPressure::RunningCritical),
            20 => Some(MemoryPressure::UiHidden),
            40 => Some(MemoryPressure::Background),
            60 => Some(MemoryPressure::Moderate),
            80 => Some(MemoryPressure::Critical),
            _ => None,
        }
    }

    /// Raw host trim level for this pressure level
    pub fn trim_level(self) -> i32 {
        match self {
            MemoryPressure::RunningModerate => 5,
            MemoryPressure::RunningLow => 10,
            MemoryPressure::RunningCritical => 15,
            MemoryPressure::UiHidden => 20,
            MemoryPressure::Background => 40,
            MemoryPressure::Moderate => 60,
            MemoryPressure::Critical => 80,
        }
    }

    /// How the image cache responds to this level
    pub fn response(self) -> PressureResponse {
        match self {
            MemoryPressure::Background | MemoryPressure::Moderate => PressureResponse::Trim,
            MemoryPressure::Critical => PressureResponse::Clear,
            _ => PressureResponse::Ignore,
        }
    }
}
