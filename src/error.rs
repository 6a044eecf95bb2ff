use thiserror::Error;

/// Rejected construction-time parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("play area {width}x{height} must have both sides between 1 and {max}")]
    InvalidArea { width: i32, height: i32, max: i32 },
    #[error("tick period must be non-zero")]
    ZeroTickPeriod,
    #[error("movement stride must be positive and fit the play area, got {0}")]
    InvalidStride(i32),
    #[error("eating threshold must be positive, got {0}")]
    InvalidThreshold(i32),
    #[error("prey margin and half extent must lie between 0 and the shorter side, got {margin} and {half_extent}")]
    InvalidPreyGeometry { margin: i32, half_extent: i32 },
    #[error("play area {width}x{height} leaves no room for prey with margin {margin}")]
    AreaTooSmall { width: i32, height: i32, margin: i32 },
    #[error("initial snake body must not be empty")]
    EmptyBody,
    #[error("initial snake segment ({x}, {y}) lies outside the play area")]
    BodyOutOfBounds { x: i32, y: i32 },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("game state lock poisoned by a panicking thread")]
    Poisoned,
}
