// positions live in pixel-space: x grows to the right, y grows downwards,
// so moving up means decreasing y
use std::fmt;

/// A point on the play area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Position {
        Position { x, y }
    }

    pub fn get_left(&self, stride: i32) -> Position {
        Position::new(self.x - stride, self.y)
    }
    pub fn get_right(&self, stride: i32) -> Position {
        Position::new(self.x + stride, self.y)
    }
    pub fn get_up(&self, stride: i32) -> Position {
        Position::new(self.x, self.y - stride)
    }
    pub fn get_down(&self, stride: i32) -> Position {
        Position::new(self.x, self.y + stride)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position::new(x, y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// True if turning from `self` to `other` would reverse the snake onto itself
    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// Axis-aligned rectangle given by its two opposite corners `(x0, y0)` and `(x1, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    /// Square of side `2 * half_extent` centred on `center`
    pub fn around(center: Position, half_extent: i32) -> BoundingBox {
        BoundingBox {
            x0: center.x - half_extent,
            y0: center.y - half_extent,
            x1: center.x + half_extent,
            y1: center.y + half_extent,
        }
    }

    pub fn center(&self) -> Position {
        Position::new((self.x0 + self.x1) / 2, (self.y0 + self.y1) / 2)
    }

    pub fn as_tuple(&self) -> (i32, i32, i32, i32) {
        (self.x0, self.y0, self.x1, self.y1)
    }
}

/// Offsets `position` by `stride` along the axis and sign of `direction`.
pub fn step(position: Position, direction: Direction, stride: i32) -> Position {
    match direction {
        Direction::Left => position.get_left(stride),
        Direction::Right => position.get_right(stride),
        Direction::Up => position.get_up(stride),
        Direction::Down => position.get_down(stride),
    }
}

/// Inclusive on every edge: a position sitting exactly on `x == width` is
/// still inside, only strictly exceeding a bound counts as leaving the area.
pub fn is_within_bounds(position: Position, width: i32, height: i32) -> bool {
    position.x >= 0 && position.x <= width && position.y >= 0 && position.y <= height
}

/// Per-axis proximity test, strict on both axes. This is a square
/// neighbourhood, not a Euclidean radius.
pub fn is_near(a: Position, b: Position, threshold: i32) -> bool {
    num::abs(a.x - b.x) < threshold && num::abs(a.y - b.y) < threshold
}
