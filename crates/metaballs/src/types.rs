#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub(crate) fn squared_distance(self, x: f64, y: f64) -> f64 {
        let dx = x - self.x;
        let dy = y - self.y;
        dx.mul_add(dx, dy * dy)
    }
}

/// Which population a tagged point belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Species {
    Cell,
    Mutant,
}

impl Species {
    /// `A` marks the original population, every other tag is a mutant strain.
    pub fn from_tag(tag: char) -> Self {
        if tag == 'A' {
            Species::Cell
        } else {
            Species::Mutant
        }
    }
}

/// One input line after parsing and coordinate transformation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRecord {
    pub time: Option<f64>,
    pub cells: Vec<Point>,
    pub mutants: Vec<Point>,
}

impl FrameRecord {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.mutants.is_empty()
    }

    /// All points, cells first.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells.iter().chain(self.mutants.iter()).copied()
    }
}
