//! Dense row-major storage for tile stacks and per-cell overlays.

use ant_factory_core::{LaserMask, Orientation, Position};

/// Address of a single tile: the cell holding its stack and its stack index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileAddress {
    position: Position,
    index: usize,
}

impl TileAddress {
    /// Creates a new tile address.
    #[must_use]
    pub const fn new(position: Position, index: usize) -> Self {
        Self { position, index }
    }

    /// Cell holding the addressed stack.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Index of the tile inside its stack, counted from the bottom.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Fixed-size grid where every cell holds an ordered stack of values.
///
/// Stack order is load-bearing: later entries sit on top. Lookups outside
/// the grid yield an empty stack and writes outside it are ignored.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<Vec<T>>,
}

impl<T> Grid<T> {
    /// Creates a grid of empty stacks.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity = cell_count(width, height);
        let mut cells = Vec::with_capacity(capacity);
        cells.resize_with(capacity, Vec::new);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the coordinates lie inside the grid.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        index(self.width, self.height, x, y).is_some()
    }

    /// Stack stored at `(x, y)`, empty when out of bounds.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> &[T] {
        match index(self.width, self.height, x, y) {
            Some(offset) => &self.cells[offset],
            None => &[],
        }
    }

    /// Stack stored at `position`, empty when out of bounds.
    #[must_use]
    pub fn stack(&self, position: Position) -> &[T] {
        self.get(position.x(), position.y())
    }

    /// Mutable stack stored at `position`.
    #[must_use]
    pub fn stack_mut(&mut self, position: Position) -> Option<&mut Vec<T>> {
        let offset = index(self.width, self.height, position.x(), position.y())?;
        self.cells.get_mut(offset)
    }

    /// Replaces the stack at `(x, y)`; ignored when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, stack: Vec<T>) {
        if let Some(offset) = index(self.width, self.height, x, y) {
            self.cells[offset] = stack;
        }
    }

    /// Places `value` on top of the stack at `(x, y)`; ignored when out of bounds.
    pub fn push(&mut self, x: i32, y: i32, value: T) {
        if let Some(offset) = index(self.width, self.height, x, y) {
            self.cells[offset].push(value);
        }
    }

    /// Value stored at the provided address.
    #[must_use]
    pub fn tile(&self, address: TileAddress) -> Option<&T> {
        self.stack(address.position()).get(address.index())
    }

    /// Mutable value stored at the provided address.
    #[must_use]
    pub fn tile_mut(&mut self, address: TileAddress) -> Option<&mut T> {
        self.stack_mut(address.position())?
            .get_mut(address.index())
    }

    /// Every cell position in raster order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |y| {
            (0..width).map(move |x| Position::new(x as i32, y as i32))
        })
    }

    /// Iterates over every stack together with its position, in raster order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &[T])> {
        self.positions().zip(self.cells.iter().map(Vec::as_slice))
    }

    /// Iterates mutably over every stored value in raster order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut().flatten()
    }
}

/// Dense single-value overlay with the same dimensions as a stage.
///
/// Out-of-range reads return `T::default()`; out-of-range writes are
/// ignored.
#[derive(Clone, Debug)]
pub struct Layer<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// Per-cell bitmask of active beam orientations.
pub type LaserGrid = Layer<LaserMask>;

impl<T: Copy + Default> Layer<T> {
    /// Creates a layer filled with `T::default()`.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![T::default(); cell_count(width, height)],
        }
    }

    /// Value stored at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> T {
        index(self.width, self.height, x, y)
            .and_then(|offset| self.cells.get(offset).copied())
            .unwrap_or_default()
    }

    /// Value stored at `position`.
    #[must_use]
    pub fn at(&self, position: Position) -> T {
        self.get(position.x(), position.y())
    }

    /// Overwrites the value at `(x, y)`; ignored when out of bounds.
    pub fn set(&mut self, x: i32, y: i32, value: T) {
        if let Some(offset) = index(self.width, self.height, x, y) {
            self.cells[offset] = value;
        }
    }

    /// Resets every cell to `T::default()`.
    pub fn reset(&mut self) {
        self.cells.fill(T::default());
    }

    /// Iterates over every value together with its position, in raster order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, T)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().map(move |(offset, value)| {
            let offset = offset as u32;
            (
                Position::new((offset % width) as i32, (offset / width) as i32),
                *value,
            )
        })
    }
}

impl Layer<LaserMask> {
    /// Adds `orientation` to the beam mask of `position`.
    pub fn deposit(&mut self, position: Position, orientation: Orientation) {
        let mask = self.at(position).with(orientation);
        self.set(position.x(), position.y(), mask);
    }
}

fn cell_count(width: u32, height: u32) -> usize {
    let count = u64::from(width) * u64::from(height);
    usize::try_from(count).unwrap_or(0)
}

fn index(width: u32, height: u32, x: i32, y: i32) -> Option<usize> {
    let column = u32::try_from(x).ok()?;
    let row = u32::try_from(y).ok()?;
    if column >= width || row >= height {
        return None;
    }

    let row = usize::try_from(row).ok()?;
    let column = usize::try_from(column).ok()?;
    let width = usize::try_from(width).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_empty() {
        let mut grid: Grid<u8> = Grid::new(3, 2);
        grid.push(1, 1, 7);

        assert_eq!(grid.get(1, 1), &[7]);
        assert!(grid.get(-1, 0).is_empty());
        assert!(grid.get(3, 0).is_empty());
        assert!(grid.get(0, 2).is_empty());
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut grid: Grid<u8> = Grid::new(2, 2);
        grid.push(5, 5, 1);
        grid.set(-1, 0, vec![1, 2]);

        assert!(grid.iter().all(|(_, stack)| stack.is_empty()));
    }

    #[test]
    fn push_keeps_stack_order() {
        let mut grid: Grid<&str> = Grid::new(1, 1);
        grid.push(0, 0, "ground");
        grid.push(0, 0, "cable");

        assert_eq!(grid.get(0, 0), &["ground", "cable"]);
        assert_eq!(grid.tile(TileAddress::new(Position::new(0, 0), 1)), Some(&"cable"));
    }

    #[test]
    fn positions_follow_raster_order() {
        let grid: Grid<u8> = Grid::new(2, 2);
        let positions: Vec<_> = grid.positions().collect();

        assert_eq!(
            positions,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1),
            ]
        );
    }

    #[test]
    fn laser_layer_accumulates_orientations() {
        let mut layer = LaserGrid::new(2, 1);
        layer.deposit(Position::new(1, 0), Orientation::Right);
        layer.deposit(Position::new(1, 0), Orientation::Up);
        layer.deposit(Position::new(4, 0), Orientation::Up);

        assert_eq!(layer.get(1, 0).bits(), 0b1001);
        assert!(layer.get(4, 0).is_empty());

        layer.reset();
        assert!(layer.iter().all(|(_, mask)| mask.is_empty()));
    }
}
