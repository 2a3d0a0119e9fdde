use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Shape of an `Array2` as board coordinates.
pub fn array_size<T>(array: &Array2<T>) -> Coord2 {
    let (rows, cols) = array.dim();
    (
        rows.try_into().unwrap_or(Coord::MAX),
        cols.try_into().unwrap_or(Coord::MAX),
    )
}

/// Row-major iteration over every coordinate of a board of `size`.
pub fn iter_coords(size: Coord2) -> impl Iterator<Item = Coord2> {
    let (rows, cols) = size;
    (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, array_size(self))
    }
}

/// Neighbours of a cell together with their values.
pub trait NeighborCellIterExt<T>: NeighborIterExt {
    fn iter_neighbor_cells(&self, index: Coord2) -> impl Iterator<Item = (Coord2, T)>;
}

impl<T: Copy> NeighborCellIterExt<T> for Array2<T> {
    fn iter_neighbor_cells(&self, index: Coord2) -> impl Iterator<Item = (Coord2, T)> {
        self.iter_neighbors(index)
            .map(|pos| (pos, self[pos.to_nd_index()]))
    }
}

/// Compass offsets `(d_row, d_col)`, starting up-left and scanning row-major.
///
/// Every "first match" rule in the deduction passes depends on this order.
pub const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn offset(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let row = coords.0.checked_add_signed(delta.0).filter(|&row| row < bounds.0)?;
    let col = coords.1.checked_add_signed(delta.1).filter(|&col| col < bounds.1)?;
    Some((row, col))
}

/// Boundary-clipped 8-connected neighbourhood: 3 cells in a corner, 5 on an
/// edge, 8 in the interior.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    offsets: core::slice::Iter<'static, (i8, i8)>,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            offsets: DISPLACEMENTS.iter(),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let (center, bounds) = (self.center, self.bounds);
        self.offsets
            .find_map(|&delta| offset(center, delta, bounds))
    }
}
