//! Array-backed grid for fixed-size regions

use crate::core::error::GridError;
use crate::core::types::GridCoord;
use crate::spatial::grid::{BoundedGrid, Grid};

/// Dense 2D grid stored row-major in a flat `Vec`
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> DenseGrid<T> {
    /// Grid with every cell at `T::default()`
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        Self::filled(width, height, T::default())
    }

    /// Grid with every cell at `value`
    pub fn filled(width: usize, height: usize, value: T) -> Result<Self, GridError> {
        check_extent(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; width * height],
        })
    }

    /// Wrap pre-populated row-major data
    ///
    /// `data.len()` must equal `width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<T>) -> Result<Self, GridError> {
        check_extent(width, height)?;
        if data.len() != width * height {
            return Err(GridError::DimensionMismatch {
                len: data.len(),
                width,
                height,
            });
        }
        Ok(Self { width, height, data })
    }
}

impl<T> DenseGrid<T> {
    #[inline]
    pub fn index_of(&self, coord: GridCoord) -> Option<usize> {
        if coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
        {
            Some(coord.y as usize * self.width + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, coord: GridCoord) -> Option<&T> {
        self.index_of(coord).map(|i| &self.data[i])
    }

    #[inline]
    pub fn get_mut(&mut self, coord: GridCoord) -> Option<&mut T> {
        let i = self.index_of(coord)?;
        Some(&mut self.data[i])
    }

    /// Coordinate of a flattened index
    #[inline]
    pub fn coord_of(&self, index: usize) -> GridCoord {
        GridCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Values in row-major order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Coordinates paired with values, row-major
    pub fn cells(&self) -> impl Iterator<Item = (GridCoord, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.coord_of(i), v))
    }

    /// Same-shaped grid with `f` applied to every cell
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> DenseGrid<U> {
        DenseGrid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    fn out_of_range(&self, coord: GridCoord) -> GridError {
        GridError::OutOfRange {
            coord,
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: bytemuck::Pod> DenseGrid<T> {
    /// Zero-copy byte view of the backing store, for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T: Clone + Default> Grid for DenseGrid<T> {
    type Cell = T;

    fn get_at(&self, coord: GridCoord) -> Result<T, GridError> {
        self.get(coord).cloned().ok_or_else(|| self.out_of_range(coord))
    }

    fn try_get(&self, coord: GridCoord) -> Option<T> {
        self.get(coord).cloned()
    }

    fn set_at(&mut self, coord: GridCoord, value: T) -> Result<(), GridError> {
        let i = self.index_of(coord).ok_or_else(|| self.out_of_range(coord))?;
        self.data[i] = value;
        Ok(())
    }

    fn remove_at(&mut self, coord: GridCoord) -> Result<(), GridError> {
        self.set_at(coord, T::default())
    }

    fn contains(&self, coord: GridCoord) -> bool {
        self.index_of(coord).is_some()
    }
}

impl<T: Clone + Default> BoundedGrid for DenseGrid<T> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn initialize_with(&mut self, value: T) {
        self.data.fill(value);
    }

    fn data(&self) -> &[T] {
        &self.data
    }

    fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<'a, T> IntoIterator for &'a DenseGrid<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

fn check_extent(width: usize, height: usize) -> Result<(), GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::ZeroSize { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut grid: DenseGrid<i32> = DenseGrid::new(4, 3).unwrap();
        grid.set_at(GridCoord::new(3, 2), 9).unwrap();
        assert_eq!(grid.get_at(GridCoord::new(3, 2)), Ok(9));
        assert_eq!(grid.get_at(GridCoord::new(0, 0)), Ok(0));
    }

    #[test]
    fn test_row_major_layout() {
        let mut grid: DenseGrid<u8> = DenseGrid::new(3, 2).unwrap();
        grid.set_at(GridCoord::new(1, 1), 7).unwrap();
        assert_eq!(grid.index_of(GridCoord::new(1, 1)), Some(4));
        assert_eq!(grid.data()[4], 7);
        assert_eq!(grid.coord_of(4), GridCoord::new(1, 1));
    }

    #[test]
    fn test_out_of_range_access() {
        let mut grid: DenseGrid<i32> = DenseGrid::new(2, 2).unwrap();
        for coord in [
            GridCoord::new(-1, 0),
            GridCoord::new(0, -1),
            GridCoord::new(2, 0),
            GridCoord::new(0, 2),
        ] {
            assert_eq!(
                grid.get_at(coord),
                Err(GridError::OutOfRange { coord, width: 2, height: 2 })
            );
            assert_eq!(grid.try_get(coord), None);
            assert!(grid.set_at(coord, 1).is_err());
            assert!(grid.remove_at(coord).is_err());
            assert!(!grid.contains(coord));
        }
    }

    #[test]
    fn test_remove_resets_to_default() {
        let mut grid: DenseGrid<i32> = DenseGrid::filled(2, 2, 5).unwrap();
        grid.remove_at(GridCoord::new(1, 0)).unwrap();
        assert_eq!(grid.data(), &[5, 0, 5, 5]);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut grid: DenseGrid<i32> = DenseGrid::filled(3, 3, 4).unwrap();
        grid.initialize();
        assert!(grid.iter().all(|&v| v == 0));
        grid.initialize();
        assert!(grid.iter().all(|&v| v == 0));

        grid.initialize_with(-2);
        assert!(grid.iter().all(|&v| v == -2));
    }

    #[test]
    fn test_from_data_checks_length() {
        let grid = DenseGrid::from_data(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(grid.get_at(GridCoord::new(0, 1)), Ok(3));

        assert_eq!(
            DenseGrid::from_data(2, 2, vec![1, 2, 3]),
            Err(GridError::DimensionMismatch { len: 3, width: 2, height: 2 })
        );
    }

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(
            DenseGrid::<i32>::new(0, 5),
            Err(GridError::ZeroSize { width: 0, height: 5 })
        );
    }

    #[test]
    fn test_cells_enumeration_is_restartable() {
        let grid = DenseGrid::from_data(2, 2, vec!['a', 'b', 'c', 'd']).unwrap();
        let first: Vec<_> = grid.cells().map(|(c, v)| (c, *v)).collect();
        let second: Vec<_> = grid.cells().map(|(c, v)| (c, *v)).collect();
        assert_eq!(first, second);
        assert_eq!(first[2], (GridCoord::new(0, 1), 'c'));
        assert_eq!((&grid).into_iter().count(), 4);
    }

    #[test]
    fn test_data_is_shared_storage() {
        let mut grid: DenseGrid<f32> = DenseGrid::new(2, 1).unwrap();
        grid.data_mut()[1] = 3.5;
        assert_eq!(grid.get_at(GridCoord::new(1, 0)), Ok(3.5));
        assert_eq!(grid.as_bytes().len(), 8);
    }

    #[test]
    fn test_map_keeps_shape() {
        let grid = DenseGrid::from_data(2, 1, vec![1, 2]).unwrap();
        let doubled = grid.map(|v| v * 2);
        assert_eq!(doubled.width(), 2);
        assert_eq!(doubled.data(), &[2, 4]);
    }
}
