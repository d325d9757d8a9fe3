//! Batched coefficient storage.
//!
//! `Buffers` holds `lanes` independent polynomials of `rows` coefficients
//! in an interleaved layout: coefficient i of every lane sits in the
//! contiguous row `data[i * lanes .. (i + 1) * lanes]`. Row-wise butterfly
//! and Hadamard operations therefore stream linearly through memory and
//! vectorise across the lanes.

use {
    crate::{ring::Ring, vector::Storage, word::Word},
    rand::Rng,
    std::sync::Arc,
};

pub struct Buffers<'a, T: Word> {
    ring: Arc<Ring<T>>,
    rows: usize,
    lanes: usize,
    data: Storage<'a, T>,
}

impl<'a, T: Word> Buffers<'a, T> {
    /// Zero-filled owned storage for `lanes` polynomials of `rows`
    /// coefficients.
    pub fn new(ring: &Arc<Ring<T>>, rows: usize, lanes: usize) -> Self {
        assert!(lanes > 0, "buffers need at least one lane");
        Self {
            ring: Arc::clone(ring),
            rows,
            lanes,
            data: Storage::Owned(vec![T::zero(); rows * lanes]),
        }
    }

    /// A borrowed view over the coefficient rows
    /// `offset..offset + rows` of `parent`.
    pub fn view(parent: &'a mut Buffers<'_, T>, offset: usize, rows: usize) -> Self {
        assert!(offset + rows <= parent.rows, "view exceeds parent rows");
        let lanes = parent.lanes;
        let ring = Arc::clone(&parent.ring);
        let data = &mut parent.data.as_mut_slice()[offset * lanes..(offset + rows) * lanes];
        Self {
            ring,
            rows,
            lanes,
            data: Storage::Borrowed(data),
        }
    }

    pub fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// The lane values of coefficient `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.rows, "row index out of range");
        &self.data.as_slice()[i * self.lanes..(i + 1) * self.lanes]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        assert!(i < self.rows, "row index out of range");
        &mut self.data.as_mut_slice()[i * self.lanes..(i + 1) * self.lanes]
    }

    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    pub fn zero_fill(&mut self) {
        self.data.as_mut_slice().fill(T::zero());
    }

    pub fn rand<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let ring = Arc::clone(&self.ring);
        for e in self.data.as_mut_slice() {
            *e = ring.rand(rng);
        }
    }

    /// Copy the rows of `src` into the front of `self` and zero the rest.
    pub fn copy_with_pad(&mut self, src: &Buffers<'_, T>) {
        assert_eq!(self.lanes, src.lanes, "lane counts must match");
        assert!(src.rows <= self.rows, "source does not fit");
        let split = src.rows * self.lanes;
        let dst = self.data.as_mut_slice();
        dst[..split].copy_from_slice(src.as_slice());
        dst[split..].fill(T::zero());
    }

    /// Lane-wise entrywise product across all rows.
    pub fn hadamard_mul(&mut self, other: &Buffers<'_, T>) {
        assert_eq!(self.rows, other.rows, "row counts must match");
        assert_eq!(self.lanes, other.lanes, "lane counts must match");
        let ring = Arc::clone(&self.ring);
        ring.hadamard_mul(self.data.as_mut_slice(), other.as_slice());
    }
}

impl<'b, T: Word> PartialEq<Buffers<'b, T>> for Buffers<'_, T> {
    fn eq(&self, other: &Buffers<'b, T>) -> bool {
        self.rows == other.rows
            && self.lanes == other.lanes
            && self.as_slice() == other.as_slice()
    }
}

impl<T: Word> Eq for Buffers<'_, T> {}

impl<T: Word> core::fmt::Debug for Buffers<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{} rows x {} lanes", self.rows, self.lanes)?;
        for i in 0..self.rows {
            writeln!(f, "{:?}", self.row(i))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gf() -> Arc<Ring<u32>> {
        Arc::new(Ring::prime(7681).unwrap())
    }

    #[test]
    fn rows_are_interleaved_lanes() {
        let gf = gf();
        let mut b = Buffers::new(&gf, 3, 2);
        b.row_mut(0).copy_from_slice(&[1, 2]);
        b.row_mut(2).copy_from_slice(&[5, 6]);
        assert_eq!(b.as_slice(), &[1, 2, 0, 0, 5, 6]);
    }

    #[test]
    fn views_share_rows() {
        let gf = gf();
        let mut b = Buffers::new(&gf, 4, 2);
        for i in 0..4 {
            b.row_mut(i).fill(i as u32);
        }
        let v = Buffers::view(&mut b, 1, 2);
        assert_eq!(v.rows(), 2);
        assert_eq!(v.row(0), &[1, 1]);
        assert_eq!(v.row(1), &[2, 2]);
    }

    #[test]
    fn view_equality_against_owned() {
        let gf = gf();
        let mut b = Buffers::new(&gf, 4, 2);
        b.row_mut(0).copy_from_slice(&[3, 4]);
        b.row_mut(1).copy_from_slice(&[5, 6]);

        let mut expected = Buffers::new(&gf, 2, 2);
        expected.row_mut(0).copy_from_slice(&[3, 4]);
        expected.row_mut(1).copy_from_slice(&[5, 6]);

        assert_eq!(Buffers::view(&mut b, 0, 2), expected);
    }

    #[test]
    fn hadamard_is_lane_wise() {
        let gf = gf();
        let mut a = Buffers::new(&gf, 2, 2);
        a.row_mut(0).copy_from_slice(&[2, 3]);
        a.row_mut(1).copy_from_slice(&[4, 5]);
        let mut b = Buffers::new(&gf, 2, 2);
        b.row_mut(0).copy_from_slice(&[10, 10]);
        b.row_mut(1).copy_from_slice(&[10, 10]);
        a.hadamard_mul(&b);
        assert_eq!(a.row(0), &[20, 30]);
        assert_eq!(a.row(1), &[40, 50]);
    }
}
