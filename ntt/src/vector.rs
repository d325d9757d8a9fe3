//! Fixed-length element vectors bound to a ring.

use {
    crate::{poly::Poly, ring::Ring, word::Word},
    rand::Rng,
    std::sync::Arc,
};

/// Backing memory of a vector: either an allocation released with the
/// vector, or a view into memory owned by someone else.
#[derive(Debug)]
pub enum Storage<'a, T> {
    Owned(Vec<T>),
    Borrowed(&'a mut [T]),
}

impl<T> Storage<'_, T> {
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Storage::Owned(v) => v,
            Storage::Borrowed(s) => s,
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Storage::Owned(v) => v,
            Storage::Borrowed(s) => s,
        }
    }
}

/// A 1D vector of ring elements.
///
/// Its length is fixed at construction. Index access is bounds-checked.
/// The ring is shared read-only; dropping the vector only releases owned
/// storage.
pub struct Vector<'a, T: Word> {
    ring: Arc<Ring<T>>,
    elems: Storage<'a, T>,
}

impl<'a, T: Word> Vector<'a, T> {
    /// A zero-filled owned vector of length `n`.
    pub fn new(ring: &Arc<Ring<T>>, n: usize) -> Self {
        Self {
            ring: Arc::clone(ring),
            elems: Storage::Owned(vec![T::zero(); n]),
        }
    }

    pub fn from_slice(ring: &Arc<Ring<T>>, values: &[T]) -> Self {
        Self {
            ring: Arc::clone(ring),
            elems: Storage::Owned(values.to_vec()),
        }
    }

    /// Wrap foreign memory; the memory is never released here.
    pub fn borrowed(ring: &Arc<Ring<T>>, mem: &'a mut [T]) -> Self {
        Self {
            ring: Arc::clone(ring),
            elems: Storage::Borrowed(mem),
        }
    }

    /// A borrowed view over `self[offset..offset + len]`.
    pub fn view(&mut self, offset: usize, len: usize) -> Vector<'_, T> {
        let ring = Arc::clone(&self.ring);
        Vector {
            elems: Storage::Borrowed(&mut self.elems.as_mut_slice()[offset..offset + len]),
            ring,
        }
    }

    pub fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    pub fn len(&self) -> usize {
        self.elems.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> T {
        self.elems.as_slice()[i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, value: T) {
        self.elems.as_mut_slice()[i] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        self.elems.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.elems.as_mut_slice()
    }

    pub fn zero_fill(&mut self) {
        self.fill(T::zero());
    }

    pub fn fill(&mut self, value: T) {
        self.elems.as_mut_slice().fill(value);
    }

    pub fn rand<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let ring = Arc::clone(&self.ring);
        for e in self.elems.as_mut_slice() {
            *e = ring.rand(rng);
        }
    }

    pub fn mul_scalar(&mut self, scalar: T) {
        let ring = Arc::clone(&self.ring);
        for e in self.elems.as_mut_slice() {
            *e = ring.mul(*e, scalar);
        }
    }

    /// Multiply the i-th element by beta^i, i >= 1.
    pub fn mul_beta(&mut self, beta: T) {
        let ring = Arc::clone(&self.ring);
        let mut coef = beta;
        let elems = self.elems.as_mut_slice();
        for e in elems.iter_mut().skip(1) {
            *e = ring.mul(*e, coef);
            coef = ring.mul(coef, beta);
        }
    }

    /// Entrywise product with `other`.
    pub fn hadamard_mul(&mut self, other: &Vector<'_, T>) {
        let ring = Arc::clone(&self.ring);
        ring.hadamard_mul(self.elems.as_mut_slice(), other.as_slice());
    }

    pub fn add(&mut self, other: &Vector<'_, T>) {
        assert_eq!(self.len(), other.len(), "vector lengths must match");
        self.add_at_offset(other, 0);
    }

    /// `self[offset + i] += other[i]` for every i.
    pub fn add_at_offset(&mut self, other: &Vector<'_, T>, offset: usize) {
        assert!(
            self.len() >= other.len() + offset,
            "added vector does not fit at the given offset"
        );
        let ring = Arc::clone(&self.ring);
        let dst = &mut self.elems.as_mut_slice()[offset..];
        for (d, s) in dst.iter_mut().zip(other.as_slice()) {
            *d = ring.add(*d, *s);
        }
    }

    /// Copy `src` into the front of `self` and zero the remainder. `src`
    /// must not be longer than `self`.
    pub fn copy_with_pad(&mut self, src: &Vector<'_, T>) {
        assert!(src.len() <= self.len(), "source does not fit");
        let dst = self.elems.as_mut_slice();
        dst[..src.len()].copy_from_slice(src.as_slice());
        dst[src.len()..].fill(T::zero());
    }

    pub fn neg(&mut self) {
        let ring = Arc::clone(&self.ring);
        for e in self.elems.as_mut_slice() {
            *e = ring.neg(*e);
        }
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.elems.as_mut_slice().swap(i, j);
    }

    pub fn sort(&mut self) {
        self.elems.as_mut_slice().sort_unstable();
    }

    pub fn to_poly(&self) -> Poly<T> {
        let mut poly = Poly::new(&self.ring);
        for (i, &e) in self.as_slice().iter().enumerate() {
            poly.set(i, e);
        }
        poly
    }
}

impl<'b, T: Word> PartialEq<Vector<'b, T>> for Vector<'_, T> {
    fn eq(&self, other: &Vector<'b, T>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Word> Eq for Vector<'_, T> {}

impl<T: Word> core::fmt::Debug for Vector<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "( ")?;
        for e in self.as_slice() {
            write!(f, "{e} ")?;
        }
        write!(f, ")")
    }
}
