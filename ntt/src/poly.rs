//! Sparse polynomials: a degree-to-coefficient map used as an algebraic
//! representation outside the transform hot loops.

use {
    crate::{ring::Ring, vector::Vector, word::Word},
    std::{collections::BTreeMap, sync::Arc},
};

pub struct Poly<T: Word> {
    ring: Arc<Ring<T>>,
    coeffs: BTreeMap<usize, T>,
}

impl<T: Word> Poly<T> {
    pub fn new(ring: &Arc<Ring<T>>) -> Self {
        Self {
            ring: Arc::clone(ring),
            coeffs: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, degree: usize, coeff: T) {
        if coeff == T::zero() {
            self.coeffs.remove(&degree);
        } else {
            self.coeffs.insert(degree, coeff);
        }
    }

    pub fn get(&self, degree: usize) -> T {
        self.coeffs.get(&degree).copied().unwrap_or_else(T::zero)
    }

    /// Degree of the highest non-zero term; `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.keys().next_back().copied()
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn clear(&mut self) {
        self.coeffs.clear();
    }

    /// Evaluate at `x` by exponentiation of the sparse terms.
    pub fn eval(&self, x: T) -> T {
        let mut acc = T::zero();
        for (&degree, &coeff) in &self.coeffs {
            let term = self.ring.mul(coeff, self.ring.exp(x, T::from_usize(degree)));
            acc = self.ring.add(acc, term);
        }
        acc
    }

    /// Densify into a vector of length `n`; terms of degree >= n must not
    /// exist.
    pub fn to_vector(&self, n: usize) -> Vector<'static, T> {
        assert!(
            self.degree().map_or(true, |d| d < n),
            "polynomial degree exceeds the vector length"
        );
        let mut v = Vector::new(&self.ring, n);
        for (&degree, &coeff) in &self.coeffs {
            v.set(degree, coeff);
        }
        v
    }
}

impl<T: Word> PartialEq for Poly<T> {
    fn eq(&self, other: &Self) -> bool {
        self.coeffs == other.coeffs
    }
}

impl<T: Word> Eq for Poly<T> {}

impl<T: Word> core::fmt::Debug for Poly<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (&degree, &coeff) in self.coeffs.iter().rev() {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{coeff}*x^{degree}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gf() -> Arc<Ring<u32>> {
        Arc::new(Ring::prime(97).unwrap())
    }

    #[test]
    fn sparse_set_get() {
        let gf = gf();
        let mut p = Poly::new(&gf);
        assert!(p.is_zero());
        p.set(0, 3);
        p.set(100, 5);
        assert_eq!(p.get(0), 3);
        assert_eq!(p.get(50), 0);
        assert_eq!(p.degree(), Some(100));
        p.set(100, 0);
        assert_eq!(p.degree(), Some(0));
    }

    #[test]
    fn eval_horner_free() {
        let gf = gf();
        let mut p = Poly::new(&gf);
        // 3 + 2x + x^3 at x = 5: 3 + 10 + 125 = 138 = 41 mod 97
        p.set(0, 3);
        p.set(1, 2);
        p.set(3, 1);
        assert_eq!(p.eval(5), 41);
    }

    #[test]
    fn round_trips_through_vectors() {
        let gf = gf();
        let v = Vector::from_slice(&gf, &[1, 0, 7, 0]);
        let p = v.to_poly();
        assert_eq!(p.degree(), Some(2));
        assert_eq!(p.to_vector(4), v);
    }
}
