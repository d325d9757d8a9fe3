//! Mixed-radix Cooley-Tukey decomposition.
//!
//! Splits n = n1 * n2 without any coprimality requirement; a twiddle
//! multiplication between the two passes pays for the freedom. Prime sizes
//! degenerate to a single quadratic pass.

use {
    crate::{
        arith,
        error::{Error, Result},
        fft::{check_root_order, ifft_by_index_reversal, plan, BoxedTransform, FourierTransform},
        ring::Ring,
        vector::Vector,
        word::Word,
    },
    std::sync::Arc,
};

pub struct CooleyTukey<T: Word> {
    ring: Arc<Ring<T>>,
    n: usize,
    n1: usize,
    n2: usize,
    /// Size-n2 passes over the decimated input columns.
    inner: BoxedTransform<T>,
    /// Size-n1 passes recombining the columns.
    outer: BoxedTransform<T>,
    /// w^(j1 * k2), indexed j1 * n2 + k2.
    twiddles: Vec<T>,
    inv_n: T,
}

impl<T: Word> CooleyTukey<T> {
    pub fn new(ring: &Arc<Ring<T>>, n: usize) -> Result<Self> {
        let w = ring.get_nth_root(n)?;
        Self::with_root(ring, n, w)
    }

    pub fn with_root(ring: &Arc<Ring<T>>, n: usize, w: T) -> Result<Self> {
        if n < 2 {
            return Err(Error::InvalidArgument("transform size must be at least 2"));
        }
        check_root_order(ring, w, n)?;

        let n1 = arith::factor_distinct(n as u64)[0] as usize;
        let n2 = n / n1;

        let inner = plan(ring, n2, ring.exp(w, T::from_usize(n1)))?;
        let outer = plan(ring, n1, ring.exp(w, T::from_usize(n2)))?;

        let mut twiddles = vec![T::zero(); n];
        for j1 in 0..n1 {
            for k2 in 0..n2 {
                twiddles[j1 * n2 + k2] = ring.exp(w, T::from_usize(j1 * k2 % n));
            }
        }

        Ok(Self {
            ring: Arc::clone(ring),
            n,
            n1,
            n2,
            inner,
            outer,
            twiddles,
            inv_n: ring.inv(ring.from_int(n))?,
        })
    }
}

impl<T: Word> FourierTransform<T> for CooleyTukey<T> {
    fn n(&self) -> usize {
        self.n
    }

    fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    fn fft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        assert!(input.len() <= self.n, "input length exceeds the transform size");

        let (n1, n2) = (self.n1, self.n2);
        let ring = &self.ring;
        let mut mat = vec![T::zero(); self.n];

        // decimate: column j1 holds x[j1], x[j1 + n1], ...
        let mut row_src = Vector::new(ring, n2);
        let mut row_dst = Vector::new(ring, n2);
        for j1 in 0..n1 {
            for j2 in 0..n2 {
                let idx = j1 + n1 * j2;
                row_src.set(j2, if idx < input.len() { input.get(idx) } else { T::zero() });
            }
            self.inner.fft(&mut row_dst, &row_src);
            for k2 in 0..n2 {
                let tw = self.twiddles[j1 * n2 + k2];
                mat[j1 * n2 + k2] = ring.mul(tw, row_dst.get(k2));
            }
        }

        // recombine across j1 for every spectral column k2
        let mut col_src = Vector::new(ring, n1);
        let mut col_dst = Vector::new(ring, n1);
        for k2 in 0..n2 {
            for j1 in 0..n1 {
                col_src.set(j1, mat[j1 * n2 + k2]);
            }
            self.outer.fft(&mut col_dst, &col_src);
            for k1 in 0..n1 {
                output.set(k2 + n2 * k1, col_dst.get(k1));
            }
        }
    }

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        ifft_by_index_reversal(self, output, input, self.inv_n);
    }
}
