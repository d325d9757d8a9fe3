//! Prime-factor (Good-Thomas) decomposition.
//!
//! For n = n1 * n2 with gcd(n1, n2) = 1 the transform re-indexes through
//! the Chinese remainder map, so the two inner passes need no twiddle
//! multiplications between them. The inner transforms are planned from the
//! family and may recurse.

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

/// Split n into coprime `(p^a, n / p^a)` with both sides non-trivial.
pub(crate) fn coprime_split(n: usize) -> Option<(usize, usize)> {
    if n < 2 {
        return None;
    }
    let factors = arith::factor(n as u64);
    if factors.len() < 2 {
        return None;
    }
    let (p, mult) = factors[0];
    let n1 = (p as usize).pow(mult);
    Some((n1, n / n1))
}

pub struct GoodThomas<T: Word> {
    ring: Arc<Ring<T>>,
    n: usize,
    n1: usize,
    n2: usize,
    fft1: BoxedTransform<T>,
    fft2: BoxedTransform<T>,
    /// (i1, i2) -> input index of the CRT gather.
    in_map: Vec<usize>,
    /// (k1, k2) -> output index of the CRT scatter.
    out_map: Vec<usize>,
    inv_n: T,
}

impl<T: Word> core::fmt::Debug for GoodThomas<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GoodThomas")
            .field("ring", &self.ring)
            .field("n", &self.n)
            .field("n1", &self.n1)
            .field("n2", &self.n2)
            .finish_non_exhaustive()
    }
}

impl<T: Word> GoodThomas<T> {
    pub fn new(ring: &Arc<Ring<T>>, n: usize) -> Result<Self> {
        let w = ring.get_nth_root(n)?;
        Self::with_root(ring, n, w)
    }

    pub fn with_root(ring: &Arc<Ring<T>>, n: usize, w: T) -> Result<Self> {
        let (n1, n2) = coprime_split(n).ok_or(Error::UnsupportedSize)?;
        check_root_order(ring, w, n)?;

        let w1 = ring.exp(w, T::from_usize(n2));
        let w2 = ring.exp(w, T::from_usize(n1));
        let fft1 = plan(ring, n1, w1)?;
        let fft2 = plan(ring, n2, w2)?;

        let mut in_map = vec![0usize; n];
        for i1 in 0..n1 {
            for i2 in 0..n2 {
                in_map[i1 * n2 + i2] = (n2 * i1 + n1 * i2) % n;
            }
        }

        // k = k1 * e1 + k2 * e2 (mod n) is k1 mod n1 and k2 mod n2
        let e1 = n2 as u128
            * arith::inv_mod((n2 % n1) as u64, n1 as u64)
                .ok_or(Error::InvalidArgument("factors are not coprime"))? as u128;
        let e2 = n1 as u128
            * arith::inv_mod((n1 % n2) as u64, n2 as u64)
                .ok_or(Error::InvalidArgument("factors are not coprime"))? as u128;
        let mut out_map = vec![0usize; n];
        for k1 in 0..n1 {
            for k2 in 0..n2 {
                out_map[k1 * n2 + k2] = ((k1 as u128 * e1 + k2 as u128 * e2) % n as u128) as usize;
            }
        }

        Ok(Self {
            ring: Arc::clone(ring),
            n,
            n1,
            n2,
            fft1,
            fft2,
            in_map,
            out_map,
            inv_n: ring.inv(ring.from_int(n))?,
        })
    }
}

impl<T: Word> FourierTransform<T> for GoodThomas<T> {
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
        let mut mat = vec![T::zero(); self.n];
        for (slot, &src) in mat.iter_mut().zip(&self.in_map) {
            if src < input.len() {
                *slot = input.get(src);
            }
        }

        // n1-point passes along the strided axis
        let mut col_src = Vector::new(&self.ring, n1);
        let mut col_dst = Vector::new(&self.ring, n1);
        for i2 in 0..n2 {
            for i1 in 0..n1 {
                col_src.set(i1, mat[i1 * n2 + i2]);
            }
            self.fft1.fft(&mut col_dst, &col_src);
            for k1 in 0..n1 {
                mat[k1 * n2 + i2] = col_dst.get(k1);
            }
        }

        // n2-point passes along contiguous rows
        let mut row_src = Vector::new(&self.ring, n2);
        let mut row_dst = Vector::new(&self.ring, n2);
        for k1 in 0..n1 {
            row_src.as_mut_slice().copy_from_slice(&mat[k1 * n2..(k1 + 1) * n2]);
            self.fft2.fft(&mut row_dst, &row_src);
            mat[k1 * n2..(k1 + 1) * n2].copy_from_slice(row_dst.as_slice());
        }

        for (val, &dst) in mat.iter().zip(&self.out_map) {
            output.set(dst, *val);
        }
    }

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        ifft_by_index_reversal(self, output, input, self.inv_n);
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::fft::{
            test_support::{check_fft_1vs1, check_fft_codec},
            Naive,
        },
    };

    #[test]
    fn splits_off_the_smallest_prime_power() {
        assert_eq!(coprime_split(51), Some((3, 17)));
        assert_eq!(coprime_split(96), Some((32, 3)));
        assert_eq!(coprime_split(17), None);
        assert_eq!(coprime_split(32), None);
        assert_eq!(coprime_split(1), None);
    }

    #[test]
    fn codec_round_trip_gf2_16() {
        let gf = Arc::new(Ring::<u32>::binary_extension(16).unwrap());
        let n = gf.get_code_len(32).unwrap();
        let fft = GoodThomas::new(&gf, n).unwrap();
        assert_eq!(fft.n(), 51);
        check_fft_codec(&gf, &fft, 32);
    }

    #[test]
    fn agrees_with_naive_gfp() {
        // 7681 - 1 = 2^9 * 3 * 5, so 96 = 32 * 3 is a valid coprime size.
        let gf = Arc::new(Ring::<u32>::prime(7681).unwrap());
        let n = 96;
        let r = gf.get_nth_root(n).unwrap();
        let fft_naive = Naive::new(&gf, n, r).unwrap();
        let fft_gt = GoodThomas::new(&gf, n).unwrap();
        check_fft_1vs1(&gf, &fft_naive, &fft_gt, n);
    }

    #[test]
    fn rejects_prime_power_sizes() {
        let gf = Arc::new(Ring::<u32>::prime(65537).unwrap());
        assert_eq!(GoodThomas::new(&gf, 32).unwrap_err(), Error::UnsupportedSize);
    }
}
