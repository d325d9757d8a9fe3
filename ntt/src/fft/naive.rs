//! Quadratic-time reference transform.
//!
//! `dst[k] = sum_j src[j] * w^(jk)` evaluated directly. Valid over any ring
//! with a root of unity of exact order n, and the yardstick the fast
//! variants are tested against.

use {
    crate::{
        buffers::Buffers,
        error::Result,
        fft::{check_root_order, FourierTransform},
        ring::Ring,
        vector::Vector,
        word::Word,
    },
    std::sync::Arc,
};

pub struct Naive<T: Word> {
    ring: Arc<Ring<T>>,
    n: usize,
    w: T,
    w_inv: T,
    inv_n: T,
}

impl<T: Word> Naive<T> {
    /// `w` must have multiplicative order exactly `n`.
    pub fn new(ring: &Arc<Ring<T>>, n: usize, w: T) -> Result<Self> {
        check_root_order(ring, w, n)?;
        Ok(Self {
            ring: Arc::clone(ring),
            n,
            w,
            w_inv: ring.inv(w)?,
            inv_n: ring.inv(ring.from_int(n))?,
        })
    }

    fn transform(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>, w: T, scale: Option<T>) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        assert!(input.len() <= self.n, "input length exceeds the transform size");

        let ring = &self.ring;
        // w_k = w^k, stepped once per output index
        let mut w_k = T::one();
        for k in 0..self.n {
            let mut acc = T::zero();
            let mut coef = T::one();
            for j in 0..input.len() {
                acc = ring.add(acc, ring.mul(input.get(j), coef));
                coef = ring.mul(coef, w_k);
            }
            if let Some(s) = scale {
                acc = ring.mul(acc, s);
            }
            output.set(k, acc);
            w_k = ring.mul(w_k, w);
        }
    }

    fn transform_buffers(
        &self,
        output: &mut Buffers<'_, T>,
        input: &Buffers<'_, T>,
        w: T,
        scale: Option<T>,
    ) {
        assert_eq!(output.rows(), self.n, "output row count must be the transform size");
        assert_eq!(output.lanes(), input.lanes(), "lane counts must match");
        assert!(input.rows() <= self.n, "input row count exceeds the transform size");

        let ring = Arc::clone(&self.ring);
        let lanes = output.lanes();
        let mut acc = vec![T::zero(); lanes];
        let mut w_k = T::one();
        for k in 0..self.n {
            acc.fill(T::zero());
            let mut coef = T::one();
            for j in 0..input.rows() {
                let row = input.row(j);
                for u in 0..lanes {
                    acc[u] = ring.add(acc[u], ring.mul(row[u], coef));
                }
                coef = ring.mul(coef, w_k);
            }
            if let Some(s) = scale {
                for a in acc.iter_mut() {
                    *a = ring.mul(*a, s);
                }
            }
            output.row_mut(k).copy_from_slice(&acc);
            w_k = ring.mul(w_k, w);
        }
    }
}

impl<T: Word> FourierTransform<T> for Naive<T> {
    fn n(&self) -> usize {
        self.n
    }

    fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    fn fft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        self.transform(output, input, self.w, None);
    }

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(input.len(), self.n, "inverse transform input must be full length");
        self.transform(output, input, self.w_inv, Some(self.inv_n));
    }

    fn fft_buffers(&self, output: &mut Buffers<'_, T>, input: &Buffers<'_, T>) {
        self.transform_buffers(output, input, self.w, None);
    }

    fn ifft_buffers(&self, output: &mut Buffers<'_, T>, input: &Buffers<'_, T>) {
        assert_eq!(input.rows(), self.n, "inverse transform input must be full length");
        self.transform_buffers(output, input, self.w_inv, Some(self.inv_n));
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            arith,
            fft::test_support::{check_fft_codec, random_vec},
        },
        rand_chacha::{rand_core::SeedableRng, ChaCha8Rng},
    };

    fn known_length_8_transform<T: Word>() {
        let gf = Arc::new(Ring::<T>::prime(T::from_usize(65537)).unwrap());
        let r = gf.get_nth_root(8).unwrap();
        let fft = Naive::new(&gf, 8, r).unwrap();

        let mut v = Vector::new(&gf, 8);
        v.set(0, T::from_usize(27746));
        v.set(1, T::from_usize(871));
        v.set(2, T::from_usize(49520));

        let mut transformed = Vector::new(&gf, 8);
        fft.fft(&mut transformed, &v);
        let expected = [12600, 27885, 17398, 4624, 10858, 36186, 4591, 42289];
        for (i, &e) in expected.iter().enumerate() {
            assert_eq!(transformed.get(i), T::from_usize(e));
        }

        let mut recovered = Vector::new(&gf, 8);
        fft.ifft(&mut recovered, &transformed);
        assert_eq!(recovered, v);
    }

    #[test]
    fn length_8_known_vector_u32() {
        known_length_8_transform::<u32>();
    }

    #[test]
    fn length_8_known_vector_u64() {
        known_length_8_transform::<u64>();
    }

    #[test]
    fn codec_round_trip_gfp() {
        let gf = Arc::new(Ring::<u32>::prime(65537).unwrap());
        let code_len = 32;

        let root = gf.get_primitive_root().unwrap();
        assert_eq!(arith::jacobi(root, 65537), -1);

        // Round the requested length to a size the field supports.
        let n = gf.get_code_len(code_len).unwrap();
        let r = gf.get_nth_root(n).unwrap();
        let fft = Naive::new(&gf, n, r).unwrap();
        check_fft_codec(&gf, &fft, code_len);
    }

    #[test]
    fn codec_round_trip_gf2n() {
        for deg in [4u32, 8, 16, 32, 64] {
            let gf = Arc::new(Ring::<u64>::binary_extension(deg).unwrap());
            let root = gf.get_primitive_root().unwrap();
            assert_eq!(gf.exp(root, gf.card_minus_one()), 1);

            let mut rng = ChaCha8Rng::seed_from_u64(deg as u64);
            let len = if gf.card_minus_one() <= 32 {
                deg as usize
            } else {
                32
            };
            let n = gf.get_code_len(len).unwrap();
            let r = gf.get_nth_root(n).unwrap();
            assert_eq!(gf.exp(r, n as u64), 1);

            let fft = Naive::new(&gf, n, r).unwrap();
            let mut transformed = Vector::new(&gf, n);
            let mut recovered = Vector::new(&gf, n);
            for _ in 0..100 {
                let v = random_vec(&gf, n, len, &mut rng);
                fft.fft(&mut transformed, &v);
                fft.ifft(&mut recovered, &transformed);
                assert_eq!(v, recovered);
            }
        }
    }

    #[test]
    fn rejects_wrong_order_roots() {
        let gf = Arc::new(Ring::<u32>::prime(65537).unwrap());
        let r = gf.get_nth_root(16).unwrap();
        assert!(Naive::new(&gf, 8, r).is_err());
    }
}
