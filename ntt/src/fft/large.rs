//! Transforms over moduli wider than a residue ring can handle directly.
//!
//! The modulus is factored into distinct word-sized primes; the transform
//! runs independently in each prime field with the shared root reduced
//! into it, and the outputs are recombined by the Chinese remainder
//! theorem. This is the transform behind the Schönhage-Strassen style
//! integer multiplication demo.

use {
    crate::{
        arith,
        error::{Error, Result},
        fft::{FourierTransform, Radix2},
        ring::Ring,
        vector::Vector,
        word::Word,
    },
    std::sync::Arc,
};

struct Part<T: Word> {
    ring: Arc<Ring<T>>,
    fft: Radix2<T>,
    p: T,
    /// CRT recombination coefficient modulo the composite modulus.
    coeff: T,
}

pub struct Large<T: Word> {
    ring: Arc<Ring<T>>,
    n: usize,
    parts: Vec<Part<T>>,
}

impl<T: Word> core::fmt::Debug for Large<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Large")
            .field("ring", &self.ring)
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

impl<T: Word> Large<T> {
    /// Transform of size `2^l` over Z/mZ with the explicit root `w` of
    /// order `2^l`. `m` must be squarefree so its prime fields are
    /// pairwise coprime.
    pub fn new(ring: &Arc<Ring<T>>, l: u32, w: T) -> Result<Self> {
        let m = ring.modulus().ok_or(Error::InvalidArgument(
            "large transforms require a modular ring",
        ))?;
        if l == 0 {
            return Err(Error::InvalidArgument("transform size must be at least 2"));
        }
        let n = 1usize << l;

        let factors = arith::factor(m);
        if factors.iter().any(|&(_, mult)| mult > 1) {
            return Err(Error::UnsupportedSize);
        }

        let mut parts = Vec::with_capacity(factors.len());
        for (p, _) in factors {
            let part_ring = Arc::new(Ring::prime(p)?);
            // the shared root reduced into this prime field keeps every
            // residue transform consistent with the composite one
            let fft = Radix2::with_root(&part_ring, n, n, w % p)?;
            let partial = m / p;
            let inverse = arith::inv_mod(partial % p, p).ok_or(Error::NotInvertible)?;
            parts.push(Part {
                ring: part_ring,
                fft,
                p,
                coeff: arith::mul_mod(partial, inverse, m),
            });
        }

        Ok(Self {
            ring: Arc::clone(ring),
            n,
            parts,
        })
    }

    fn transform(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>, inverse: bool) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        assert!(input.len() <= self.n, "input length exceeds the transform size");

        output.zero_fill();
        for part in &self.parts {
            let mut residues = Vector::new(&part.ring, input.len());
            for i in 0..input.len() {
                residues.set(i, input.get(i) % part.p);
            }
            let mut transformed = Vector::new(&part.ring, self.n);
            if inverse {
                part.fft.ifft(&mut transformed, &residues);
            } else {
                part.fft.fft(&mut transformed, &residues);
            }
            // x = sum_i coeff_i * x_i reconstructs the unique value mod m
            for k in 0..self.n {
                let term = self.ring.mul(part.coeff, transformed.get(k));
                output.set(k, self.ring.add(output.get(k), term));
            }
        }
    }
}

impl<T: Word> FourierTransform<T> for Large<T> {
    fn n(&self) -> usize {
        self.n
    }

    fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    fn fft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        self.transform(output, input, false);
    }

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(input.len(), self.n, "inverse transform input must be full length");
        self.transform(output, input, true);
    }
}
