use ntt::{arith, Error, Result, Word};

/// Cipher parameters: polynomial degree `n`, prime modulus `q` and the
/// half-width `k` of the centred binomial noise (variance k/2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RlweParams<T> {
    pub n: usize,
    pub q: T,
    pub k: u32,
}

impl<T: Word> RlweParams<T> {
    /// The prototype parameter set.
    pub fn n256_q7681() -> Self {
        Self {
            n: 256,
            q: T::from_usize(7681),
            k: 16,
        }
    }

    pub fn n512_q12289() -> Self {
        Self {
            n: 512,
            q: T::from_usize(12289),
            k: 16,
        }
    }

    pub fn n1024_q12289() -> Self {
        Self {
            n: 1024,
            q: T::from_usize(12289),
            k: 16,
        }
    }

    /// A valid set has a power-of-two degree, a prime modulus with
    /// 2n | q - 1 (so the field carries the transform), and noise bits
    /// that fit one machine word.
    pub fn validate(&self) -> Result<()> {
        if !self.n.is_power_of_two() || self.n < 2 {
            return Err(Error::InvalidArgument("degree must be a power of two"));
        }
        if !arith::is_prime(self.q) {
            return Err(Error::InvalidArgument("modulus must be prime"));
        }
        let two_n = T::from_usize(2 * self.n);
        if (self.q - T::one()) % two_n != T::zero() {
            return Err(Error::UnsupportedSize);
        }
        if self.k == 0 || self.k > 32 {
            return Err(Error::InvalidArgument("noise half-width must be in 1..=32"));
        }
        Ok(())
    }
}
