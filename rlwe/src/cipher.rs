//! R-LWE public-key encryption.
//!
//! Ring-LWE in Polynomial Rings
//! Leo Ducas and Alain Durmus
//!
//! Efficient Software Implementation of Ring-LWE Encryption
//! Ruan de Clercq, Sujoy Sinha Roy, Frederik Vercauteren, and Ingrid
//! Verbauwhede
//!
//! Keys and ciphertexts live in the NTT domain; each operation samples its
//! noise, forward-transforms once and works coefficient-wise from there.

use {
    crate::params::RlweParams,
    ntt::{
        fft::{FourierTransform, Radix2},
        Result, Ring, Vector, Word,
    },
    rand::{Rng, SeedableRng},
    rand_chacha::ChaCha20Rng,
    std::sync::Arc,
    tracing::instrument,
};

/// The cipher owns its field descriptor, its transform and its RNG. The
/// RNG is a per-instance type parameter; nothing here pins it to a vetted
/// CSPRNG, so substitute one where that matters.
pub struct CipherRlwe<T: Word, R: Rng = ChaCha20Rng> {
    params: RlweParams<T>,
    qby2: T,
    qby4: T,
    qby4times3: T,
    ring: Arc<Ring<T>>,
    fft: Radix2<T>,
    rng: R,
}

impl<T: Word> CipherRlwe<T, ChaCha20Rng> {
    pub fn new(params: RlweParams<T>) -> Result<Self> {
        Self::with_rng(params, ChaCha20Rng::from_entropy())
    }

    /// Deterministic instance for reproducible runs.
    pub fn from_seed(params: RlweParams<T>, seed: u64) -> Result<Self> {
        Self::with_rng(params, ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<T: Word, R: Rng> CipherRlwe<T, R> {
    pub fn with_rng(params: RlweParams<T>, rng: R) -> Result<Self> {
        params.validate()?;
        let ring = Arc::new(Ring::prime(params.q)?);
        let fft = Radix2::new(&ring, params.n, params.n)?;
        let four = T::from_usize(4);
        let qby4 = params.q / four;
        Ok(Self {
            qby2: params.q / T::from_usize(2),
            qby4,
            qby4times3: qby4 * T::from_usize(3),
            ring,
            fft,
            rng,
            params,
        })
    }

    pub fn params(&self) -> RlweParams<T> {
        self.params
    }

    pub fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    /// A zero vector of the cipher's degree, bound to its field.
    pub fn vector(&self) -> Vector<'static, T> {
        Vector::new(&self.ring, self.params.n)
    }

    /// Polynomial with coefficients uniform over [0, q).
    fn rand_uniform(&mut self, poly: &mut Vector<'_, T>) {
        for i in 0..self.params.n {
            let e = self.ring.rand(&mut self.rng);
            poly.set(i, e);
        }
    }

    /// Polynomial with uniform bit coefficients.
    pub fn rand_bit_uniform(&mut self, poly: &mut Vector<'_, T>) {
        let two = T::from_usize(2);
        for i in 0..self.params.n {
            let e = self.ring.rand(&mut self.rng);
            poly.set(i, e % two);
        }
    }

    /// Error polynomial: Binomial(2k, 1/2) - k per coefficient, reduced
    /// canonically into [0, q). Approximates a discrete Gaussian with
    /// mean 0 and variance k/2.
    fn rand_binomial(&mut self, poly: &mut Vector<'_, T>) {
        let k = self.params.k;
        let mask = if k == 32 {
            u64::MAX
        } else {
            (1u64 << (2 * k)) - 1
        };
        let q = self.params.q.to_usize() as i64;
        for i in 0..self.params.n {
            let bits = self.rng.gen::<u64>() & mask;
            let r = bits.count_ones() as i64 - k as i64;
            poly.set(i, T::from_usize(r.rem_euclid(q) as usize));
        }
    }

    /// Generate a key pair.
    ///
    /// a <- uniform, r1, r2 <- error distribution, and in the NTT domain
    /// `_p = _r1 - _a * _r2`. The private key is `_r2`, the public key
    /// `(_a, _p)`.
    #[instrument(skip_all)]
    pub fn key_gen(
        &mut self,
        sk: &mut Vector<'_, T>,
        pk_a: &mut Vector<'_, T>,
        pk_p: &mut Vector<'_, T>,
    ) {
        let n = self.params.n;
        let mut a = self.vector();
        let mut r1 = self.vector();
        let mut r1_hat = self.vector();
        let mut r2 = self.vector();

        self.rand_uniform(&mut a);
        self.fft.fft(pk_a, &a);
        self.rand_binomial(&mut r1);
        self.fft.fft(&mut r1_hat, &r1);
        self.rand_binomial(&mut r2);
        self.fft.fft(sk, &r2);

        for i in 0..n {
            let t = self.ring.mul(pk_a.get(i), sk.get(i));
            pk_p.set(i, self.ring.sub(r1_hat.get(i), t));
        }
    }

    /// Encrypt a bit polynomial under a public key.
    ///
    /// e1, e2, e3 <- error distribution, the message is encoded as
    /// `e3 + (q/2) * m`, and
    /// `_c1 = _e2 + _a * _e1`, `_c2 = NTT(e3 + (q/2) m) + _p * _e1`.
    #[instrument(skip_all)]
    pub fn encrypt(
        &mut self,
        c1: &mut Vector<'_, T>,
        c2: &mut Vector<'_, T>,
        msg: &Vector<'_, T>,
        pk_a: &Vector<'_, T>,
        pk_p: &Vector<'_, T>,
    ) {
        let n = self.params.n;
        assert_eq!(msg.len(), n, "message length must be the cipher degree");

        let mut e1 = self.vector();
        let mut e1_hat = self.vector();
        let mut e2 = self.vector();
        let mut e2_hat = self.vector();
        let mut e3 = self.vector();

        self.rand_binomial(&mut e1);
        self.fft.fft(&mut e1_hat, &e1);
        self.rand_binomial(&mut e2);
        self.fft.fft(&mut e2_hat, &e2);
        self.rand_binomial(&mut e3);

        // encode the message into the noise before transforming
        let mut encoded = self.vector();
        let mut encoded_hat = self.vector();
        for i in 0..n {
            let half = if msg.get(i) != T::zero() {
                self.qby2
            } else {
                T::zero()
            };
            encoded.set(i, self.ring.add(e3.get(i), half));
        }
        self.fft.fft(&mut encoded_hat, &encoded);

        for i in 0..n {
            c1.set(
                i,
                self.ring
                    .add(e2_hat.get(i), self.ring.mul(pk_a.get(i), e1_hat.get(i))),
            );
            c2.set(
                i,
                self.ring
                    .add(encoded_hat.get(i), self.ring.mul(pk_p.get(i), e1_hat.get(i))),
            );
        }
    }

    /// Decrypt a ciphertext with the private key: threshold the inverse
    /// transform of `_c2 + _c1 * _r2` around q/2.
    #[instrument(skip_all)]
    pub fn decrypt(
        &self,
        msg: &mut Vector<'_, T>,
        c1: &Vector<'_, T>,
        c2: &Vector<'_, T>,
        sk: &Vector<'_, T>,
    ) {
        let n = self.params.n;
        let mut d_hat = self.vector();
        let mut d = self.vector();

        for i in 0..n {
            let t = self.ring.mul(c1.get(i), sk.get(i));
            d_hat.set(i, self.ring.add(c2.get(i), t));
        }
        self.fft.ifft(&mut d, &d_hat);

        for i in 0..n {
            let e = d.get(i);
            let bit = e > self.qby4 && e < self.qby4times3;
            msg.set(i, if bit { T::one() } else { T::zero() });
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    fn round_trip<T: Word>(params: RlweParams<T>, seed: u64) {
        let mut cipher = CipherRlwe::from_seed(params, seed).unwrap();

        let mut sk = cipher.vector();
        let mut pk_a = cipher.vector();
        let mut pk_p = cipher.vector();
        cipher.key_gen(&mut sk, &mut pk_a, &mut pk_p);

        let mut msg = cipher.vector();
        cipher.rand_bit_uniform(&mut msg);

        let mut c1 = cipher.vector();
        let mut c2 = cipher.vector();
        cipher.encrypt(&mut c1, &mut c2, &msg, &pk_a, &pk_p);
        assert_ne!(c1, msg);

        let mut recovered = cipher.vector();
        cipher.decrypt(&mut recovered, &c1, &c2, &sk);
        assert_eq!(recovered, msg);
    }

    #[test]
    fn prototype_parameters_round_trip() {
        for seed in 0..10 {
            round_trip(RlweParams::<u32>::n256_q7681(), seed);
        }
    }

    #[test]
    fn round_trips_on_u16_and_u64_words() {
        round_trip(RlweParams::<u16>::n256_q7681(), 1);
        round_trip(RlweParams::<u64>::n256_q7681(), 2);
    }

    #[test_case(RlweParams::n512_q12289(), 3; "n512")]
    #[test_case(RlweParams::n1024_q12289(), 4; "n1024")]
    fn alternate_parameters_round_trip(params: RlweParams<u32>, seed: u64) {
        round_trip(params, seed);
    }

    #[test]
    fn binomial_noise_stays_centred() {
        let mut cipher = CipherRlwe::from_seed(RlweParams::<u32>::n256_q7681(), 7).unwrap();
        let q = 7681u32;
        let k = 16u32;
        let mut noise = cipher.vector();
        cipher.rand_binomial(&mut noise);
        for i in 0..noise.len() {
            let e = noise.get(i);
            assert!(e <= k || e >= q - k, "coefficient {e} outside [-k, k]");
        }
    }

    #[test]
    fn wrong_key_garbles_the_message() {
        let params = RlweParams::<u32>::n256_q7681();
        let mut cipher = CipherRlwe::from_seed(params, 11).unwrap();

        let mut sk = cipher.vector();
        let mut pk_a = cipher.vector();
        let mut pk_p = cipher.vector();
        cipher.key_gen(&mut sk, &mut pk_a, &mut pk_p);

        let mut wrong_sk = cipher.vector();
        let mut wrong_a = cipher.vector();
        let mut wrong_p = cipher.vector();
        cipher.key_gen(&mut wrong_sk, &mut wrong_a, &mut wrong_p);

        let mut msg = cipher.vector();
        cipher.rand_bit_uniform(&mut msg);
        let mut c1 = cipher.vector();
        let mut c2 = cipher.vector();
        cipher.encrypt(&mut c1, &mut c2, &msg, &pk_a, &pk_p);

        let mut recovered = cipher.vector();
        cipher.decrypt(&mut recovered, &c1, &c2, &wrong_sk);
        assert_ne!(recovered, msg);
    }

    #[test]
    fn construction_rejects_invalid_parameters() {
        let bad = RlweParams::<u32> { n: 100, q: 7681, k: 16 };
        assert!(CipherRlwe::from_seed(bad, 0).is_err());
    }
}
