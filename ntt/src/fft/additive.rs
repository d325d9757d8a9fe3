//! Additive (Gao-Mateer) transform over binary extension fields.
//!
//! Characteristic two has no multiplicative roots of power-of-two order,
//! so this variant evaluates the polynomial on an additive subspace
//! instead: the span of 1, a, ..., a^(m-1) for the field generator a. Each
//! level twists by the last basis element, Taylor-expands at x^2 - x,
//! recurses on the two halves and recombines through a table of subset
//! sums. The inverse undoes the exact same steps in reverse, so the round
//! trip is bit-exact.

use {
    crate::{
        error::{Error, Result},
        fft::FourierTransform,
        ring::Ring,
        vector::Vector,
        word::Word,
    },
    std::sync::Arc,
};

struct Level<T> {
    beta_m: T,
    beta_m_inv: T,
    /// Subset sums of the twisted basis; `g[k]` is the k-th evaluation
    /// point of the half-size subspace.
    g: Vec<T>,
}

pub struct Additive<T: Word> {
    ring: Arc<Ring<T>>,
    n: usize,
    levels: Vec<Level<T>>,
}

impl<T: Word> core::fmt::Debug for Additive<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Additive")
            .field("ring", &self.ring)
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

impl<T: Word> Additive<T> {
    /// Transform of size `n = 2^m`; `m` may not exceed the extension
    /// degree.
    pub fn new(ring: &Arc<Ring<T>>, m: u32) -> Result<Self> {
        let deg = ring.extension_degree().ok_or(Error::InvalidArgument(
            "additive transforms require a binary extension field",
        ))?;
        if m == 0 {
            return Err(Error::InvalidArgument("transform size must be at least 2"));
        }
        if m > deg || m as usize >= usize::BITS as usize {
            return Err(Error::UnsupportedSize);
        }

        // Basis 1, a, a^2, ...: independent because the reduction
        // polynomial has degree `deg`.
        let a = T::from_usize(2);
        let mut basis: Vec<T> = (0..m).map(|i| ring.exp(a, T::from_usize(i as usize))).collect();

        let mut levels = Vec::with_capacity(m as usize);
        for level in 0..m {
            let dim = (m - level) as usize;
            let beta_m = basis[dim - 1];
            let beta_m_inv = ring.inv(beta_m)?;

            let gammas: Vec<T> = basis[..dim - 1]
                .iter()
                .map(|&b| ring.mul(b, beta_m_inv))
                .collect();

            let mut g = vec![T::zero(); 1 << (dim - 1)];
            for k in 1..g.len() {
                let bit = k.trailing_zeros() as usize;
                g[k] = ring.add(g[k & (k - 1)], gammas[bit]);
            }
            levels.push(Level {
                beta_m,
                beta_m_inv,
                g,
            });

            // next basis: gamma^2 - gamma
            basis = gammas
                .iter()
                .map(|&c| ring.add(ring.mul(c, c), c))
                .collect();
        }

        Ok(Self {
            ring: Arc::clone(ring),
            n: 1 << m,
            levels,
        })
    }

    /// Coefficients of `f = sum_i g_i(x) * (x^t - x)^i` with each `g_i` of
    /// degree < t, concatenated block by block into `dst`. `dst` holds
    /// ceil(n/t) blocks of t coefficients.
    pub fn taylor_expand(&self, dst: &mut Vector<'_, T>, src: &Vector<'_, T>, n: usize, t: usize) {
        assert!(t >= 2, "block size must be at least 2");
        assert!(n >= t, "degree bound must reach the block size");
        assert!(src.len() >= n, "source is shorter than the degree bound");
        let blocks = n.div_ceil(t);
        assert_eq!(dst.len(), blocks * t, "destination must hold whole blocks");

        let slice = dst.as_mut_slice();
        slice[..n].copy_from_slice(&src.as_slice()[..n]);
        slice[n..].fill(T::zero());
        taylor_rec(&self.ring, slice, n, t);
    }

    /// Exact inverse of [`Self::taylor_expand`]; `dst` receives the n
    /// polynomial coefficients.
    pub fn inv_taylor_expand(&self, dst: &mut Vector<'_, T>, src: &Vector<'_, T>, t: usize) {
        assert!(t >= 2, "block size must be at least 2");
        let n = dst.len();
        assert!(src.len() >= n, "expansion is shorter than the output");

        let mut scratch = src.as_slice().to_vec();
        inv_taylor_rec(&self.ring, &mut scratch, n, t);
        dst.as_mut_slice().copy_from_slice(&scratch[..n]);
    }

    /// The t = 2 specialisation driving the transform's hot path.
    pub fn taylor_expand_t2(&self, dst: &mut Vector<'_, T>, src: &Vector<'_, T>) {
        let n = src.len();
        assert!(n.is_power_of_two() && n >= 2, "size must be a power of two");
        assert_eq!(dst.len(), n, "destination length must match");
        dst.as_mut_slice().copy_from_slice(src.as_slice());
        taylor_t2(&self.ring, dst.as_mut_slice());
    }

    pub fn inv_taylor_expand_t2(&self, dst: &mut Vector<'_, T>, src: &Vector<'_, T>) {
        let n = src.len();
        assert!(n.is_power_of_two() && n >= 2, "size must be a power of two");
        assert_eq!(dst.len(), n, "destination length must match");
        dst.as_mut_slice().copy_from_slice(src.as_slice());
        inv_taylor_t2(&self.ring, dst.as_mut_slice());
    }

    fn fft_rec(&self, buf: &mut [T], level: usize) {
        let n = buf.len();
        if n == 1 {
            return;
        }
        let ring = &self.ring;
        let lv = &self.levels[level];
        if n == 2 {
            // f0 + f1*x at the points 0 and beta
            let t = ring.mul(buf[1], lv.beta_m);
            buf[1] = ring.add(buf[0], t);
            return;
        }

        let half = n / 2;

        // twist: g(x) = f(beta * x)
        let mut pow = lv.beta_m;
        for e in buf.iter_mut().skip(1) {
            *e = ring.mul(*e, pow);
            pow = ring.mul(pow, lv.beta_m);
        }

        // expand at x^2 - x and split into g0 (even) and g1 (odd) parts
        taylor_t2(ring, buf);
        let mut scratch = vec![T::zero(); n];
        for i in 0..half {
            scratch[i] = buf[2 * i];
            scratch[half + i] = buf[2 * i + 1];
        }
        buf.copy_from_slice(&scratch);

        let (g0, g1) = buf.split_at_mut(half);
        self.fft_rec(g0, level + 1);
        self.fft_rec(g1, level + 1);

        // w[k] = u[k] + G[k]*v[k]; w[k + half] = w[k] + v[k]
        for k in 0..half {
            let t = ring.mul(lv.g[k], g1[k]);
            g0[k] = ring.add(g0[k], t);
            g1[k] = ring.add(g0[k], g1[k]);
        }
    }

    fn ifft_rec(&self, buf: &mut [T], level: usize) {
        let n = buf.len();
        if n == 1 {
            return;
        }
        let ring = &self.ring;
        let lv = &self.levels[level];
        if n == 2 {
            let t = ring.add(buf[0], buf[1]);
            buf[1] = ring.mul(t, lv.beta_m_inv);
            return;
        }

        let half = n / 2;

        {
            let (g0, g1) = buf.split_at_mut(half);
            // v[k] = w[k + half] + w[k]; u[k] = w[k] + G[k]*v[k]
            for k in 0..half {
                g1[k] = ring.add(g1[k], g0[k]);
                let t = ring.mul(lv.g[k], g1[k]);
                g0[k] = ring.add(g0[k], t);
            }
            self.ifft_rec(g0, level + 1);
            self.ifft_rec(g1, level + 1);
        }

        // interleave the halves back and undo the expansion and the twist
        let mut scratch = vec![T::zero(); n];
        for i in 0..half {
            scratch[2 * i] = buf[i];
            scratch[2 * i + 1] = buf[half + i];
        }
        buf.copy_from_slice(&scratch);
        inv_taylor_t2(ring, buf);

        let mut pow = lv.beta_m_inv;
        for e in buf.iter_mut().skip(1) {
            *e = ring.mul(*e, pow);
            pow = ring.mul(pow, lv.beta_m_inv);
        }
    }
}

/// In-place Taylor expansion at x^t - x. `buf` holds the zero-padded
/// coefficients, `n` the logical degree bound.
fn taylor_rec<T: Word>(ring: &Ring<T>, buf: &mut [T], n: usize, t: usize) {
    if n <= t {
        return;
    }
    // smallest power of two s with n <= 2ts; then ts < n
    let mut s = 1usize;
    while 2 * t * s < n {
        s *= 2;
    }
    let ts = t * s;
    let mid = 2 * ts - s;

    // fold the top block into the middle one
    if n > mid {
        for i in 0..n - mid {
            buf[ts + i] = ring.add(buf[ts + i], buf[mid + i]);
        }
    }
    // shift the middle block down by s
    let fold = ((t - 1) * s).min(buf.len() - ts);
    for i in 0..fold {
        buf[s + i] = ring.add(buf[s + i], buf[ts + i]);
    }

    let (left, right) = buf.split_at_mut(ts);
    taylor_rec(ring, left, ts, t);
    taylor_rec(ring, right, n - ts, t);
}

fn inv_taylor_rec<T: Word>(ring: &Ring<T>, buf: &mut [T], n: usize, t: usize) {
    if n <= t {
        return;
    }
    let mut s = 1usize;
    while 2 * t * s < n {
        s *= 2;
    }
    let ts = t * s;
    let mid = 2 * ts - s;

    {
        let (left, right) = buf.split_at_mut(ts);
        inv_taylor_rec(ring, right, n - ts, t);
        inv_taylor_rec(ring, left, ts, t);
    }

    let fold = ((t - 1) * s).min(buf.len() - ts);
    for i in 0..fold {
        buf[s + i] = ring.sub(buf[s + i], buf[ts + i]);
    }
    if n > mid {
        for i in 0..n - mid {
            buf[ts + i] = ring.sub(buf[ts + i], buf[mid + i]);
        }
    }
}

/// The t = 2 expansion for power-of-two sizes: with n = 4s the three
/// steps collapse to two fixed-offset folds.
fn taylor_t2<T: Word>(ring: &Ring<T>, buf: &mut [T]) {
    let n = buf.len();
    if n <= 2 {
        return;
    }
    let s = n / 4;
    for i in 0..s {
        buf[2 * s + i] = ring.add(buf[2 * s + i], buf[3 * s + i]);
    }
    for i in 0..s {
        buf[s + i] = ring.add(buf[s + i], buf[2 * s + i]);
    }
    let (left, right) = buf.split_at_mut(2 * s);
    taylor_t2(ring, left);
    taylor_t2(ring, right);
}

fn inv_taylor_t2<T: Word>(ring: &Ring<T>, buf: &mut [T]) {
    let n = buf.len();
    if n <= 2 {
        return;
    }
    let s = n / 4;
    {
        let (left, right) = buf.split_at_mut(2 * s);
        inv_taylor_t2(ring, right);
        inv_taylor_t2(ring, left);
    }
    for i in 0..s {
        buf[s + i] = ring.sub(buf[s + i], buf[2 * s + i]);
    }
    for i in 0..s {
        buf[2 * s + i] = ring.sub(buf[2 * s + i], buf[3 * s + i]);
    }
}

impl<T: Word> FourierTransform<T> for Additive<T> {
    fn n(&self) -> usize {
        self.n
    }

    fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    fn fft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        output.copy_with_pad(input);
        self.fft_rec(output.as_mut_slice(), 0);
    }

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        assert_eq!(input.len(), self.n, "inverse transform input must be full length");
        output.copy_with_pad(input);
        self.ifft_rec(output.as_mut_slice(), 0);
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
        proptest::prelude::*,
        rand_chacha::{rand_core::SeedableRng, ChaCha8Rng},
    };

    fn gf2_16() -> Arc<Ring<u32>> {
        Arc::new(Ring::binary_extension(16).unwrap())
    }

    #[test]
    fn evaluates_on_the_whole_subspace() {
        // With the basis 1, a, a^2, ... the k-th output is f evaluated at
        // the subset sum picked out by the bits of k, which is the field
        // element k itself.
        let gf = gf2_16();
        let fft = Additive::new(&gf, 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let f = random_vec(&gf, 8, 8, &mut rng);

        let eval = |x: u32| {
            let mut acc = 0u32;
            for j in (0..8).rev() {
                acc = gf.add(gf.mul(acc, x), f.get(j));
            }
            acc
        };

        let mut out = Vector::new(&gf, 8);
        fft.fft(&mut out, &f);
        for k in 0..8u32 {
            assert_eq!(out.get(k as usize), eval(k), "point {k}");
        }
    }

    #[test]
    fn round_trip_n32_1000_inputs() {
        let gf = gf2_16();
        let fft = Additive::new(&gf, 5).unwrap();
        check_fft_codec(&gf, &fft, 32);
    }

    #[test]
    fn round_trip_across_degrees() {
        for deg in [4u32, 8, 16, 32, 64] {
            let gf = Arc::new(Ring::<u64>::binary_extension(deg).unwrap());
            let len = if gf.card_minus_one() <= 32 {
                deg as usize
            } else {
                32
            };
            let n = arith::ceil2(len as u64) as usize;
            let m = arith::log2(n as u64);
            let fft = Additive::new(&gf, m).unwrap();
            check_fft_codec(&gf, &fft, len);
        }
    }

    #[test]
    fn taylor_expansion_round_trip() {
        let gf = gf2_16();
        let fft = Additive::new(&gf, 5).unwrap();
        let n_max = fft.n();
        let mut rng = ChaCha8Rng::seed_from_u64(23);

        for _ in 0..1000 {
            let t = 2 + (gf.rand(&mut rng) as usize) % (n_max - 1);
            let n = t + (gf.rand(&mut rng) as usize) % (n_max - t + 1);

            let v1 = random_vec(&gf, n, n, &mut rng);
            let blocks = n.div_ceil(t);
            let mut expanded = Vector::new(&gf, blocks * t);
            fft.taylor_expand(&mut expanded, &v1, n, t);

            let mut recovered = Vector::new(&gf, n);
            fft.inv_taylor_expand(&mut recovered, &expanded, t);
            assert_eq!(recovered, v1);
        }
    }

    #[test]
    fn taylor_t2_round_trip() {
        let gf = gf2_16();
        let fft = Additive::new(&gf, 5).unwrap();
        let n = fft.n();
        let mut rng = ChaCha8Rng::seed_from_u64(29);

        for _ in 0..1000 {
            let v1 = random_vec(&gf, n, n, &mut rng);
            let mut expanded = Vector::new(&gf, n);
            fft.taylor_expand_t2(&mut expanded, &v1);
            let mut recovered = Vector::new(&gf, n);
            fft.inv_taylor_expand_t2(&mut recovered, &expanded);
            assert_eq!(recovered, v1);
        }
    }

    #[test]
    fn taylor_t2_known_small_case() {
        // (a, b, c, d) -> g0 = a + (b+c+d)x, g1 = (c+d) + dx
        let gf = gf2_16();
        let fft = Additive::new(&gf, 2).unwrap();
        let src = Vector::from_slice(&gf, &[1, 2, 4, 8]);
        let mut dst = Vector::new(&gf, 4);
        fft.taylor_expand_t2(&mut dst, &src);
        assert_eq!(dst, Vector::from_slice(&gf, &[1, 2 ^ 4 ^ 8, 4 ^ 8, 8]));
    }

    #[test]
    fn rejects_oversized_subspaces() {
        let gf = Arc::new(Ring::<u32>::binary_extension(4).unwrap());
        assert!(Additive::new(&gf, 4).is_ok());
        assert_eq!(Additive::new(&gf, 5).unwrap_err(), Error::UnsupportedSize);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn generic_taylor_round_trip(t in 2usize..20, extra in 0usize..40, seed in 0u64..1000) {
            let gf = gf2_16();
            let fft = Additive::new(&gf, 6).unwrap();
            let n = t + extra;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let v = random_vec(&gf, n, n, &mut rng);

            let blocks = n.div_ceil(t);
            let mut expanded = Vector::new(&gf, blocks * t);
            fft.taylor_expand(&mut expanded, &v, n, t);
            let mut recovered = Vector::new(&gf, n);
            fft.inv_taylor_expand(&mut recovered, &expanded, t);
            prop_assert_eq!(recovered, v);
        }
    }
}
