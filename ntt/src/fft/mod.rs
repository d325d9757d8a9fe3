//! The transform family.
//!
//! Every variant implements [`FourierTransform`]; they differ in their
//! construction preconditions and inner loops. Descriptors are immutable
//! once built, own their twiddle tables, and may be shared across threads.

mod additive;
mod cooley_tukey;
mod good_thomas;
mod large;
mod naive;
mod radix2;
mod single;
mod size2;

pub use {
    additive::Additive, cooley_tukey::CooleyTukey, good_thomas::GoodThomas, large::Large,
    naive::Naive, radix2::Radix2, single::Single, size2::Size2,
};

use {
    crate::{
        buffers::Buffers,
        error::{Error, Result},
        ring::Ring,
        vector::Vector,
        word::Word,
    },
    std::sync::Arc,
    tracing::debug,
};

/// Discrete Fourier transform over a finite ring.
///
/// `fft` and `ifft` cannot fail on a well-constructed descriptor. The
/// destination always has the transform length; the source may be shorter
/// and is treated as zero-padded (`ifft` inputs are full spectra and must
/// be full length).
pub trait FourierTransform<T: Word>: Send + Sync {
    /// Transform size.
    fn n(&self) -> usize;

    fn ring(&self) -> &Arc<Ring<T>>;

    fn fft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>);

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>);

    /// Batched transform: lane u of the output is the transform of lane u
    /// of the input.
    fn fft_buffers(&self, output: &mut Buffers<'_, T>, input: &Buffers<'_, T>) {
        transform_lanes(self, output, input, false);
    }

    fn ifft_buffers(&self, output: &mut Buffers<'_, T>, input: &Buffers<'_, T>) {
        transform_lanes(self, output, input, true);
    }
}

pub(crate) type BoxedTransform<T> = Box<dyn FourierTransform<T>>;

/// Fallback batched form: peel each lane into a scratch vector and run the
/// single-vector transform. Variants with a genuinely lane-parallel kernel
/// override the trait methods instead.
fn transform_lanes<T: Word, F: FourierTransform<T> + ?Sized>(
    fft: &F,
    output: &mut Buffers<'_, T>,
    input: &Buffers<'_, T>,
    inverse: bool,
) {
    let n = fft.n();
    assert_eq!(output.rows(), n, "output row count must be the transform size");
    assert_eq!(output.lanes(), input.lanes(), "lane counts must match");
    if inverse {
        assert_eq!(input.rows(), n, "inverse transform input must be full length");
    } else {
        assert!(input.rows() <= n, "input row count exceeds the transform size");
    }

    let ring = Arc::clone(fft.ring());
    let mut src = Vector::new(&ring, if inverse { n } else { input.rows() });
    let mut dst = Vector::new(&ring, n);
    for u in 0..input.lanes() {
        for i in 0..input.rows() {
            src.set(i, input.row(i)[u]);
        }
        if inverse {
            fft.ifft(&mut dst, &src);
        } else {
            fft.fft(&mut dst, &src);
        }
        for i in 0..n {
            output.row_mut(i)[u] = dst.get(i);
        }
    }
}

/// Inverse transform through the forward one:
/// `IDFT[k] = n^-1 * DFT[(n - k) mod n]`. Exact in any ring where n is
/// invertible, so composed variants inherit a bit-exact round trip.
pub(crate) fn ifft_by_index_reversal<T: Word, F: FourierTransform<T> + ?Sized>(
    fft: &F,
    output: &mut Vector<'_, T>,
    input: &Vector<'_, T>,
    inv_n: T,
) {
    let n = fft.n();
    assert_eq!(input.len(), n, "inverse transform input must be full length");
    assert_eq!(output.len(), n, "output length must be the transform size");

    let ring = Arc::clone(fft.ring());
    let mut tmp = Vector::new(&ring, n);
    fft.fft(&mut tmp, input);

    output.set(0, ring.mul(tmp.get(0), inv_n));
    for k in 1..n {
        output.set(k, ring.mul(tmp.get(n - k), inv_n));
    }
}

/// Pick a transform from the family for an inner pass of a composed
/// variant: radix-2 for powers of two, Good-Thomas for coprime-splittable
/// composites, the quadratic fallback for prime(-power) sizes.
pub(crate) fn plan<T: Word>(ring: &Arc<Ring<T>>, n: usize, w: T) -> Result<BoxedTransform<T>> {
    if n >= 2 && n.is_power_of_two() {
        debug!(n, "planning radix-2 pass");
        return Ok(Box::new(Radix2::with_root(ring, n, n, w)?));
    }
    if good_thomas::coprime_split(n).is_some() {
        debug!(n, "planning Good-Thomas pass");
        return Ok(Box::new(GoodThomas::with_root(ring, n, w)?));
    }
    debug!(n, "planning quadratic pass");
    Ok(Box::new(Naive::new(ring, n, w)?))
}

/// Order of `w` must be exactly `n`.
pub(crate) fn check_root_order<T: Word>(ring: &Ring<T>, w: T, n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidArgument("transform size must be positive"));
    }
    if T::from_usize(n).to_usize() != n {
        return Err(Error::Overflow);
    }
    if !ring.eq_to_one(ring.exp(w, T::from_usize(n))) {
        return Err(Error::NotFound);
    }
    for p in crate::arith::factor_distinct(T::from_usize(n)) {
        if ring.eq_to_one(ring.exp(w, T::from_usize(n) / p)) {
            return Err(Error::NotFound);
        }
    }
    Ok(())
}

/// Bit reverses val for a given bit size.
///
/// Requires:
/// - bits > 0
/// - val < 2^bits
pub(crate) fn reverse_bits(val: usize, bits: u32) -> usize {
    debug_assert!(bits > 0);
    debug_assert!(val < 2_usize.pow(bits));
    val.reverse_bits() >> (usize::BITS - bits)
}

#[cfg(test)]
pub(crate) mod test_support {
    use {
        super::*,
        rand_chacha::{rand_core::SeedableRng, ChaCha8Rng},
    };

    /// A vector with `to_init` random leading entries over `gf`.
    pub fn random_vec<T: Word>(
        gf: &Arc<Ring<T>>,
        size: usize,
        to_init: usize,
        rng: &mut ChaCha8Rng,
    ) -> Vector<'static, T> {
        let mut vec = Vector::new(gf, size);
        for i in 0..to_init {
            vec.set(i, gf.rand(rng));
        }
        vec
    }

    /// Forward then inverse transform of 1000 random bounded-support
    /// vectors must reproduce the input.
    pub fn check_fft_codec<T: Word>(gf: &Arc<Ring<T>>, fft: &dyn FourierTransform<T>, n_data: usize) {
        let mut rng = ChaCha8Rng::seed_from_u64(n_data as u64);
        let mut transformed = Vector::new(gf, fft.n());
        let mut recovered = Vector::new(gf, fft.n());
        for _ in 0..1000 {
            let v = random_vec(gf, fft.n(), n_data, &mut rng);
            fft.fft(&mut transformed, &v);
            fft.ifft(&mut recovered, &transformed);
            assert_eq!(v, recovered);
        }
    }

    /// Two descriptors over the same field and size must agree element-wise
    /// on both directions.
    pub fn check_fft_1vs1<T: Word>(
        gf: &Arc<Ring<T>>,
        fft1: &dyn FourierTransform<T>,
        fft2: &dyn FourierTransform<T>,
        n_data: usize,
    ) {
        assert_eq!(fft1.n(), fft2.n());
        let n = fft1.n();
        let mut rng = ChaCha8Rng::seed_from_u64(n as u64);
        let mut fwd1 = Vector::new(gf, n);
        let mut fwd2 = Vector::new(gf, n);
        let mut inv1 = Vector::new(gf, n);
        let mut inv2 = Vector::new(gf, n);
        for _ in 0..100 {
            let v = random_vec(gf, n, n_data, &mut rng);

            fft1.fft(&mut fwd1, &v);
            fft2.fft(&mut fwd2, &v);
            assert_eq!(fwd1, fwd2);

            fft1.ifft(&mut inv1, &fwd1);
            fft2.ifft(&mut inv2, &fwd2);
            assert_eq!(inv1, inv2);
            assert_eq!(inv1, v);
        }
    }

    /// Fill a buffers batch with uniform random elements.
    pub fn random_buffers<T: Word>(
        gf: &Arc<Ring<T>>,
        rows: usize,
        lanes: usize,
        rng: &mut ChaCha8Rng,
    ) -> Buffers<'static, T> {
        let mut b = Buffers::new(gf, rows, lanes);
        b.rand(rng);
        b
    }
}
