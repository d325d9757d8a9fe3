//! Transform of a constant: codec pipelines fan a single value through an
//! FFT-shaped slot, so the spectrum of (c, 0, ..., 0) is just c repeated.

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

pub struct Single<T: Word> {
    ring: Arc<Ring<T>>,
    n: usize,
}

impl<T: Word> Single<T> {
    pub fn new(ring: &Arc<Ring<T>>, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidArgument("transform size must be positive"));
        }
        Ok(Self {
            ring: Arc::clone(ring),
            n,
        })
    }
}

impl<T: Word> FourierTransform<T> for Single<T> {
    fn n(&self) -> usize {
        self.n
    }

    fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    fn fft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        let c = if input.is_empty() { T::zero() } else { input.get(0) };
        output.fill(c);
    }

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        assert_eq!(input.len(), self.n, "inverse transform input must be full length");
        output.zero_fill();
        output.set(0, input.get(0));
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{arith, fft::test_support::check_fft_codec},
    };

    #[test]
    fn codec_round_trip() {
        let gf = Arc::new(Ring::<u32>::prime(65537).unwrap());
        let n = arith::ceil2(32u32) as usize;
        let fft = Single::new(&gf, n).unwrap();
        check_fft_codec(&gf, &fft, 1);
    }
}
