//! The n = 2 transform is a single butterfly.

use {
    crate::{
        error::Result,
        fft::FourierTransform,
        ring::Ring,
        vector::Vector,
        word::Word,
    },
    std::sync::Arc,
};

pub struct Size2<T: Word> {
    ring: Arc<Ring<T>>,
    inv_2: T,
}

impl<T: Word> Size2<T> {
    pub fn new(ring: &Arc<Ring<T>>) -> Result<Self> {
        // The order-2 root is -1; it exists whenever 2 divides card - 1.
        ring.get_nth_root(2)?;
        Ok(Self {
            ring: Arc::clone(ring),
            inv_2: ring.inv(ring.from_int(2))?,
        })
    }
}

impl<T: Word> FourierTransform<T> for Size2<T> {
    fn n(&self) -> usize {
        2
    }

    fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    fn fft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), 2, "output length must be the transform size");
        assert!(input.len() <= 2, "input length exceeds the transform size");
        let a = if input.is_empty() { T::zero() } else { input.get(0) };
        let b = if input.len() < 2 { T::zero() } else { input.get(1) };
        output.set(0, self.ring.add(a, b));
        output.set(1, self.ring.sub(a, b));
    }

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), 2, "output length must be the transform size");
        assert_eq!(input.len(), 2, "inverse transform input must be full length");
        let (a, b) = (input.get(0), input.get(1));
        output.set(0, self.ring.mul(self.ring.add(a, b), self.inv_2));
        output.set(1, self.ring.mul(self.ring.sub(a, b), self.inv_2));
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
    fn codec_round_trip() {
        let gf = Arc::new(Ring::<u32>::prime(65537).unwrap());
        let fft = Size2::new(&gf).unwrap();
        check_fft_codec(&gf, &fft, 2);
    }

    #[test]
    fn agrees_with_naive() {
        let gf = Arc::new(Ring::<u64>::prime(7681).unwrap());
        let r = gf.get_nth_root(2).unwrap();
        assert_eq!(r, 7680);
        let fft_naive = Naive::new(&gf, 2, r).unwrap();
        let fft_2 = Size2::new(&gf).unwrap();
        check_fft_1vs1(&gf, &fft_naive, &fft_2, 2);
    }

    #[test]
    fn unavailable_in_characteristic_two() {
        // 2^16 - 1 is odd: no order-2 root.
        let gf = Arc::new(Ring::<u32>::binary_extension(16).unwrap());
        assert!(Size2::new(&gf).is_err());
    }
}
