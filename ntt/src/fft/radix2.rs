//! Iterative decimation-in-time transform for power-of-two sizes.
//!
//! The twiddle table is stored in bit-reversed order so every stage walks
//! it linearly (the "reversed ordered roots" arrangement from Inside the
//! FFT Blackbox). The stage loop runs natural-to-reversed and a final
//! reordering pass restores natural output order. Batched inputs keep the
//! lanes interleaved, so butterflies stream whole coefficient rows and
//! large stages fan out over the thread pool.

use {
    crate::{
        buffers::Buffers,
        error::{Error, Result},
        fft::{check_root_order, reverse_bits, FourierTransform},
        ring::{workload_size, Ring},
        vector::Vector,
        word::Word,
    },
    rayon::prelude::*,
    std::sync::Arc,
};

pub struct Radix2<T: Word> {
    ring: Arc<Ring<T>>,
    n: usize,
    /// Declared bound on the non-zero input prefix. The stage skip keys
    /// off the actual input length, which the zero padding makes
    /// authoritative; this records the caller's planning bound.
    data_len: usize,
    inv_n: T,
    /// n/2 twiddles in bit-reversed order.
    roots_rev: Vec<T>,
}

impl<T: Word> Radix2<T> {
    /// Transform of size `n` with the field's canonical order-n root.
    pub fn new(ring: &Arc<Ring<T>>, n: usize, data_len: usize) -> Result<Self> {
        if !n.is_power_of_two() {
            return Err(Error::InvalidArgument("transform size must be a power of two"));
        }
        let w = ring.get_nth_root(n)?;
        Self::with_root(ring, n, data_len, w)
    }

    /// Same, with an explicit root of exact order `n`. Used where several
    /// descriptors must share one root (residue transforms of the
    /// large-modulus variant).
    pub fn with_root(ring: &Arc<Ring<T>>, n: usize, data_len: usize, w: T) -> Result<Self> {
        if !n.is_power_of_two() || n < 2 {
            return Err(Error::InvalidArgument("transform size must be a power of two"));
        }
        if !data_len.is_power_of_two() || data_len > n {
            return Err(Error::InvalidArgument(
                "bounded data length must be a power of two within the transform size",
            ));
        }
        check_root_order(ring, w, n)?;

        Ok(Self {
            ring: Arc::clone(ring),
            n,
            data_len,
            inv_n: ring.inv(ring.from_int(n))?,
            roots_rev: init_roots_reverse_ordered(ring, n, w),
        })
    }

    pub fn data_len(&self) -> usize {
        self.data_len
    }

    #[inline]
    fn butterfly_row(&self, w: T, evens: &mut [T], odds: &mut [T]) {
        let ring = &self.ring;
        for (e, o) in evens.iter_mut().zip(odds) {
            let t = ring.mul(w, *o);
            (*e, *o) = (ring.add(*e, t), ring.sub(*e, t));
        }
    }

    /// In-place DIT stages from natural order to bit-reversed order over
    /// `rows = values.len() / lanes` interleaved coefficient rows. Rows
    /// from `data_rows` on hold zeros, so the widest stages reduce to
    /// duplicating the even halves.
    fn dit_nr(&self, values: &mut [T], lanes: usize, data_rows: usize) {
        let rows = values.len() / lanes;
        let mut pairs = rows / 2;
        let mut groups = 1;

        while groups < rows && pairs >= data_rows {
            values.chunks_exact_mut(2 * pairs * lanes).for_each(|group| {
                let (evens, odds) = group.split_at_mut(pairs * lanes);
                odds.copy_from_slice(evens);
            });
            pairs /= 2;
            groups *= 2;
        }

        // Parallelizing over the groups is most effective but in the
        // beginning there aren't enough groups to occupy all threads.
        while groups < 32.min(rows) && 2 * pairs * lanes > workload_size::<T>() {
            values
                .chunks_exact_mut(2 * pairs * lanes)
                .enumerate()
                .for_each(|(k, group)| {
                    let w = self.roots_rev[k];
                    let (evens, odds) = group.split_at_mut(pairs * lanes);
                    evens
                        .par_chunks_mut(lanes)
                        .zip(odds.par_chunks_mut(lanes))
                        .for_each(|(er, or)| self.butterfly_row(w, er, or));
                });
            pairs /= 2;
            groups *= 2;
        }

        while groups < rows && 2 * pairs * lanes > workload_size::<T>() {
            values
                .par_chunks_exact_mut(2 * pairs * lanes)
                .enumerate()
                .for_each(|(k, group)| {
                    let w = self.roots_rev[k];
                    let (evens, odds) = group.split_at_mut(pairs * lanes);
                    self.butterfly_row(w, evens, odds);
                });
            pairs /= 2;
            groups *= 2;
        }

        while groups < rows {
            values
                .chunks_exact_mut(2 * pairs * lanes)
                .enumerate()
                .for_each(|(k, group)| {
                    let w = self.roots_rev[k];
                    let (evens, odds) = group.split_at_mut(pairs * lanes);
                    self.butterfly_row(w, evens, odds);
                });
            pairs /= 2;
            groups *= 2;
        }
    }

    fn scale_rows(&self, values: &mut [T]) {
        let ring = &self.ring;
        for e in values {
            *e = ring.mul(*e, self.inv_n);
        }
    }
}

impl<T: Word> FourierTransform<T> for Radix2<T> {
    fn n(&self) -> usize {
        self.n
    }

    fn ring(&self) -> &Arc<Ring<T>> {
        &self.ring
    }

    fn fft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        output.copy_with_pad(input);
        // Rows past the input are zero by the padding above, so the skip
        // bound is the input length itself.
        self.dit_nr(output.as_mut_slice(), 1, input.len().max(1));
        reverse_order(output.as_mut_slice(), 1);
    }

    fn ifft(&self, output: &mut Vector<'_, T>, input: &Vector<'_, T>) {
        assert_eq!(output.len(), self.n, "output length must be the transform size");
        assert_eq!(input.len(), self.n, "inverse transform input must be full length");
        output.copy_with_pad(input);
        // Reversing the tail turns the forward transform into the inverse
        // one, up to the n^-1 factor.
        output.as_mut_slice()[1..].reverse();
        self.dit_nr(output.as_mut_slice(), 1, self.n);
        reverse_order(output.as_mut_slice(), 1);
        self.scale_rows(output.as_mut_slice());
    }

    fn fft_buffers(&self, output: &mut Buffers<'_, T>, input: &Buffers<'_, T>) {
        assert_eq!(output.rows(), self.n, "output row count must be the transform size");
        assert_eq!(output.lanes(), input.lanes(), "lane counts must match");
        output.copy_with_pad(input);
        let lanes = output.lanes();
        self.dit_nr(output.as_mut_slice(), lanes, input.rows().max(1));
        reverse_order(output.as_mut_slice(), lanes);
    }

    fn ifft_buffers(&self, output: &mut Buffers<'_, T>, input: &Buffers<'_, T>) {
        assert_eq!(output.rows(), self.n, "output row count must be the transform size");
        assert_eq!(input.rows(), self.n, "inverse transform input must be full length");
        assert_eq!(output.lanes(), input.lanes(), "lane counts must match");
        output.copy_with_pad(input);
        let lanes = output.lanes();
        reverse_rows(output.as_mut_slice(), lanes, self.n);
        self.dit_nr(output.as_mut_slice(), lanes, self.n);
        reverse_order(output.as_mut_slice(), lanes);
        self.scale_rows(output.as_mut_slice());
    }
}

/// Twiddle table `w^0 .. w^(n/2 - 1)` stored in bit-reversed index order.
fn init_roots_reverse_ordered<T: Word>(ring: &Ring<T>, n: usize, w: T) -> Vec<T> {
    match n / 2 {
        0 => vec![],
        // 1 is a separate case due to `1.trailing_zeros() == 0` which
        // reverse_bits rejects
        1 => vec![T::one()],
        half => {
            let mut roots = vec![T::zero(); half];
            let bits = half.trailing_zeros();
            let mut w_k = T::one();
            for k in 0..half {
                roots[reverse_bits(k, bits)] = w_k;
                w_k = ring.mul(w_k, w);
            }
            roots
        }
    }
}

/// Permute interleaved coefficient rows into bit-reversed row order.
fn reverse_order<T>(values: &mut [T], lanes: usize) {
    let rows = values.len() / lanes;
    if rows <= 1 {
        return;
    }
    let bits = rows.trailing_zeros();
    for i in 0..rows {
        let r = reverse_bits(i, bits);
        if i < r {
            for u in 0..lanes {
                values.swap(i * lanes + u, r * lanes + u);
            }
        }
    }
}

/// Reverse rows 1..n (the batched form of the inverse-via-forward trick).
fn reverse_rows<T>(values: &mut [T], lanes: usize, rows: usize) {
    let (mut i, mut j) = (1, rows - 1);
    while i < j {
        for u in 0..lanes {
            values.swap(i * lanes + u, j * lanes + u);
        }
        i += 1;
        j -= 1;
    }
}
