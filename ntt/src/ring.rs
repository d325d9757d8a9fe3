//! Ring and field descriptors.
//!
//! A [`Ring`] is built once, wrapped in an `Arc`, and read-shared by every
//! vector, transform descriptor and cipher that depends on it. Arithmetic
//! dispatches on a tagged kind so element operations stay inlined.

use {
    crate::{
        arith,
        bin_ext::BinExtField,
        error::{Error, Result},
        word::Word,
    },
    rand::{
        distributions::{Distribution, Uniform},
        Rng,
    },
    rayon::prelude::*,
    std::{
        collections::HashMap,
        sync::{OnceLock, RwLock},
    },
    tracing::debug,
};

/// Target single-thread workload size for `T`.
/// Should ideally be a multiple of a cache line (64 bytes)
/// and close to the L1 cache size (32 KB).
pub(crate) const fn workload_size<T: Sized>() -> usize {
    const CACHE_SIZE: usize = 1 << 15;
    CACHE_SIZE / core::mem::size_of::<T>()
}

#[derive(Debug)]
enum Kind<T: Word> {
    /// Z/mZ for an arbitrary modulus m >= 2.
    Modular { m: T },
    /// GF(p) for a prime p.
    Prime { p: T },
    /// GF(2^deg).
    BinExt(BinExtField<T>),
}

pub struct Ring<T: Word> {
    kind: Kind<T>,
    card_minus_one: T,
    /// Prime factorisation of `card - 1`, with multiplicities.
    factors: Vec<(T, u32)>,
    primitive_root: OnceLock<Result<T>>,
    nth_roots: RwLock<HashMap<usize, T>>,
    uniform: Uniform<T>,
}

impl<T: Word> core::fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ring")
            .field("kind", &self.kind)
            .field("card_minus_one", &self.card_minus_one)
            .field("factors", &self.factors)
            .field("primitive_root", &self.primitive_root)
            .field("nth_roots", &self.nth_roots)
            .finish_non_exhaustive()
    }
}

impl<T: Word> Ring<T> {
    /// The ring of integers modulo `m`.
    pub fn modular(m: T) -> Result<Self> {
        if m < T::from_usize(2) {
            return Err(Error::InvalidArgument("modulus must be at least 2"));
        }
        debug!(modulus = %m, "building modular ring");
        Ok(Self {
            kind: Kind::Modular { m },
            card_minus_one: m - T::one(),
            factors: arith::factor(m - T::one()),
            primitive_root: OnceLock::new(),
            nth_roots: RwLock::new(HashMap::new()),
            uniform: Uniform::new(T::zero(), m),
        })
    }

    /// The prime field GF(p). Fails on composite `p`.
    pub fn prime(p: T) -> Result<Self> {
        if !arith::is_prime(p) {
            return Err(Error::InvalidArgument("field characteristic must be prime"));
        }
        debug!(characteristic = %p, "building prime field");
        Ok(Self {
            kind: Kind::Prime { p },
            card_minus_one: p - T::one(),
            factors: arith::factor(p - T::one()),
            primitive_root: OnceLock::new(),
            nth_roots: RwLock::new(HashMap::new()),
            uniform: Uniform::new(T::zero(), p),
        })
    }

    /// The binary extension field GF(2^deg).
    pub fn binary_extension(deg: u32) -> Result<Self> {
        let field = BinExtField::new(deg)?;
        let mask = field.mask();
        debug!(deg, "building binary extension field");
        Ok(Self {
            kind: Kind::BinExt(field),
            card_minus_one: mask,
            factors: arith::factor(mask),
            primitive_root: OnceLock::new(),
            nth_roots: RwLock::new(HashMap::new()),
            uniform: Uniform::new_inclusive(T::zero(), mask),
        })
    }

    /// Cardinality of the ring; `Overflow` for GF(2^w) at the full word
    /// width, where the count does not fit the word (use
    /// [`Self::card_minus_one`] there).
    pub fn card(&self) -> Result<T> {
        self.card_minus_one
            .checked_add(&T::one())
            .ok_or(Error::Overflow)
    }

    pub fn card_minus_one(&self) -> T {
        self.card_minus_one
    }

    /// The modulus for Z/mZ and GF(p); `None` for extension fields.
    pub fn modulus(&self) -> Option<T> {
        match &self.kind {
            Kind::Modular { m } => Some(*m),
            Kind::Prime { p } => Some(*p),
            Kind::BinExt(_) => None,
        }
    }

    pub fn extension_degree(&self) -> Option<u32> {
        match &self.kind {
            Kind::BinExt(f) => Some(f.deg()),
            _ => None,
        }
    }

    pub fn zero(&self) -> T {
        T::zero()
    }

    /// The element n·1, the image of an integer under the natural map. In
    /// characteristic two this is the parity of n.
    pub fn from_int(&self, n: usize) -> T {
        match &self.kind {
            Kind::Modular { m } | Kind::Prime { p: m } => T::from_usize(n % (*m).to_usize()),
            Kind::BinExt(_) => {
                if n % 2 == 1 {
                    T::one()
                } else {
                    T::zero()
                }
            }
        }
    }

    pub fn one(&self) -> T {
        T::one()
    }

    #[inline]
    pub fn add(&self, a: T, b: T) -> T {
        match &self.kind {
            Kind::Modular { m } | Kind::Prime { p: m } => {
                T::narrow((a.widen() + b.widen()) % m.widen())
            }
            Kind::BinExt(_) => a ^ b,
        }
    }

    #[inline]
    pub fn sub(&self, a: T, b: T) -> T {
        match &self.kind {
            Kind::Modular { m } | Kind::Prime { p: m } => {
                T::narrow((a.widen() + (*m - b).widen()) % m.widen())
            }
            Kind::BinExt(_) => a ^ b,
        }
    }

    #[inline]
    pub fn mul(&self, a: T, b: T) -> T {
        match &self.kind {
            Kind::Modular { m } | Kind::Prime { p: m } => arith::mul_mod(a, b, *m),
            Kind::BinExt(f) => f.mul(a, b),
        }
    }

    #[inline]
    pub fn neg(&self, a: T) -> T {
        match &self.kind {
            Kind::Modular { m } | Kind::Prime { p: m } => (*m - a) % *m,
            Kind::BinExt(_) => a,
        }
    }

    /// Multiplicative inverse; `NotInvertible` for zero and, in Z/mZ, for
    /// elements sharing a factor with the modulus.
    pub fn inv(&self, a: T) -> Result<T> {
        match &self.kind {
            Kind::Modular { m } | Kind::Prime { p: m } => {
                arith::inv_mod(a, *m).ok_or(Error::NotInvertible)
            }
            Kind::BinExt(f) => f.inv(a),
        }
    }

    pub fn div(&self, a: T, b: T) -> Result<T> {
        Ok(self.mul(a, self.inv(b)?))
    }

    pub fn exp(&self, base: T, exponent: T) -> T {
        match &self.kind {
            Kind::Modular { m } | Kind::Prime { p: m } => arith::exp_mod(base, exponent, *m),
            Kind::BinExt(f) => f.exp(base, exponent),
        }
    }

    #[inline]
    pub fn eq_to_one(&self, a: T) -> bool {
        a == T::one()
    }

    /// Uniform draw over the canonical element range.
    pub fn rand<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.uniform.sample(rng)
    }

    /// Smallest generator of the multiplicative group, cached after the
    /// first search.
    pub fn get_primitive_root(&self) -> Result<T> {
        *self
            .primitive_root
            .get_or_init(|| self.find_primitive_root())
    }

    fn find_primitive_root(&self) -> Result<T> {
        let order = self.card_minus_one;
        if order == T::one() {
            return Ok(T::one());
        }

        let mut g = T::from_usize(2);
        while g <= order {
            let mut ok = self.exp(g, order) == T::one();
            for &(p, _) in &self.factors {
                if !ok {
                    break;
                }
                ok = !self.eq_to_one(self.exp(g, order / p));
            }
            if ok {
                debug!(root = %g, "found primitive root");
                return Ok(g);
            }
            g = g + T::one();
        }
        Err(Error::NotFound)
    }

    /// An element of multiplicative order exactly `n`. `n` must divide
    /// `card - 1`.
    pub fn get_nth_root(&self, n: usize) -> Result<T> {
        if n == 0 {
            return Err(Error::InvalidArgument("root order must be positive"));
        }
        if let Some(&root) = self.nth_roots.read().unwrap().get(&n) {
            return Ok(root);
        }

        let n_t = T::from_usize(n);
        if n_t.to_usize() != n || self.card_minus_one % n_t != T::zero() {
            return Err(Error::NotFound);
        }
        let root = self.exp(self.get_primitive_root()?, self.card_minus_one / n_t);
        self.nth_roots.write().unwrap().insert(n, root);
        Ok(root)
    }

    /// Smallest divisor of `card - 1` that is at least `target`; transform
    /// sizes must be rounded through here, never silently.
    pub fn get_code_len(&self, target: usize) -> Result<usize> {
        let mut best: Option<T> = None;
        let mut divisors = vec![T::one()];
        for &(p, mult) in &self.factors {
            let mut extended = Vec::with_capacity(divisors.len() * (mult as usize + 1));
            for &d in &divisors {
                let mut d = d;
                extended.push(d);
                for _ in 0..mult {
                    match d.checked_mul(&p) {
                        Some(next) => {
                            d = next;
                            extended.push(d);
                        }
                        None => break,
                    }
                }
            }
            divisors = extended;
        }
        for d in divisors {
            if d.to_usize() >= target && best.map_or(true, |b| d < b) {
                best = Some(d);
            }
        }
        best.map(|b| b.to_usize()).ok_or(Error::UnsupportedSize)
    }

    /// Quadratic residuosity, specialised per field: the Jacobi symbol for
    /// odd primes, trivially true for p = 2 and in characteristic two
    /// (squaring is a bijection there). Plain Z/mZ has no specialisation
    /// and errors.
    pub fn is_quadratic_residue(&self, a: T) -> Result<bool> {
        match &self.kind {
            Kind::Prime { p } => {
                if *p == T::from_usize(2) {
                    Ok(true)
                } else {
                    Ok(arith::jacobi(a, *p) == 1)
                }
            }
            Kind::BinExt(_) => Ok(true),
            Kind::Modular { .. } => Err(Error::InvalidArgument(
                "quadratic residuosity is specialised for fields only",
            )),
        }
    }

    /// Element-wise product `dst[i] *= src[i]`. Wide inputs fan out over
    /// the thread pool; results are identical to the scalar loop.
    pub fn hadamard_mul(&self, dst: &mut [T], src: &[T]) {
        assert_eq!(
            dst.len(),
            src.len(),
            "hadamard operands must have equal length"
        );
        if dst.len() > workload_size::<T>() {
            dst.par_iter_mut()
                .zip(src.par_iter())
                .for_each(|(d, s)| *d = self.mul(*d, *s));
        } else {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = self.mul(*d, *s);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rand_chacha::{rand_core::SeedableRng, ChaCha8Rng},
        test_case::test_case,
    };

    #[test]
    fn prime_ctor_validates() {
        assert!(Ring::<u32>::prime(7681).is_ok());
        assert_eq!(
            Ring::<u32>::prime(7680).unwrap_err(),
            Error::InvalidArgument("field characteristic must be prime")
        );
        assert!(Ring::<u32>::modular(7680).is_ok());
    }

    #[test]
    fn gf97_inverse() {
        let gf = Ring::<u32>::prime(97).unwrap();
        assert_eq!(gf.inv(20).unwrap(), 34);
        assert_eq!(gf.inv(0).unwrap_err(), Error::NotInvertible);

        // Bezout coefficient of x agrees with the field inverse.
        for x in 1u32..97 {
            let (g, _, v) = arith::extended_gcd(97u32, x);
            assert_eq!(g, 1);
            let v = if v < 0 { v + 97 } else { v } as u32;
            assert_eq!(v, gf.inv(x).unwrap());
        }
    }

    #[test]
    fn inverse_law_random() {
        let gf = Ring::<u64>::prime(65537).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..500 {
            let a = gf.rand(&mut rng).max(1);
            assert_eq!(gf.mul(a, gf.inv(a).unwrap()), 1);
        }
    }

    #[test_case(7681)]
    #[test_case(12289)]
    #[test_case(65537)]
    fn primitive_root_generates(q: u64) {
        let gf = Ring::<u64>::prime(q).unwrap();
        let g = gf.get_primitive_root().unwrap();
        assert_eq!(gf.exp(g, q - 1), 1);
        for p in arith::factor_distinct(q - 1) {
            assert_ne!(gf.exp(g, (q - 1) / p), 1);
        }
        // A generator of a cyclic group of even order is a non-residue.
        assert_eq!(arith::jacobi(g, q), -1);
    }

    #[test]
    fn primitive_root_gf2n() {
        for deg in [4u32, 8, 16, 32] {
            let gf = Ring::<u64>::binary_extension(deg).unwrap();
            let g = gf.get_primitive_root().unwrap();
            let order = gf.card_minus_one();
            assert_eq!(gf.exp(g, order), 1);
            for p in arith::factor_distinct(order) {
                assert_ne!(gf.exp(g, order / p), 1);
            }
        }
    }

    #[test]
    fn nth_roots_have_exact_order() {
        let gf = Ring::<u32>::prime(65537).unwrap();
        for n in [2usize, 8, 32, 256, 65536] {
            let w = gf.get_nth_root(n).unwrap();
            assert_eq!(gf.exp(w, n as u32), 1);
            for k in arith::factor_distinct(n as u32) {
                assert_ne!(gf.exp(w, n as u32 / k), 1);
            }
        }
        assert_eq!(gf.get_nth_root(3).unwrap_err(), Error::NotFound);
    }

    #[test]
    fn code_len_rounds_up_to_divisors() {
        let gf65537 = Ring::<u32>::prime(65537).unwrap();
        assert_eq!(gf65537.get_code_len(32).unwrap(), 32);
        assert_eq!(gf65537.get_code_len(33).unwrap(), 64);

        let gf2_16 = Ring::<u32>::binary_extension(16).unwrap();
        // 65535 = 3 * 5 * 17 * 257; the smallest divisor >= 32 is 51.
        assert_eq!(gf2_16.get_code_len(32).unwrap(), 51);
        assert_eq!(gf2_16.get_code_len(70_000).unwrap_err(), Error::UnsupportedSize);
    }

    #[test]
    fn quadratic_residues_match_squares() {
        let gf = Ring::<u32>::prime(7).unwrap();
        assert!(gf.is_quadratic_residue(2).unwrap());
        assert!(!gf.is_quadratic_residue(5).unwrap());
        let gf97 = Ring::<u32>::prime(97).unwrap();
        for b in 1u32..97 {
            assert!(gf97.is_quadratic_residue(gf97.mul(b, b)).unwrap());
        }
    }

    #[test]
    fn quadratic_residues_undefined_on_generic_rings() {
        // Even moduli in particular must not fall through to the Jacobi
        // symbol's oddness requirement.
        let ring = Ring::<u64>::modular(7680).unwrap();
        assert_eq!(
            ring.is_quadratic_residue(4).unwrap_err(),
            Error::InvalidArgument("quadratic residuosity is specialised for fields only")
        );
    }

    #[test]
    fn full_width_extension_field_card_overflows() {
        let gf = Ring::<u64>::binary_extension(64).unwrap();
        assert_eq!(gf.card().unwrap_err(), Error::Overflow);
        assert_eq!(gf.card_minus_one(), u64::MAX);

        let gf16 = Ring::<u32>::binary_extension(16).unwrap();
        assert_eq!(gf16.card().unwrap(), 65536);
        assert_eq!(Ring::<u32>::prime(7681).unwrap().card().unwrap(), 7681);
    }

    #[test]
    fn hadamard_matches_scalar() {
        let gf = Ring::<u32>::prime(7681).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = workload_size::<u32>() * 2 + 3;
        let a: Vec<u32> = (0..n).map(|_| gf.rand(&mut rng)).collect();
        let b: Vec<u32> = (0..n).map(|_| gf.rand(&mut rng)).collect();

        let mut wide = a.clone();
        gf.hadamard_mul(&mut wide, &b);
        for i in 0..n {
            assert_eq!(wide[i], gf.mul(a[i], b[i]));
        }
    }

    #[test]
    fn modular_ring_partial_inverses() {
        let ring = Ring::<u64>::modular(7680).unwrap();
        assert_eq!(ring.inv(2).unwrap_err(), Error::NotInvertible);
        let inv7 = ring.inv(7).unwrap();
        assert_eq!(ring.mul(7, inv7), 1);
    }
}
