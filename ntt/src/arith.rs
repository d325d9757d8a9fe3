//! Arithmetic primitives shared by the field and transform layers.
//!
//! Everything here is a pure function over an unsigned [`Word`]. Misuse
//! (non-coprime CRT moduli, an even Jacobi modulus, zero where a positive
//! argument is required) is a programmer error and panics.

use crate::{
    error::{Error, Result},
    word::Word,
};
use num_traits::{One, Zero};

pub fn gcd<T: Word>(a: T, b: T) -> T {
    let (mut a, mut b) = (a, b);
    while b != T::zero() {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Extended Euclid. Returns `(g, u, v)` with `a*u + b*v = g`; the Bézout
/// coefficients are signed and double-width so they cannot wrap for any
/// pair of word-sized inputs.
pub fn extended_gcd<T: Word>(a: T, b: T) -> (T, T::SignedDouble, T::SignedDouble) {
    let zero = T::SignedDouble::zero();
    let one = T::SignedDouble::one();

    let (mut r0, mut r1) = (a.widen_signed(), b.widen_signed());
    let (mut s0, mut s1) = (one, zero);
    let (mut t0, mut t1) = (zero, one);

    while r1 != zero {
        let q = r0 / r1;
        (r0, r1) = (r1, r0 - q * r1);
        (s0, s1) = (s1, s0 - q * s1);
        (t0, t1) = (t1, t0 - q * t1);
    }

    (T::from_signed(r0), s0, t0)
}

/// Modular inverse of `a` mod `m`, or `None` when `gcd(a, m) != 1`.
pub fn inv_mod<T: Word>(a: T, m: T) -> Option<T> {
    let (g, _, v) = extended_gcd(m, a % m);
    if g != T::one() {
        return None;
    }
    let m_wide = m.widen_signed();
    let mut v = v % m_wide;
    if v < T::SignedDouble::zero() {
        v = v + m_wide;
    }
    Some(T::from_signed(v))
}

#[inline]
pub fn mul_mod<T: Word>(a: T, b: T, m: T) -> T {
    T::narrow((a.widen() * b.widen()) % m.widen())
}

#[inline]
pub fn add_mod<T: Word>(a: T, b: T, m: T) -> T {
    T::narrow((a.widen() + b.widen()) % m.widen())
}

/// Plain square-and-multiply without reduction. The caller ensures the
/// result fits the word.
pub fn exp<T: Word>(base: T, exponent: u32) -> T {
    let mut result = T::one();
    let mut base = base;
    let mut e = exponent;
    while e > 0 {
        if e & 1 == 1 {
            result = result * base;
        }
        base = base * base;
        e >>= 1;
    }
    result
}

/// Square-and-multiply modulo `modulus`.
pub fn exp_mod<T: Word>(base: T, exponent: T, modulus: T) -> T {
    assert!(modulus > T::zero(), "exp_mod requires a positive modulus");
    if modulus == T::one() {
        return T::zero();
    }
    let mut result = T::one();
    let mut base = base % modulus;
    let mut e = exponent;
    while e != T::zero() {
        if e & T::one() == T::one() {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        e = e >> 1;
    }
    result
}

/// Jacobi symbol (a/n) for odd positive n: -1, 0 or 1.
pub fn jacobi<T: Word>(a: T, n: T) -> i32 {
    assert!(
        n > T::zero() && n & T::one() == T::one(),
        "jacobi is defined for odd positive moduli"
    );

    let mut a = a % n;
    let mut n = n;
    let mut t = 1i32;
    let three = T::from_usize(3);

    while a != T::zero() {
        while a & T::one() == T::zero() {
            a = a >> 1;
            let r = n & T::from_usize(7);
            if r == three || r == T::from_usize(5) {
                t = -t;
            }
        }
        core::mem::swap(&mut a, &mut n);
        if a & three == three && n & three == three {
            t = -t;
        }
        a = a % n;
    }

    if n == T::one() {
        t
    } else {
        0
    }
}

// The first twelve primes are deterministic witnesses for every 64-bit
// input.
const MILLER_RABIN_WITNESSES: &[usize] = &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Miller-Rabin with witnesses sufficient for the supported word widths.
pub fn is_prime<T: Word>(n: T) -> bool {
    let two = T::from_usize(2);
    if n < two {
        return false;
    }
    if n & T::one() == T::zero() {
        return n == two;
    }

    // n - 1 = d * 2^s with d odd
    let mut d = n - T::one();
    let mut s = 0u32;
    while d & T::one() == T::zero() {
        d = d >> 1;
        s += 1;
    }

    'witness: for &w in MILLER_RABIN_WITNESSES {
        let w = T::from_usize(w);
        if w >= n {
            continue;
        }
        let mut x = exp_mod(w, d, n);
        if x == T::one() || x == n - T::one() {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - T::one() {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Unique `x` modulo the product of the pairwise-coprime `moduli` with
/// `x = residues[i] (mod moduli[i])` for every i. Non-coprime moduli are a
/// programmer error; a modulus product past the word width surfaces
/// `Overflow` so the caller can widen `T`.
pub fn chinese_remainder<T: Word>(residues: &[T], moduli: &[T]) -> Result<T> {
    assert!(
        !moduli.is_empty() && residues.len() == moduli.len(),
        "chinese_remainder requires matching residue and modulus lists"
    );

    let mut product = T::one();
    for (i, &m) in moduli.iter().enumerate() {
        assert!(m > T::one(), "chinese_remainder moduli must be at least 2");
        for &other in &moduli[i + 1..] {
            assert!(
                gcd(m, other) == T::one(),
                "chinese_remainder requires pairwise-coprime moduli"
            );
        }
        product = product.checked_mul(&m).ok_or(Error::Overflow)?;
    }

    let mut x = T::zero();
    for (&a, &m) in residues.iter().zip(moduli) {
        let partial = product / m;
        // partial is invertible mod m since the moduli are coprime
        let inverse = inv_mod(partial % m, m).unwrap_or(T::zero());
        let coeff = mul_mod(partial, inverse, product);
        let term = mul_mod(a % product, coeff, product);
        x = add_mod(x, term, product);
    }
    Ok(x)
}

/// Integer square root by Newton iteration.
pub fn isqrt<T: Word>(n: T) -> T {
    if n < T::from_usize(2) {
        return n;
    }
    let bits = T::BITS - n.leading_zeros();
    let mut x = T::one() << ((bits + 1) / 2) as usize;
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// ⌈log2 n⌉ for n >= 1.
pub fn log2<T: Word>(n: T) -> u32 {
    assert!(n > T::zero(), "log2 requires a positive argument");
    if n == T::one() {
        return 0;
    }
    T::BITS - (n - T::one()).leading_zeros()
}

/// Smallest power of two >= n.
pub fn ceil2<T: Word>(n: T) -> T {
    let l = log2(n);
    assert!(l < T::BITS, "ceil2 overflows the word width");
    T::one() << l as usize
}

/// Prime factorisation as `(prime, multiplicity)` pairs, ascending.
pub fn factor<T: Word>(n: T) -> Vec<(T, u32)> {
    assert!(n > T::zero(), "factor requires a positive argument");
    let mut n = n;
    let mut factors = Vec::new();

    let mut push = |p: T, count: u32| {
        if count > 0 {
            factors.push((p, count));
        }
    };

    let two = T::from_usize(2);
    let mut count = 0;
    while n & T::one() == T::zero() {
        n = n >> 1;
        count += 1;
    }
    push(two, count);

    let mut p = T::from_usize(3);
    while p <= isqrt(n) {
        let mut count = 0;
        while n % p == T::zero() {
            n = n / p;
            count += 1;
        }
        push(p, count);
        p = p + two;
    }
    if n > T::one() {
        push(n, 1);
    }
    factors
}

/// Distinct prime factors, ascending.
pub fn factor_distinct<T: Word>(n: T) -> Vec<T> {
    factor(n).into_iter().map(|(p, _)| p).collect()
}
