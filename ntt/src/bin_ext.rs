//! Binary extension field arithmetic GF(2^deg).
//!
//! Elements are deg-bit patterns; addition is XOR and multiplication is
//! carry-less polynomial multiplication reduced by a primitive polynomial.
//! Small fields (deg <= 16) get log/antilog tables over the cyclic group;
//! larger fields fall back to the shift-XOR multiply.

use crate::{error::Error, error::Result, word::Word};

/// Primitive polynomial for each supported degree, without the leading
/// x^deg term.
const fn poly_low_for(deg: u32) -> Option<u64> {
    match deg {
        1 => Some(0x1),
        2 => Some(0x3),
        3 => Some(0x3),
        4 => Some(0x3),
        5 => Some(0x5),
        6 => Some(0x3),
        7 => Some(0x3),
        8 => Some(0x1d),
        9 => Some(0x11),
        10 => Some(0x9),
        11 => Some(0x5),
        12 => Some(0x53),
        13 => Some(0x1b),
        14 => Some(0x443),
        15 => Some(0x3),
        16 => Some(0x100b),
        32 => Some(0x400007),
        64 => Some(0x1b),
        _ => None,
    }
}

const LOG_TABLE_MAX_DEG: u32 = 16;

struct LogTables<T> {
    /// log[e] for e in 1..2^deg; log[0] is unused.
    log: Vec<u32>,
    /// antilog[i] = x^i for i in 0..2^deg - 1.
    antilog: Vec<T>,
}

pub(crate) struct BinExtField<T: Word> {
    deg: u32,
    mask: T,
    poly_low: T,
    tables: Option<LogTables<T>>,
}

impl<T: Word> BinExtField<T> {
    pub(crate) fn new(deg: u32) -> Result<Self> {
        if deg == 0 || deg > T::BITS {
            return Err(Error::InvalidArgument(
                "extension degree must be between 1 and the word width",
            ));
        }
        let poly_low = match poly_low_for(deg) {
            Some(p) => T::from_usize(p as usize),
            None => return Err(Error::UnsupportedSize),
        };
        let mask = if deg == T::BITS {
            T::max_value()
        } else {
            (T::one() << deg as usize) - T::one()
        };

        let mut field = Self {
            deg,
            mask,
            poly_low,
            tables: None,
        };
        if deg <= LOG_TABLE_MAX_DEG {
            field.tables = Some(field.build_tables());
        }
        Ok(field)
    }

    fn build_tables(&self) -> LogTables<T> {
        let order = self.mask.to_usize();
        let mut log = vec![0u32; order + 1];
        let mut antilog = vec![T::zero(); order];

        let x = T::from_usize(2);
        let mut cur = T::one();
        for i in 0..order {
            antilog[i] = cur;
            log[cur.to_usize()] = i as u32;
            cur = self.clmul(cur, x);
        }
        // x is a generator because the polynomial is primitive
        debug_assert_eq!(cur, T::one());

        LogTables { log, antilog }
    }

    pub(crate) fn deg(&self) -> u32 {
        self.deg
    }

    pub(crate) fn mask(&self) -> T {
        self.mask
    }

    /// Shift-XOR carry-less multiply with on-the-fly reduction.
    fn clmul(&self, a: T, b: T) -> T {
        let high_bit = T::one() << (self.deg - 1) as usize;
        let mut a = a;
        let mut b = b;
        let mut acc = T::zero();
        while b != T::zero() {
            if b & T::one() == T::one() {
                acc = acc ^ a;
            }
            b = b >> 1;
            let carry = a & high_bit != T::zero();
            a = (a << 1) & self.mask;
            if carry {
                a = a ^ self.poly_low;
            }
        }
        acc
    }

    pub(crate) fn mul(&self, a: T, b: T) -> T {
        match &self.tables {
            Some(t) => {
                if a == T::zero() || b == T::zero() {
                    return T::zero();
                }
                let order = self.mask.to_usize() as u64;
                let i = (t.log[a.to_usize()] as u64 + t.log[b.to_usize()] as u64) % order;
                t.antilog[i as usize]
            }
            None => self.clmul(a, b),
        }
    }

    pub(crate) fn inv(&self, a: T) -> Result<T> {
        if a == T::zero() {
            return Err(Error::NotInvertible);
        }
        match &self.tables {
            Some(t) => {
                let order = self.mask.to_usize() as u64;
                let i = (order - t.log[a.to_usize()] as u64) % order;
                Ok(t.antilog[i as usize])
            }
            // a^(2^deg - 2) = a^-1; the group order is the element mask
            None => Ok(self.exp(a, self.mask - T::one())),
        }
    }

    pub(crate) fn exp(&self, base: T, exponent: T) -> T {
        let mut result = T::one();
        let mut base = base;
        let mut e = exponent;
        while e != T::zero() {
            if e & T::one() == T::one() {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            e = e >> 1;
        }
        result
    }
}

impl<T: Word> core::fmt::Debug for BinExtField<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BinExtField")
            .field("deg", &self.deg)
            .field("poly_low", &self.poly_low)
            .field("tables", &self.tables.is_some())
            .finish()
    }
}
