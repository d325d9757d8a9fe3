use {
    core::fmt::{Debug, Display},
    core::hash::Hash,
    num_traits::{CheckedAdd, CheckedMul, PrimInt, Unsigned},
    rand::distributions::uniform::SampleUniform,
};

/// Machine word an element lives in. Every field element is an unsigned
/// integer of this width; multiplications go through the double-width
/// `Double` type and signed Bézout coefficients through `SignedDouble`.
pub trait Word:
    PrimInt
    + Unsigned
    + CheckedAdd
    + CheckedMul
    + SampleUniform<Sampler: Send + Sync>
    + Debug
    + Display
    + Hash
    + Send
    + Sync
    + 'static
{
    type Double: PrimInt + Unsigned + Debug + Send + Sync;
    type SignedDouble: PrimInt + num_traits::Signed + Debug;

    const BITS: u32;

    fn widen(self) -> Self::Double;

    /// Truncating cast back down. The caller guarantees the value fits.
    fn narrow(wide: Self::Double) -> Self;

    fn widen_signed(self) -> Self::SignedDouble;

    /// Truncating cast from a signed double-width value. The caller
    /// guarantees the value is non-negative and fits.
    fn from_signed(signed: Self::SignedDouble) -> Self;

    /// Truncating cast from usize. The caller guarantees the value fits.
    fn from_usize(v: usize) -> Self;

    fn to_usize(self) -> usize;
}

macro_rules! impl_word {
    ($ty:ty, $double:ty, $signed:ty) => {
        impl Word for $ty {
            type Double = $double;
            type SignedDouble = $signed;

            const BITS: u32 = <$ty>::BITS;

            #[inline]
            fn widen(self) -> $double {
                self as $double
            }

            #[inline]
            fn narrow(wide: $double) -> $ty {
                wide as $ty
            }

            #[inline]
            fn widen_signed(self) -> $signed {
                self as $signed
            }

            #[inline]
            fn from_signed(signed: $signed) -> $ty {
                signed as $ty
            }

            #[inline]
            fn from_usize(v: usize) -> $ty {
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_word!(u16, u32, i32);
impl_word!(u32, u64, i64);
impl_word!(u64, u128, i128);
