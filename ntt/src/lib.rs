pub mod arith;
mod bin_ext;
mod buffers;
mod error;
pub mod fft;
mod poly;
mod ring;
mod vector;
mod word;

pub use {
    buffers::Buffers,
    error::{Error, Result},
    poly::Poly,
    ring::Ring,
    vector::{Storage, Vector},
    word::Word,
};
