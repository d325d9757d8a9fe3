mod cipher;
mod params;

pub use {cipher::CipherRlwe, params::RlweParams};
