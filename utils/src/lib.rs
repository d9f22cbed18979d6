mod biguint_ext;
pub use biguint_ext::BigUintExt;

mod prime;
pub use prime::SMALL_PRIMES;

pub mod io;
