//! Built-in recipes.

mod boost;
mod cryptopp;
mod openssl;

pub use boost::Boost;
pub use cryptopp::CryptoPP;
pub use openssl::OpenSsl;
