//! Signing HTTP requests for Kong API Gateway's hmac-auth plugin.
//!
//! Kong authenticates a consumer by recomputing an HMAC over a small
//! canonical description of the request: selected headers, the request
//! line and an optional body digest. This crate builds that canonical
//! string, computes the signature and attaches the resulting
//! `Authorization` header, plus any generated `Date` and `Digest`
//! headers, to the request.
//!
//! # Example
//!
//! ```no_run
//! use anyhow::Result;
//! use kong_hmac::Config;
//! use kong_hmac::Signer;
//!
//! fn main() -> Result<()> {
//!     let config = Config::new().with_username("alice").with_secret("secret");
//!     let signer = Signer::new(config)?;
//!
//!     // Construct request
//!     let req = http::Request::post("http://127.0.0.1:8000/v1/resource?x=1").body(())?;
//!     let (mut parts, _) = req.into_parts();
//!
//!     // Signing request with Signer
//!     signer.sign(&mut parts, Some(br#"{"a":1}"#))?;
//!     println!("authorization: {}", parts.headers["authorization"].to_str()?);
//!     Ok(())
//! }
//! ```
//!
//! # Signing components
//!
//! The `headers` option of [`Config`] selects what gets signed, in order.
//! `date`, `request-line` and `digest` are special components; any other
//! name selects a request header. The default is
//! `date request-line digest`, matching the plugin's own default.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;

mod algorithm;
pub use algorithm::Algorithm;
mod charset;
pub use charset::Charset;
mod component;
pub use component::SigningComponent;
mod config;
pub use config::Config;
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
mod signer;
pub use signer::Signer;
mod utils;
