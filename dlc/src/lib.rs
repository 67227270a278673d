#![cfg_attr(docsrs, feature(doc_cfg))]

//! This crate decodes and creates DLC download containers.
//!
//! A container is a base64 blob of AES encrypted, base64 encoded markup
//! followed by an 88 character key token. The token is exchanged with a
//! remote key service for the real key, see [`KeyService`].
//!
//! ```no_run
//! use dlc::{Container, HttpKeyService};
//!
//! let service = HttpKeyService::new()?;
//! let container = Container::decode(&std::fs::read_to_string("links.dlc")?, &service)?;
//!
//! for link in container.links() {
//!     println!("{}", link);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Optional Features
//!
//! - **native-tls** (default): TLS for the key service client via native-tls.
//! - **rustls-tls-webpki-roots**: TLS via rustls with webpki roots.
//! - **rustls-tls-native-roots**: TLS via rustls with native roots.

pub mod cipher;
pub mod codec;
pub mod service;
pub mod text;

mod error;
mod model;

pub use codec::{decode, decrypt, encode, encrypt};
pub use error::Error;
pub use model::*;
pub use reqwest;
pub use service::{HttpKeyService, HttpKeyServiceBuilder, KeyService, LoopbackKeyService};

/// A `Result` alias where the `Err` case is `dlc::Error`.
pub type Result<T> = std::result::Result<T, Error>;
