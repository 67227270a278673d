/*
    REFERENCES
    ----------

    1. http://service.jdownloader.org/dlcrypt/service.php

*/

//! Key exchange with the remote DLC key service.
//!
//! A container never carries its own key. Decoding trades the 88 character
//! token stored at the end of the container for the wrapped key, creation
//! registers a fresh key and receives a token to append.

use crate::{Error, Result, cipher, text};
use log::debug;
use regex::Regex;
use reqwest::blocking::Client;
use std::{sync::LazyLock, time::Duration};

/// Endpoint trading an obfuscated key for the wrapped real key.
pub const GET_KEY_URL: &str =
    "http://service.jdownloader.org/dlcrypt/service.php?srcType=dlc&destType=pylo&data=";

/// Endpoint registering a raw key and returning its obfuscated token.
pub const SET_KEY_URL: &str =
    "http://service.jdownloader.org/dlcrypt/service.php?jd=1&srcType=plain&data=";

/// Length of the obfuscated key token appended to every container.
pub const TOKEN_LEN: usize = 88;

static RC_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<rc>([^<]+)</rc>").unwrap());

/// The two message key exchange protocol.
///
/// Implementations must be shareable between threads, decoding several
/// containers at once only shares the service.
pub trait KeyService: Send + Sync {
    /// Trades an obfuscated key token for the base64 text of the wrapped key.
    fn get_key(&self, token: &str) -> Result<String>;

    /// Registers a raw key and returns the token to append to the container.
    /// The key is sent as its [`render_key`] text.
    fn set_key(&self, key: &[u8]) -> Result<String>;
}

/// Text form of a raw key, lowercase hex.
///
/// This is both what gets registered with the service and the 16 byte AES
/// key/IV used for an 8 byte raw key.
pub fn render_key(key: &[u8]) -> String {
    hex::encode(key)
}

/// Extracts the inner text of the first `<rc>` element of a service response.
pub fn parse_response(body: &str) -> Result<String> {
    if body.is_empty() {
        return Err(Error::protocol("got an empty response from the key service"));
    }

    RC_REGEX
        .captures(body)
        .map(|x| x[1].to_owned())
        .ok_or_else(|| Error::protocol(format!("no <rc> token in response '{}'", body)))
}

/// [`KeyService`] talking to the key service over HTTP.
///
/// There is no retry, a failed request fails the whole operation.
#[derive(Clone, Debug)]
pub struct HttpKeyService {
    client: Client,
    get_url: String,
    set_url: String,
}

impl HttpKeyService {
    /// Service with default endpoints and timeout.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> HttpKeyServiceBuilder {
        HttpKeyServiceBuilder::default()
    }

    fn exchange(&self, url: String) -> Result<String> {
        debug!("requesting {}", url);
        let response = self.client.get(url).send()?.error_for_status()?;
        let body = response.text()?;
        parse_response(&body)
    }
}

impl KeyService for HttpKeyService {
    fn get_key(&self, token: &str) -> Result<String> {
        self.exchange(format!("{}{}", self.get_url, token))
    }

    fn set_key(&self, key: &[u8]) -> Result<String> {
        self.exchange(format!("{}{}", self.set_url, render_key(key)))
    }
}

/// Configures a [`HttpKeyService`].
///
/// Values are appended to the endpoint urls without escaping, the service
/// expects the raw base64 text.
#[derive(Clone, Debug)]
pub struct HttpKeyServiceBuilder {
    get_url: String,
    set_url: String,
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpKeyServiceBuilder {
    fn default() -> Self {
        Self {
            get_url: GET_KEY_URL.to_owned(),
            set_url: SET_KEY_URL.to_owned(),
            timeout: Duration::from_secs(30),
            user_agent: None,
        }
    }
}

impl HttpKeyServiceBuilder {
    /// Url prefix the obfuscated key is appended to.
    pub fn get_url(mut self, url: impl Into<String>) -> Self {
        self.get_url = url.into();
        self
    }

    /// Url prefix the rendered raw key is appended to.
    pub fn set_url(mut self, url: impl Into<String>) -> Self {
        self.set_url = url.into();
        self
    }

    /// Upper bound for a whole request, connecting included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<HttpKeyService> {
        let mut client = Client::builder().timeout(self.timeout);

        if let Some(user_agent) = &self.user_agent {
            client = client.user_agent(user_agent);
        }

        Ok(HttpKeyService {
            client: client.build()?,
            get_url: self.get_url,
            set_url: self.set_url,
        })
    }
}

/// Offline [`KeyService`] doing the service's work locally.
///
/// `set_key` wraps the key with the fixed wrapper key and returns its base64
/// text padded to [`TOKEN_LEN`] with dots, `get_key` strips the dots again.
/// No state is kept, any token produced by this service can be traded back.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoopbackKeyService;

impl KeyService for LoopbackKeyService {
    fn get_key(&self, token: &str) -> Result<String> {
        let wrapped = token.trim_end_matches('.');

        if wrapped.is_empty() {
            return Err(Error::protocol("got an empty response from the key service"));
        }

        Ok(wrapped.to_owned())
    }

    fn set_key(&self, key: &[u8]) -> Result<String> {
        let wrapped = text::encode_base64(cipher::wrap_key(render_key(key).as_bytes())?);

        if wrapped.len() > TOKEN_LEN {
            return Err(Error::protocol(format!(
                "wrapped key of {} characters does not fit a token",
                wrapped.len()
            )));
        }

        Ok(format!("{:.<width$}", wrapped, width = TOKEN_LEN))
    }
}
