//! The container pipeline, both directions.
//!
//! ```text
//! container = base64(aes(base64(markup), key = iv = real_iv)) + token
//! real_iv   = aes_decrypt(base64_decode(get_key(token)), WRAPPER_KEY, WRAPPER_IV)
//! ```

use crate::{
    Error, Result, cipher,
    model::{Container, File, Header},
    service::{KeyService, TOKEN_LEN, render_key},
    text,
};
use log::debug;

/// Length of the raw key generated for a new container.
pub const RAW_KEY_LEN: usize = 8;

/// Decrypts a container into its markup.
///
/// Fails before contacting the key service if `raw` is not longer than the
/// trailing key token.
pub fn decrypt(raw: &str, service: &dyn KeyService) -> Result<String> {
    let chars = raw.chars().count();

    if chars <= TOKEN_LEN {
        return Err(Error::format(format!(
            "expected more than {} characters but found {}",
            TOKEN_LEN, chars
        )));
    }

    let split = raw
        .char_indices()
        .nth(chars - TOKEN_LEN)
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    let (body, token) = raw.split_at(split);

    debug!("requesting key for token {}", token);
    let wrapped_key = text::decode_base64(&service.get_key(token)?);
    let real_iv = cipher::unwrap_key(&wrapped_key)?;

    if real_iv.len() != cipher::BLOCK_SIZE {
        return Err(Error::decryption(format!(
            "expected {} byte key from the key service but found {} bytes",
            cipher::BLOCK_SIZE,
            real_iv.len()
        )));
    }

    debug!("decrypting {} characters of container body", body.len());
    let inner = cipher::decrypt(&text::decode_base64(body), &real_iv, &real_iv)?;
    let markup = text::bytes_to_text(&text::decode_base64(&text::bytes_to_text(&inner)));
    Ok(markup)
}

/// Encrypts markup into a container, registering a fresh key.
pub fn encrypt(markup: &str, service: &dyn KeyService) -> Result<String> {
    let mut raw_key = [0u8; RAW_KEY_LEN];
    getrandom::getrandom(&mut raw_key).map_err(key_generation_failed)?;

    debug!("registering new container key");
    let token = service.set_key(&raw_key)?;
    let key = text::text_to_bytes(&render_key(&raw_key));

    let inner = text::text_to_bytes(&text::encode_base64(text::text_to_bytes(markup)));
    let encrypted = cipher::encrypt(&inner, &key, &key)?;
    Ok(text::encode_base64(encrypted) + &token)
}

/// Decrypts and parses a container.
pub fn decode(raw: &str, service: &dyn KeyService) -> Result<Container> {
    let markup = decrypt(raw, service)?;
    Container::from_markup(&markup)
}

/// Creates a container holding `files` in a single package.
///
/// See [`crate::Package::new`] for how empty names and comments are filled.
pub fn encode(
    files: &[File],
    header: &Header,
    package_name: &str,
    comment: &str,
    service: &dyn KeyService,
) -> Result<String> {
    Container::new(header.clone(), package_name, comment, files.to_vec()).encode(service)
}

fn key_generation_failed(error: getrandom::Error) -> Error {
    Error::decryption(format!(
        "cannot generate container key, system random source failed ({})",
        error
    ))
}

impl Container {
    /// Same as [`decode`].
    pub fn decode(raw: &str, service: &dyn KeyService) -> Result<Self> {
        decode(raw, service)
    }

    /// Encrypts this container as is, keeping its header and package fields.
    ///
    /// Fails before contacting the key service if the package has no files.
    pub fn encode(&self, service: &dyn KeyService) -> Result<String> {
        if self.files().is_empty() {
            return Err(Error::format("cannot create a container without files"));
        }

        encrypt(&self.to_markup()?, service)
    }

    /// Creates a container from plain links with the [`Header::generated`]
    /// header. File names are taken from the last path segment of each link.
    pub fn create_from_links<T: AsRef<str>>(
        links: &[T],
        package_name: &str,
        comment: &str,
        service: &dyn KeyService,
    ) -> Result<String> {
        let files = links
            .iter()
            .map(|x| File::from_link(x.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        encode(&files, &Header::generated(), package_name, comment, service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation_failure() {
        let error = key_generation_failed(getrandom::Error::UNSUPPORTED);
        assert!(error.is_decryption());
        assert!(error.to_string().contains("cannot generate container key"));
    }
}
