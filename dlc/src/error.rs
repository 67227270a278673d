use thiserror::Error;

/// The error type returned by container operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input is too short, a field holds an invalid value or the decrypted
    /// markup is not a well formed container.
    #[error("invalid container: {0}")]
    Format(String),

    /// The key service request could not complete (unreachable, timed out or
    /// answered with a non-success status).
    #[error("key service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The key service answered but the body did not carry a `<rc>` token.
    #[error("invalid key service response: {0}")]
    Protocol(String),

    /// A cipher operation could not run: input is not block aligned, the key
    /// material has a wrong size or, when creating a container, no random key
    /// could be drawn from the system random source.
    #[error("cipher operation failed: {0}")]
    Decryption(String),
}

impl Error {
    pub(crate) fn format<T: Into<String>>(reason: T) -> Self {
        Self::Format(reason.into())
    }

    pub(crate) fn protocol<T: Into<String>>(reason: T) -> Self {
        Self::Protocol(reason.into())
    }

    pub(crate) fn decryption<T: Into<String>>(reason: T) -> Self {
        Self::Decryption(reason.into())
    }

    /// Returns true if the error is a format error.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// Returns true if the error is a transport error.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if the error is a protocol error.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// Returns true if the error is a decryption error.
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::Decryption(_))
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(error: quick_xml::DeError) -> Self {
        Self::Format(format!("cannot parse markup ({error})"))
    }
}
