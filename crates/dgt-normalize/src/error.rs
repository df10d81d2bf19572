use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Serial number, protocol, or capacity could not be resolved. Fatal for
    /// the device; everything else degrades into unreadable fields.
    #[error("identity unresolved for {device}: missing {missing:?}")]
    IdentityUnresolved {
        device: String,
        missing: Vec<&'static str>,
    },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
