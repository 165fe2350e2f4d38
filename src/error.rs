use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {component} configuration: {reason}")]
    Config { component: &'static str, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Error {
    pub fn config(component: &'static str, reason: impl Into<String>) -> Self {
        Error::Config { component, reason: reason.into() }
    }
}

/// Fail with a named configuration error unless `cond` holds.
#[inline]
pub(crate) fn config_check(cond: bool, component: &'static str, reason: &str) -> Result<()> {
    if cond { Ok(()) } else { Err(Error::config(component, reason)) }
}

pub type Result<T> = std::result::Result<T, Error>;
