//! Ordered option application shared by every client constructor.
//!
//! Each client exposes an option enum. Construction starts from a default
//! config, applies the client's default options and then the caller's options
//! in order. The first option that fails validation aborts construction.

use crate::prelude::*;

/// An option that failed validation, e.g. `failed to set kraken.api_key`
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to set {0}")]
pub struct OptionError(pub &'static str);

/// A configuration step applied to the config `C` of a client under construction
pub trait Configure<C> {
    fn apply(self, config: &mut C) -> Result<(), OptionError>;
}

/// Apply `defaults` and then `opts` to a fresh `C`.
pub fn apply_options<C, O>(defaults: Vec<O>, opts: impl IntoIterator<Item = O>) -> Result<C>
where
    C: Default,
    O: Configure<C>,
{
    let mut config = C::default();

    for opt in defaults.into_iter().chain(opts) {
        if let Err(err) = opt.apply(&mut config) {
            warn!("rejected client option: {err}");
            return Err(Error::Internal(f!("failed to apply option: {err}")));
        }
    }

    Ok(config)
}

/// Reject an empty string option.
pub(crate) fn non_empty(value: String, name: &'static str) -> Result<String, OptionError> {
    if value.is_empty() {
        return Err(OptionError(name));
    }
    Ok(value)
}

/// Reject a URL option that does not parse.
pub(crate) fn valid_url(value: String, name: &'static str) -> Result<String, OptionError> {
    reqwest::Url::parse(&value).map_err(|_| OptionError(name))?;
    Ok(value)
}
