pub use crate::error::{Error, ErrorKind, Result};

pub use log::{debug, warn};
pub use std::format as f;
