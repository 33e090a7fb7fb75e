//! Crate-internal helpers.

mod private_file;

pub(crate) use private_file::{WriteMode, remove_if_exists, write_private};
