use std::io;

use tokio::runtime::{Builder, Runtime};

/// Builds the single-threaded runtime a [`Link`][crate::Link] drives its connection on.
///
/// Nothing is ever spawned onto it; every call blocks on exactly one driver future.
pub(crate) fn current_thread() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}
