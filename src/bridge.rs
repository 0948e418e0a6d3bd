//! Running async provider lookups from synchronous fills.

use std::future::Future;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;

use crate::error::FillfigError;

/// Drive `future` to completion from synchronous code.
///
/// Inside a multi-threaded Tokio runtime the current worker is handed over
/// with `block_in_place` and the future runs on the ambient runtime. Outside
/// any runtime a private current-thread runtime is built for the call. A
/// current-thread runtime cannot be blocked from within and yields
/// [`FillfigError::BlockingBridge`]; use the async fill there instead.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, FillfigError> {
    match Handle::try_current() {
        Ok(handle) => {
            if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
                return Err(FillfigError::BlockingBridge(
                    "cannot block inside a current-thread runtime".into(),
                ));
            }
            Ok(task::block_in_place(|| handle.block_on(future)))
        }
        Err(_) => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FillfigError::BlockingBridge(e.to_string()))
            .map(|runtime| runtime.block_on(future)),
    }
}
