//! Load callback: publish the runtime handle, declare the interface floor.

use hostlink_sdk::{BridgeResult, HostRuntime, InterfaceVersion};

use crate::handle_cache::HandleCache;

/// Publish `runtime` into `cache` and return the interface revision the
/// module requires.
///
/// The host calls this once, before any other entry point. A second call
/// fails with `AlreadyLoaded` and keeps the first handle.
pub fn on_load<R: HostRuntime>(
    cache: &HandleCache<R>,
    runtime: R,
) -> BridgeResult<InterfaceVersion> {
    cache.publish(runtime)?;
    log::info!(
        "host runtime published; requiring interface {}",
        InterfaceVersion::REQUIRED
    );
    Ok(InterfaceVersion::REQUIRED)
}
