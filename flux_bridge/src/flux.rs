//! Named call sites of the Flux module. Thin, typed wrappers over
//! [`Bridge::dispatch`]; the reply arity and meaning of each is specific to the
//! call site and opaque to the bridge core.

use ractor::ActorRef;

use crate::bridge::{Bridge, BridgeMessage, BridgeResult};

// -------------------------------------------------------------------------------------------------------

pub const CONNECT_TO_FLUX: &str = "connectToFlux";
pub const DISCONNECT_FROM_FLUX: &str = "disconnectFromFlux";
pub const RUNTEST: &str = "runtest";

fn first_field(fields: Vec<String>) -> String {
    fields.into_iter().next().unwrap_or_default()
}

// -------------------------------------------------------------------------------------------------------

/// Connect to the Flux cluster. `done` receives the connection status text.
pub fn connect_to_flux<F>(bridge: &ActorRef<BridgeMessage>, done: F) -> BridgeResult<()>
where
    F: FnOnce(String) + Send + 'static,
{
    bridge.dispatch(CONNECT_TO_FLUX, Vec::new(), move |fields| {
        done(first_field(fields))
    })
}

/// Disconnect from the Flux cluster. `done` receives the connection status text.
pub fn disconnect_from_flux<F>(bridge: &ActorRef<BridgeMessage>, done: F) -> BridgeResult<()>
where
    F: FnOnce(String) + Send + 'static,
{
    bridge.dispatch(DISCONNECT_FROM_FLUX, Vec::new(), move |fields| {
        done(first_field(fields))
    })
}

/// Diagnostic call. `done` receives the module's test result text.
pub fn runtest<F>(bridge: &ActorRef<BridgeMessage>, done: F) -> BridgeResult<()>
where
    F: FnOnce(String) + Send + 'static,
{
    bridge.dispatch(RUNTEST, Vec::new(), move |fields| done(first_field(fields)))
}
