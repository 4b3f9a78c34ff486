use anyhow::anyhow;
use futures::SinkExt;
use futures::channel::oneshot;
use log::{error, info, warn};
use ractor::{Actor, ActorProcessingErr, ActorRef, async_trait};

use crate::{
    codec::{self, Inbound},
    conduit::{ConduitMessage, ConduitSink},
    registry::{CallRegistry, ReplyCallback},
};

// -------------------------------------------------------------------------------------------------------

pub type BridgeResult<T> = Result<T, anyhow::Error>;

/// Diagnostic forwarded to the optional transport-error sink: out-of-band
/// error text from the remote module, or a synthesized note about an inbound
/// reply that matched no pending call.
#[derive(Debug, Clone)]
pub struct TransportErrorMessage {
    pub text: String,
}

// -------------------------------------------------------------------------------------------------------

// Messages for the bridge actor
pub enum BridgeMessage {
    /// Dispatch a named call: register the callback, encode, transmit.
    Call(String, Vec<String>, ReplyCallback),

    /// One raw message received from the remote module.
    Inbound(String),

    /// Stop the bridge. Callbacks still pending are dropped uninvoked.
    Close,
}

// -------------------------------------------------------------------------------------------------------

/// wrap the `ActorRef<BridgeMessage>` in a more user-friendly interface
#[async_trait]
pub trait Bridge {
    /// Fire-and-forget named call. `callback` receives the ordered reply
    /// fields if and when the reply arrives; a lost reply means the callback
    /// is simply never invoked, and its registry entry stays pending for the
    /// lifetime of the bridge.
    fn dispatch<F>(&self, function: &str, args: Vec<String>, callback: F) -> BridgeResult<()>
    where
        F: FnOnce(Vec<String>) + Send + 'static;

    /// Convenience wrapper that awaits the reply fields. There is no timeout:
    /// if the remote module never answers, this pends until the bridge stops.
    async fn ask(&self, function: &str, args: Vec<String>) -> BridgeResult<Vec<String>>;
}

#[async_trait]
impl Bridge for ActorRef<BridgeMessage> {
    fn dispatch<F>(&self, function: &str, args: Vec<String>, callback: F) -> BridgeResult<()>
    where
        F: FnOnce(Vec<String>) + Send + 'static,
    {
        self.send_message(BridgeMessage::Call(
            function.to_string(),
            args,
            Box::new(callback),
        ))
        .map_err(|err| anyhow!("failed to hand call '{function}' to the bridge: {err}"))
    }

    async fn ask(&self, function: &str, args: Vec<String>) -> BridgeResult<Vec<String>> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(function, args, move |fields| {
            let _ = tx.send(fields);
        })?;

        rx.await
            .map_err(|_| anyhow!("bridge stopped before a reply to '{function}' arrived"))
    }
}

// Bridge actor
// -------------------------------------------------------------------------------------------------------

pub struct BridgeActor;

pub struct BridgeActorState {
    args: BridgeActorArgs,
    registry: CallRegistry,
}

pub struct BridgeActorArgs {
    pub identifier: String,
    pub sender: ConduitSink,
    pub on_transport_error: Option<ActorRef<TransportErrorMessage>>,
}

impl BridgeActorState {
    fn forward_diagnostic(&self, text: String) {
        if let Some(sink) = &self.args.on_transport_error {
            if let Err(err) = sink.send_message(TransportErrorMessage { text }) {
                warn!("Failed to forward diagnostic to error sink: {err}");
            }
        }
    }
}

// Bridge actor implementation
#[async_trait]
impl Actor for BridgeActor {
    type Msg = BridgeMessage;
    type State = BridgeActorState;
    type Arguments = BridgeActorArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!("Bridge to {} started", args.identifier);
        Ok(BridgeActorState {
            args,
            registry: CallRegistry::new(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            BridgeMessage::Call(function, args, callback) => {
                let token = state.registry.register(&function, callback);
                let message = codec::encode_call(&function, &token, &args);

                info!("Dispatching {} to {}", token, state.args.identifier);
                state
                    .args
                    .sender
                    .send(ConduitMessage::Text(message))
                    .await?;
                state.args.sender.flush().await?;
            }

            BridgeMessage::Inbound(text) => match codec::decode_inbound(&text) {
                Inbound::ErrorNotification(text) => {
                    // uncorrelated: there is no way to know which pending
                    // call, if any, the remote error relates to
                    error!("Remote error from {}: {}", state.args.identifier, text);
                    state.forward_diagnostic(text);
                }

                Inbound::Reply { token, fields } => match state.registry.resolve(&token) {
                    Some(callback) => {
                        info!(
                            "Reply for {} from {} ({} fields)",
                            token,
                            state.args.identifier,
                            fields.len()
                        );
                        callback(fields);
                    }
                    None => {
                        let text = format!("Bad message {token} received from remote module.");
                        warn!("{} (from {})", text, state.args.identifier);
                        state.forward_diagnostic(text);
                    }
                },
            },

            BridgeMessage::Close => {
                info!(
                    "Closing bridge to {} ({} calls still pending)",
                    state.args.identifier,
                    state.registry.pending_calls()
                );
                myself.stop(Some("Bridge closed".into()));
            }
        }
        Ok(())
    }
}
