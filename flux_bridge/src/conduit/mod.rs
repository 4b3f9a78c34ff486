use futures::{Sink, SinkExt, Stream, StreamExt, channel::mpsc};
use log::{error, info};
use ractor::{Actor, ActorRef};
use std::pin::Pin;

use crate::bridge::{
    BridgeActor, BridgeActorArgs, BridgeMessage, BridgeResult, TransportErrorMessage,
};

// -------------------------------------------------------------------------------------------------------

/// The transport primitive is fire-and-forget string passing in both
/// directions; this wire format is text-only.
pub enum ConduitMessage {
    Text(String),
    Close(Option<String>),
}

pub type ConduitError = anyhow::Error;

pub type ConduitSink = Pin<Box<dyn Sink<ConduitMessage, Error = ConduitError> + Send>>;
pub type ConduitSource = Pin<Box<dyn Stream<Item = Result<ConduitMessage, ConduitError>> + Send>>;

/// One endpoint of a bidirectional conduit.
pub struct ConduitPair {
    pub sink: ConduitSink,
    pub source: ConduitSource,
}

// -------------------------------------------------------------------------------------------------------

/// Spawns a bridge actor over the given sink, plus a detached receive loop
/// feeding the source into it.
pub async fn from_sink_source(
    identifier: String,
    sink: ConduitSink,
    source: ConduitSource,
    on_transport_error: Option<ActorRef<TransportErrorMessage>>,
) -> BridgeResult<ActorRef<BridgeMessage>> {
    let (bridge_ref, _handle) = Actor::spawn(
        None,
        BridgeActor,
        BridgeActorArgs {
            identifier: identifier.clone(),
            sender: sink,
            on_transport_error,
        },
    )
    .await?;

    tokio::spawn(receive_loop(source, identifier, bridge_ref.clone()));

    Ok(bridge_ref)
}

pub async fn receive_loop(
    mut source: ConduitSource,
    identifier: String,
    bridge: ActorRef<BridgeMessage>,
) {
    // Process incoming messages, one at a time, in delivery order
    while let Some(msg) = source.next().await {
        match msg {
            Ok(ConduitMessage::Text(text)) => {
                if let Err(err) = bridge.cast(BridgeMessage::Inbound(text)) {
                    error!("Error forwarding inbound message to bridge: {err}");
                    break;
                }
            }
            Ok(ConduitMessage::Close(reason)) => {
                info!("Conduit with {identifier} closed because of reason: {reason:?}");
                break;
            }
            Err(e) => {
                error!("Error receiving message from {identifier}: {e}");
                break;
            }
        }
    }

    info!("Conduit with {identifier} ended");
    let _ = bridge.cast(BridgeMessage::Close);
}

// -------------------------------------------------------------------------------------------------------

/// An in-process bidirectional conduit: what one endpoint sends, the other
/// receives. Used by tests and the sample app to stand in for the real
/// UI <-> module channel.
pub fn duplex(buffer: usize) -> (ConduitPair, ConduitPair) {
    let (tx_a, rx_a) = mpsc::channel::<ConduitMessage>(buffer);
    let (tx_b, rx_b) = mpsc::channel::<ConduitMessage>(buffer);

    let sink_a: ConduitSink = Box::pin(tx_a.sink_map_err(|e| anyhow::Error::msg(e.to_string())));
    let source_a: ConduitSource = Box::pin(rx_b.map(Ok));

    let sink_b: ConduitSink = Box::pin(tx_b.sink_map_err(|e| anyhow::Error::msg(e.to_string())));
    let source_b: ConduitSource = Box::pin(rx_a.map(Ok));

    (
        ConduitPair {
            sink: sink_a,
            source: source_a,
        },
        ConduitPair {
            sink: sink_b,
            source: source_b,
        },
    )
}
