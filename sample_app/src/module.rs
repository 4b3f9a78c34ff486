//! In-process stand-in for the remote Flux execution module. Receives encoded
//! call messages, dispatches on the function name, and emits either a
//! token-correlated reply or an out-of-band `Error:` notification.

use futures::{SinkExt, StreamExt};
use log::info;

use flux_bridge::codec;
use flux_bridge::conduit::{ConduitMessage, ConduitPair};
use flux_bridge::flux;

pub async fn run(pair: ConduitPair) {
    let ConduitPair {
        mut sink,
        mut source,
    } = pair;
    let mut connected = false;

    while let Some(Ok(msg)) = source.next().await {
        let ConduitMessage::Text(text) = msg else {
            break;
        };
        let reply = handle_call(&text, &mut connected);
        if sink.send(ConduitMessage::Text(reply)).await.is_err() {
            break;
        }
        let _ = sink.flush().await;
    }

    info!("Module conduit ended");
}

fn handle_call(message: &str, connected: &mut bool) -> String {
    let mut fields = message.split(codec::FIELD_SEPARATOR);
    let function = fields.next().unwrap_or_default();
    let Some(token) = fields.next() else {
        return format!("Error:{function} takes 1 parameters");
    };

    info!("Module handling {function} ({token})");

    match function {
        flux::RUNTEST => codec::encode_reply(token, &["0.7.90".to_string()]),
        flux::CONNECT_TO_FLUX => {
            if *connected {
                "Error:connectToFlux: already connected".to_string()
            } else {
                *connected = true;
                codec::encode_reply(token, &["yatta ne!".to_string()])
            }
        }
        flux::DISCONNECT_FROM_FLUX => {
            if !*connected {
                "Error:disconnectFromFlux: not connected".to_string()
            } else {
                *connected = false;
                codec::encode_reply(token, &["owari desu".to_string()])
            }
        }
        other => format!("Error:Unknown function call {other}"),
    }
}
