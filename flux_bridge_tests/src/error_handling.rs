use std::sync::{Arc, Mutex};

use flux_bridge::bridge::Bridge;
use flux_bridge::codec;
use flux_bridge::conduit::{self, ConduitMessage, ConduitPair};
use flux_bridge::flux;

use futures::SinkExt;

use crate::common;

/// An `Error:` message is uncorrelated: it reaches the diagnostic sink,
/// invokes no callback, and the pending call it cannot be matched to is
/// still resolvable by a later proper reply.
#[tokio::test]
pub async fn test_error_notification_invokes_no_callback() -> anyhow::Result<()> {
    let (ui_side, remote) = conduit::duplex(100);
    let (collector, texts) = common::start_collector().await?;
    let bridge = conduit::from_sink_source(
        "flux module".to_string(),
        ui_side.sink,
        ui_side.source,
        Some(collector),
    )
    .await?;

    let invoked = Arc::new(Mutex::new(Vec::new()));
    let invoked_copy = invoked.clone();
    bridge.dispatch(flux::RUNTEST, Vec::new(), move |fields| {
        invoked_copy.lock().unwrap().extend(fields);
    })?;

    let ConduitPair {
        mut sink,
        mut source,
    } = remote;
    assert_eq!(common::next_text(&mut source).await, "runtest\u{0001}runtest0");

    sink.send(ConduitMessage::Text("Error:Module crashed".to_string()))
        .await?;
    sink.flush().await?;

    assert!(
        common::wait_until(|| texts.lock().unwrap().iter().any(|t| t == "Module crashed")).await
    );
    assert!(invoked.lock().unwrap().is_empty());

    // the router is still alive; the real reply resolves the call
    sink.send(ConduitMessage::Text(codec::encode_reply(
        "runtest0",
        &["0.7.90".to_string()],
    )))
    .await?;
    sink.flush().await?;

    assert!(common::wait_until(|| !invoked.lock().unwrap().is_empty()).await);
    assert_eq!(*invoked.lock().unwrap(), vec!["0.7.90".to_string()]);

    Ok(())
}

/// A reply whose token matches nothing is logged and dropped; the next
/// message is processed normally.
#[tokio::test]
pub async fn test_unmatched_reply_is_dropped() -> anyhow::Result<()> {
    let (ui_side, remote) = conduit::duplex(100);
    let (collector, texts) = common::start_collector().await?;
    let bridge = conduit::from_sink_source(
        "flux module".to_string(),
        ui_side.sink,
        ui_side.source,
        Some(collector),
    )
    .await?;

    let ConduitPair {
        mut sink,
        mut source,
    } = remote;

    sink.send(ConduitMessage::Text("bogus7\u{0001}X".to_string()))
        .await?;
    sink.flush().await?;

    assert!(
        common::wait_until(|| {
            texts
                .lock()
                .unwrap()
                .iter()
                .any(|t| t == "Bad message bogus7 received from remote module.")
        })
        .await
    );

    // subsequent calls round-trip fine
    let invoked = Arc::new(Mutex::new(Vec::new()));
    let invoked_copy = invoked.clone();
    bridge.dispatch(flux::RUNTEST, Vec::new(), move |fields| {
        invoked_copy.lock().unwrap().extend(fields);
    })?;

    assert_eq!(common::next_text(&mut source).await, "runtest\u{0001}runtest0");
    sink.send(ConduitMessage::Text(codec::encode_reply(
        "runtest0",
        &["ok".to_string()],
    )))
    .await?;
    sink.flush().await?;

    assert!(common::wait_until(|| !invoked.lock().unwrap().is_empty()).await);
    assert_eq!(*invoked.lock().unwrap(), vec!["ok".to_string()]);

    Ok(())
}

/// A message with no separator at all fails the token lookup and is treated
/// exactly like an unmatched reply.
#[tokio::test]
pub async fn test_malformed_message_is_treated_as_unmatched() -> anyhow::Result<()> {
    let (ui_side, remote) = conduit::duplex(100);
    let (collector, texts) = common::start_collector().await?;
    let _bridge = conduit::from_sink_source(
        "flux module".to_string(),
        ui_side.sink,
        ui_side.source,
        Some(collector),
    )
    .await?;

    let ConduitPair { mut sink, .. } = remote;
    sink.send(ConduitMessage::Text("garbage".to_string())).await?;
    sink.flush().await?;

    assert!(
        common::wait_until(|| {
            texts
                .lock()
                .unwrap()
                .iter()
                .any(|t| t == "Bad message garbage received from remote module.")
        })
        .await
    );

    Ok(())
}
