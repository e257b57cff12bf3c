//! End-to-end pipeline tests over an injected in-memory source.
//!
//! These tests feed synthetic byte buffers through the full path —
//! validate, decode, window update, anomaly evaluation — without a live
//! socket.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use futures::StreamExt;
use skywatch::{
    Decoded, MonitorConfig, NavControllerOutput, QueueSender, QueueSource, Skywatch,
};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

/// Wrap a payload in a v2 frame the way the wire does: marker byte,
/// declared length at byte 2, 24-bit little-endian message id at bytes 6-8,
/// payload at byte 12, two zero checksum bytes.
fn encode_frame(msg_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 12 + payload.len() + 2];
    frame[0] = 0xFD;
    frame[2] = payload.len() as u8;
    frame[6] = (msg_id & 0xFF) as u8;
    frame[7] = ((msg_id >> 8) & 0xFF) as u8;
    frame[8] = ((msg_id >> 16) & 0xFF) as u8;
    frame[12..12 + payload.len()].copy_from_slice(payload);
    frame
}

fn nav_frame(wp_dist: u16) -> Vec<u8> {
    let mut payload = vec![0u8; 26];
    payload[12..14].copy_from_slice(&wp_dist.to_le_bytes());
    encode_frame(62, &payload)
}

fn test_config() -> MonitorConfig {
    MonitorConfig { window_capacity: 100, spread_threshold: 10_000, ..MonitorConfig::default() }
}

async fn feed(sender: &QueueSender, frame: Vec<u8>) {
    assert!(sender.send(frame).await, "pipeline must still be consuming");
}

#[tokio::test]
async fn decodes_nav_messages_end_to_end() -> Result<()> {
    let (sender, source) = QueueSource::channel(16);
    let monitor = Skywatch::attach(source, test_config())?;
    let mut messages = monitor.messages();

    for wp_dist in [100u16, 250, 1000] {
        feed(&sender, nav_frame(wp_dist)).await;
        let decoded = timeout(WAIT, messages.next())
            .await
            .with_context(|| format!("waiting for wp_dist {wp_dist}"))?
            .context("message stream ended early")?;
        match decoded.as_ref() {
            Decoded::NavControllerOutput(nav) => assert_eq!(nav.wp_dist, wp_dist),
            other => panic!("expected NAV_CONTROLLER_OUTPUT, got {other:?}"),
        }
    }

    let stats = monitor.stats();
    assert_eq!(stats.messages_decoded, 3);
    ensure!(stats.discarded() == 0, "clean feed must discard nothing: {stats:?}");
    Ok(())
}

#[tokio::test]
async fn large_spread_raises_an_anomaly_event() {
    let (sender, source) = QueueSource::channel(16);
    let monitor = Skywatch::attach(source, test_config()).expect("valid config");

    // Subscribe before feeding so no event is missed
    let mut anomalies = monitor.anomalies();
    let mut messages = monitor.messages();

    for wp_dist in [100u16, 200, 50, 15_000] {
        feed(&sender, nav_frame(wp_dist)).await;
        timeout(WAIT, messages.next()).await.expect("message within deadline");
    }

    let event = timeout(WAIT, anomalies.next())
        .await
        .expect("anomaly within deadline")
        .expect("stream still open");
    assert_eq!(event.spread, 14_950);
    assert_eq!(event.min, 50);
    assert_eq!(event.max, 15_000);
    assert_eq!(event.recent, vec![100, 200, 50, 15_000]);
    assert_eq!(monitor.stats().anomalies_emitted, 1);
}

#[tokio::test]
async fn malformed_datagrams_are_discarded_silently() -> Result<()> {
    let (sender, source) = QueueSource::channel(16);
    let monitor = Skywatch::attach(source, test_config())?;
    let mut messages = monitor.messages();

    // Too short, wrong marker, truncated payload, undersized payload
    feed(&sender, vec![0xFD, 0x01]).await;
    feed(&sender, vec![0xFE; 40]).await;
    let mut truncated = nav_frame(77);
    truncated.truncate(20);
    feed(&sender, truncated).await;
    feed(&sender, encode_frame(62, &[0u8; 10])).await;

    // A healthy frame still gets through after all of that
    feed(&sender, nav_frame(42)).await;
    let decoded = timeout(WAIT, messages.next())
        .await
        .context("waiting for the healthy frame")?
        .context("message stream ended early")?;
    match decoded.as_ref() {
        Decoded::NavControllerOutput(nav) => assert_eq!(nav.wp_dist, 42),
        other => panic!("expected NAV_CONTROLLER_OUTPUT, got {other:?}"),
    }

    let stats = monitor.stats();
    assert_eq!(stats.datagrams_received, 5);
    assert_eq!(stats.frames_too_short, 1);
    assert_eq!(stats.frames_bad_marker, 1);
    assert_eq!(stats.frames_truncated, 1);
    assert_eq!(stats.payloads_too_small, 1);
    assert_eq!(stats.messages_decoded, 1);
    Ok(())
}

#[tokio::test]
async fn unhandled_messages_never_feed_the_detector() {
    let (sender, source) = QueueSource::channel(16);
    let config = MonitorConfig { spread_threshold: 0, ..test_config() };
    let monitor = Skywatch::attach(source, config).expect("valid config");
    let mut messages = monitor.messages();

    // Unknown ids carrying wildly varying bytes: decoder must classify them
    // Unhandled without touching the window
    for filler in [0x00u8, 0xFF] {
        feed(&sender, encode_frame(0, &[filler; 9])).await;
        feed(&sender, encode_frame(253, &[filler; 51])).await;
    }

    // Two identical nav frames: spread 0, never above any threshold
    feed(&sender, nav_frame(500)).await;
    feed(&sender, nav_frame(500)).await;
    timeout(WAIT, messages.next()).await.expect("message within deadline");

    let stats = wait_for(&monitor, |s| s.datagrams_received == 6).await;
    assert_eq!(stats.messages_unhandled, 4);
    assert_eq!(stats.messages_decoded, 2);
    assert_eq!(stats.anomalies_emitted, 0);
}

#[tokio::test]
async fn other_message_types_flow_to_subscribers() {
    let (sender, source) = QueueSource::channel(16);
    let monitor = Skywatch::attach(source, test_config()).expect("valid config");
    let mut messages = monitor.messages();

    // VFR_HUD with airspeed 18.5 m/s
    let mut payload = vec![0u8; 20];
    payload[0..4].copy_from_slice(&18.5f32.to_le_bytes());
    feed(&sender, encode_frame(74, &payload)).await;

    let decoded = timeout(WAIT, messages.next())
        .await
        .expect("message within deadline")
        .expect("stream still open");
    match decoded.as_ref() {
        Decoded::VfrHud(hud) => assert_eq!(hud.airspeed, 18.5),
        other => panic!("expected VFR_HUD, got {other:?}"),
    }
}

#[tokio::test]
async fn nav_updates_filters_other_messages() {
    let (sender, source) = QueueSource::channel(16);
    let monitor = Skywatch::attach(source, test_config()).expect("valid config");
    let mut nav_updates = monitor.nav_updates();

    feed(&sender, encode_frame(74, &vec![0u8; 20])).await;
    feed(&sender, nav_frame(900)).await;

    let nav: NavControllerOutput = timeout(WAIT, nav_updates.next())
        .await
        .expect("nav update within deadline")
        .expect("stream still open");
    assert_eq!(nav.wp_dist, 900);
}

#[tokio::test]
async fn exhausted_source_ends_the_message_stream() {
    let (sender, source) = QueueSource::channel(16);
    let monitor = Skywatch::attach(source, test_config()).expect("valid config");
    let mut messages = monitor.messages();

    feed(&sender, nav_frame(10)).await;
    timeout(WAIT, messages.next()).await.expect("message within deadline");

    drop(sender);
    let end = timeout(WAIT, messages.next()).await.expect("stream end within deadline");
    assert!(end.is_none(), "stream must terminate once the source is exhausted");
}

#[tokio::test]
async fn shutdown_stops_the_pipeline() {
    let (sender, source) = QueueSource::channel(16);
    let monitor = Skywatch::attach(source, test_config()).expect("valid config");
    let mut messages = monitor.messages();

    feed(&sender, nav_frame(10)).await;
    timeout(WAIT, messages.next()).await.expect("message within deadline");

    monitor.shutdown();
    let end = timeout(WAIT, messages.next()).await.expect("stream end within deadline");
    assert!(end.is_none(), "stream must terminate after shutdown");

    // The pipeline is gone; the queue eventually refuses new datagrams
    timeout(WAIT, async {
        while sender.send(nav_frame(11)).await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("sender must observe pipeline shutdown");
}

#[tokio::test]
async fn rejects_invalid_configuration() {
    let (_sender, source) = QueueSource::channel(16);
    let config = MonitorConfig { window_capacity: 1, ..MonitorConfig::default() };
    let err = Skywatch::attach(source, config).expect_err("capacity 1 must be rejected");
    assert!(err.to_string().contains("window_capacity"));
}

/// Poll stats until a condition holds; the pipeline runs in its own task,
/// so counters trail the sends slightly.
async fn wait_for(
    monitor: &skywatch::Monitor,
    condition: impl Fn(&skywatch::StatsSnapshot) -> bool,
) -> skywatch::StatsSnapshot {
    timeout(WAIT, async {
        loop {
            let stats = monitor.stats();
            if condition(&stats) {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("stats condition within deadline")
}
