//! Frame ingestion from the external classifier
//!
//! One message is one camera frame. Accepted forms:
//! - JSON: `{"label":"play","confidence":0.92}`; a missing or null label means no hand
//! - `k=v` tokens: `label=play conf=0.92`
//! - `none` or `-`: no hand this frame

use crate::error::IngestError;
use crate::types::{Frame, Prediction};
use anyhow::{Context, Result};
use crossbeam_channel::{Sender, TrySendError};
use serde::Deserialize;
use std::io::BufRead;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

#[derive(Debug, Clone, Deserialize)]
struct JsonFrameMsg {
    #[serde(default, alias = "gesture")]
    label: Option<String>,
    #[serde(default, alias = "conf")]
    confidence: Option<f32>,
}

pub fn udp_frame_addr_from_env() -> Option<SocketAddr> {
    let raw = std::env::var("CALIRA_UDP_ADDR").ok()?;
    raw.parse::<SocketAddr>().ok()
}

pub fn parse_frame_message(msg: &str) -> Result<Frame, IngestError> {
    let msg = msg.trim();
    if msg.is_empty() {
        return Err(IngestError::Empty);
    }

    if msg.eq_ignore_ascii_case("none") || msg == "-" {
        return Ok(None);
    }

    if msg.starts_with('{') {
        let j = serde_json::from_str::<JsonFrameMsg>(msg)
            .map_err(|_| IngestError::Malformed(msg.to_string()))?;
        return Ok(j
            .label
            .filter(|label| !label.is_empty())
            .map(|label| prediction(label, j.confidence)));
    }

    let mut label: Option<String> = None;
    let mut confidence: Option<f32> = None;

    for tok in msg.split_whitespace() {
        let (k, v) = tok
            .split_once('=')
            .ok_or_else(|| IngestError::Malformed(msg.to_string()))?;
        match k {
            "label" | "gesture" => label = Some(v.to_string()),
            "conf" | "confidence" => {
                confidence = Some(v.parse().map_err(|_| IngestError::BadConfidence(v.to_string()))?)
            }
            _ => {}
        }
    }

    let label = label.ok_or_else(|| IngestError::Malformed(msg.to_string()))?;
    if label.is_empty() {
        // Same as a null JSON label
        return Ok(None);
    }
    Ok(Some(prediction(label, confidence)))
}

fn prediction(label: String, confidence: Option<f32>) -> Prediction {
    // Missing confidence means the sender already gated it.
    let confidence = confidence.unwrap_or(1.0);
    let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
    Prediction { label, confidence }
}

/// Listen for frame datagrams on `bind_addr` and forward them to `frames`.
///
/// Never blocks the runtime: when `frames` is full the datagram is dropped.
/// The task ends when the receiving side of `frames` is dropped.
pub async fn spawn_udp_listener(
    bind_addr: SocketAddr,
    frames: Sender<Frame>,
) -> Result<tokio::task::JoinHandle<()>> {
    let sock = UdpSocket::bind(bind_addr)
        .await
        .with_context(|| format!("bind UDP frame listener on {bind_addr}"))?;
    log::info!("UDP frame listener bound on {bind_addr}");

    Ok(tokio::spawn(async move {
        let mut buf = [0u8; 2048];
        loop {
            let (len, src) = match sock.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("UDP frame recv error: {e}");
                    continue;
                }
            };

            let Ok(s) = std::str::from_utf8(&buf[..len]) else {
                log::debug!("Dropping non-UTF-8 datagram from {src}");
                continue;
            };

            match parse_frame_message(s) {
                Ok(frame) => {
                    if !forward_frame(&frames, frame) {
                        log::debug!("Frame consumer gone, stopping UDP listener");
                        break;
                    }
                }
                Err(e) => log::debug!("Skipping message from {src}: {e}"),
            }
        }
    }))
}

/// Non-blocking hand-off. Returns `false` once the consumer is gone.
fn forward_frame(frames: &Sender<Frame>, frame: Frame) -> bool {
    match frames.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            log::debug!("Frame queue full, dropping frame");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

/// Read one frame per line from stdin on a dedicated thread
pub fn spawn_stdin_reader(frames: Sender<Frame>) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("calira-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::warn!("stdin read error: {e}");
                        break;
                    }
                };
                match parse_frame_message(&line) {
                    Ok(frame) => {
                        if frames.send(frame).is_err() {
                            break;
                        }
                    }
                    Err(e) => log::debug!("Skipping line: {e}"),
                }
            }
            log::info!("stdin closed, no more frames");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_frame() {
        let frame = parse_frame_message(r#"{"label":"play","confidence":0.92}"#)
            .expect("parse")
            .expect("hand present");
        assert_eq!(frame.label, "play");
        assert!((frame.confidence - 0.92).abs() < 1e-6);
    }

    #[test]
    fn json_without_label_is_no_hand() {
        assert_eq!(parse_frame_message(r#"{"label":null}"#), Ok(None));
        assert_eq!(parse_frame_message("{}"), Ok(None));
    }

    #[test]
    fn parse_kv_frame() {
        let frame = parse_frame_message("label=volume_50 conf=1.7").unwrap().unwrap();
        assert_eq!(frame.label, "volume_50");
        assert_eq!(frame.confidence, 1.0);
    }

    #[test]
    fn no_hand_markers() {
        assert_eq!(parse_frame_message("none"), Ok(None));
        assert_eq!(parse_frame_message(" - "), Ok(None));
    }

    #[test]
    fn empty_label_is_no_hand_in_both_forms() {
        assert_eq!(parse_frame_message(r#"{"label":"","confidence":0.9}"#), Ok(None));
        assert_eq!(parse_frame_message("label= conf=0.9"), Ok(None));
    }

    #[test]
    fn full_frame_queue_drops_instead_of_blocking() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        assert!(forward_frame(&tx, Some(Prediction::new("play", 0.9))));
        assert!(forward_frame(&tx, Some(Prediction::new("pause", 0.9))));
        assert_eq!(rx.len(), 1);
        assert_eq!(rx.recv().unwrap().unwrap().label, "play");

        drop(rx);
        assert!(!forward_frame(&tx, None));
    }

    #[test]
    fn malformed_messages_are_errors() {
        assert_eq!(parse_frame_message("   "), Err(IngestError::Empty));
        assert!(matches!(parse_frame_message("hello"), Err(IngestError::Malformed(_))));
        assert!(matches!(parse_frame_message("{label"), Err(IngestError::Malformed(_))));
        assert_eq!(
            parse_frame_message("label=play conf=high"),
            Err(IngestError::BadConfidence("high".to_string()))
        );
    }
}
