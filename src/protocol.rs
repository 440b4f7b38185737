//! TCP protocol for landmark-producer ↔ analysis-server communication.
//!
//! Self-contained wire types: a producer streams per-frame landmarks and
//! receives a per-frame analysis result; counters live server-side.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::pose::{Keypoint, KeypointIndex, LandmarkFrame};
use crate::report::CountsSummary;

/// One landmark as sent on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct WireKeypoint {
    pub id: KeypointIndex,
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

/// Producer → Server
#[derive(Serialize, Deserialize, Debug)]
pub enum ClientMessage {
    Frame {
        frame_index: u64,
        width: u32,
        height: u32,
        keypoints: Vec<WireKeypoint>,
    },
    GetCounts,
    Reset,
    EndSession,
}

/// Server → Producer
#[derive(Serialize, Deserialize, Debug)]
pub enum ServerMessage {
    Ready,
    FrameResult {
        frame_index: u64,
        feedback: String,
        rep_completed: bool,
        torso_angle: Option<f32>,
        correct: u32,
        incorrect: u32,
    },
    Counts(CountsSummary),
    Summary(CountsSummary),
}

/// Rebuild a LandmarkFrame from wire keypoints. Unlisted ids stay invalid.
pub fn to_landmark_frame(keypoints: &[WireKeypoint]) -> LandmarkFrame {
    let mut frame = LandmarkFrame::default();
    for kp in keypoints {
        frame.set(kp.id, Keypoint::new(kp.x, kp.y, kp.confidence));
    }
    frame
}

// --- TCP codec helpers ---

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

const MAX_FRAME_LENGTH: usize = 1024 * 1024; // 1MB

/// Create a framed message stream with length-delimited framing.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec();
    Framed::new(stream, codec)
}

/// Send a serializable message (bincode + length prefix).
pub async fn send_message<T: Serialize>(
    stream: &mut MessageStream,
    msg: &T,
) -> anyhow::Result<()> {
    let data = bincode::serialize(msg)?;
    stream.send(Bytes::from(data)).await?;
    Ok(())
}

/// Receive and deserialize a message.
pub async fn recv_message<T: DeserializeOwned>(
    stream: &mut MessageStream,
) -> anyhow::Result<T> {
    match stream.next().await {
        Some(Ok(bytes)) => Ok(bincode::deserialize(&bytes)?),
        Some(Err(e)) => Err(e.into()),
        None => Err(anyhow::anyhow!("connection closed")),
    }
}
