//! Analysis server: receives landmark frames over TCP, runs the sit-up
//! state machine per connection, and streams per-frame results back.
//!
//! One analyzer per connection; a new connection is a new session.

use anyhow::Result;
use tokio::net::{TcpListener, TcpStream};

use situp_counter::analyzer::SitUpAnalyzer;
use situp_counter::config::Config;
use situp_counter::protocol::{self, ClientMessage, ServerMessage};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);
    let listener = TcpListener::bind(&config.server.listen_addr).await?;
    println!("listening on {}", config.server.listen_addr);

    loop {
        let (stream, addr) = listener.accept().await?;
        println!("client connected: {}", addr);
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, config).await {
                eprintln!("client {}: {}", addr, e);
            }
            println!("client disconnected: {}", addr);
        });
    }
}

async fn handle_client(stream: TcpStream, config: Config) -> Result<()> {
    let mut framed = protocol::message_stream(stream);
    protocol::send_message(&mut framed, &ServerMessage::Ready).await?;

    let mut analyzer = SitUpAnalyzer::from_config(&config);

    loop {
        let msg: ClientMessage = match protocol::recv_message(&mut framed).await {
            Ok(msg) => msg,
            // 切断はセッション終了扱い
            Err(_) => return Ok(()),
        };

        match msg {
            ClientMessage::Frame {
                frame_index,
                width,
                height,
                keypoints,
            } => {
                let frame = protocol::to_landmark_frame(&keypoints);
                let result = analyzer.analyze_frame(&frame, width, height);
                let counts = analyzer.counts();
                protocol::send_message(
                    &mut framed,
                    &ServerMessage::FrameResult {
                        frame_index,
                        feedback: result.feedback,
                        rep_completed: result.rep_completed,
                        torso_angle: result.torso_angle,
                        correct: counts.correct,
                        incorrect: counts.incorrect,
                    },
                )
                .await?;
            }
            ClientMessage::GetCounts => {
                protocol::send_message(
                    &mut framed,
                    &ServerMessage::Counts(analyzer.counts().summary()),
                )
                .await?;
            }
            ClientMessage::Reset => {
                analyzer.reset();
                protocol::send_message(&mut framed, &ServerMessage::Ready).await?;
            }
            ClientMessage::EndSession => {
                protocol::send_message(
                    &mut framed,
                    &ServerMessage::Summary(analyzer.counts().summary()),
                )
                .await?;
                return Ok(());
            }
        }
    }
}
