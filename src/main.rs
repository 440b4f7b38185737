//! 録画済みランドマークストリーム（JSON Lines）のオフライン再解析
//!
//! 1行 = 1フレーム: {"width":640,"height":480,"keypoints":[{"id":"left_shoulder",...}]}
//! 姿勢推定・動画デコードはランドマーク生成側の責務（このクレートの外）

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};

use situp_counter::analyzer::SitUpAnalyzer;
use situp_counter::config::Config;
use situp_counter::protocol::{self, WireKeypoint};
use situp_counter::report::{save_report, SessionReport};

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    width: u32,
    height: u32,
    keypoints: Vec<WireKeypoint>,
}

struct Args {
    input: String,
    report: Option<String>,
    fps: f64,
}

fn parse_args() -> Result<Args> {
    let argv: Vec<String> = std::env::args().collect();
    let mut input = None;
    let mut report = None;
    let mut fps = 30.0;

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--report" => {
                i += 1;
                report = Some(argv.get(i).context("--report にはパスが必要")?.clone());
            }
            "--fps" => {
                i += 1;
                fps = argv.get(i).context("--fps には数値が必要")?.parse()?;
            }
            arg if !arg.starts_with("--") => input = Some(arg.to_string()),
            arg => bail!("不明なオプション: {}", arg),
        }
        i += 1;
    }

    let Some(input) = input else {
        bail!("使い方: situp-counter <landmarks.jsonl> [--report report.json] [--fps 30]");
    };
    Ok(Args { input, report, fps })
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load_or_default(CONFIG_PATH);

    println!("=== Sit-Up Counter ===");
    println!("入力: {}", args.input);
    println!();

    let file = File::open(&args.input)
        .with_context(|| format!("入力ファイルを開けません: {}", args.input))?;
    let reader = BufReader::new(file);

    let mut analyzer = SitUpAnalyzer::from_config(&config);
    let mut total_frames: u64 = 0;
    let mut undetectable_frames: u64 = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let recorded: RecordedFrame = serde_json::from_str(&line)
            .with_context(|| format!("{}行目のパースに失敗", line_no + 1))?;

        let frame = protocol::to_landmark_frame(&recorded.keypoints);
        let result = analyzer.analyze_frame(&frame, recorded.width, recorded.height);
        total_frames += 1;

        if result.torso_angle.is_none() {
            undetectable_frames += 1;
        }
        if result.rep_completed {
            let counts = analyzer.counts();
            println!(
                "{}フレーム目: {} (correct={}, incorrect={})",
                total_frames, result.feedback, counts.correct, counts.incorrect
            );
        }
    }

    let counts = analyzer.counts();
    println!();
    println!("=== 解析結果 ===");
    println!("合計レップ数: {}", counts.total());
    println!("正しいレップ: {}", counts.correct);
    println!("不正なレップ: {}", counts.incorrect);
    println!("正確度: {:.2}%", counts.accuracy());
    println!("フレーム数: {} (検出不能: {})", total_frames, undetectable_frames);

    if let Some(report_path) = args.report {
        let report = SessionReport::new(counts, total_frames, args.fps);
        save_report(&report_path, &report)?;
        println!("レポートを保存しました: {}", report_path);
    }

    Ok(())
}
