use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// セッション通算カウンタ（単調増加、明示的リセットのみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionCounts {
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionCounts {
    pub fn total(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// 正確度（%）を小数2桁に丸めて返す。レップ0件なら0
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let pct = f64::from(self.correct) / f64::from(total) * 100.0;
        (pct * 100.0).round() / 100.0
    }

    pub fn summary(&self) -> CountsSummary {
        CountsSummary {
            correct: self.correct,
            incorrect: self.incorrect,
            total: self.total(),
            accuracy: self.accuracy(),
        }
    }
}

/// ホストへ返す集計スナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountsSummary {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub accuracy: f64,
}

/// セッションレポート（JSONエクスポート用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub accuracy: f64,
    pub total_frames: u64,
    pub video_duration: f64,
}

impl SessionReport {
    pub fn new(counts: SessionCounts, total_frames: u64, fps: f64) -> Self {
        Self {
            correct: counts.correct,
            incorrect: counts.incorrect,
            total: counts.total(),
            accuracy: counts.accuracy(),
            total_frames,
            video_duration: if fps > 0.0 {
                total_frames as f64 / fps
            } else {
                0.0
            },
        }
    }
}

pub fn save_report(path: &str, report: &SessionReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).context("Failed to write report file")?;
    Ok(())
}
