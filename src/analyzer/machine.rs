use crate::analyzer::form::{FormGates, FormVerdict};
use crate::analyzer::state::{Phase, RepWindow};
use crate::config::Config;
use crate::geometry::{self, PairPolicy};
use crate::pose::{KeypointIndex, LandmarkFrame};
use crate::report::SessionCounts;

/// 1フレーム分の解析結果
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    pub feedback: String,
    /// このフレームでレップが完了したか
    pub rep_completed: bool,
    /// 胴体角度（検出不能フレームはNone）
    pub torso_angle: Option<f32>,
    /// レップ完了フレームのみ判定が載る
    pub verdict: Option<FormVerdict>,
}

/// デバッグスナップショット
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    pub state: &'static str,
    pub rep_in_progress: bool,
    pub last_feedback: String,
    pub missing_keypoints: Vec<KeypointIndex>,
}

/// シットアップのレップカウント状態機械
///
/// 1ビデオセッションにつき1インスタンス。フレーム順に
/// analyze_frameを呼ぶこと。内部に排他制御は持たない
pub struct SitUpAnalyzer {
    up_threshold: f32,
    down_threshold: f32,
    up_buffer: f32,
    confidence_threshold: f32,
    pair_policy: PairPolicy,
    gates: FormGates,

    phase: Phase,
    counts: SessionCounts,
    last_feedback: String,
    missing: Vec<KeypointIndex>,
}

const INITIAL_FEEDBACK: &str = "Starting...";

impl SitUpAnalyzer {
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            up_threshold: config.analyzer.up_threshold,
            down_threshold: config.analyzer.down_threshold,
            up_buffer: config.analyzer.up_buffer,
            confidence_threshold: config.analyzer.confidence_threshold,
            pair_policy: config.analyzer.pair_policy,
            gates: FormGates::from_config(&config.analyzer, &config.form),
            phase: Phase::Down,
            counts: SessionCounts::default(),
            last_feedback: INITIAL_FEEDBACK.to_string(),
            missing: Vec::new(),
        }
    }

    /// 1フレーム解析してサイクルを進める
    ///
    /// キーポイント欠損時は状態・カウンタを一切変更しない
    /// （姿勢検出の失敗は高頻度の正常系）
    pub fn analyze_frame(
        &mut self,
        frame: &LandmarkFrame,
        _frame_width: u32,
        frame_height: u32,
    ) -> FrameAnalysis {
        self.missing = geometry::missing_keypoints(frame, self.confidence_threshold);

        let sample =
            match geometry::torso_sample(frame, self.confidence_threshold, self.pair_policy) {
                Some(sample) => sample,
                None => {
                    self.last_feedback = format!("Missing keypoints: {:?}", self.missing);
                    return FrameAnalysis {
                        feedback: self.last_feedback.clone(),
                        rep_completed: false,
                        torso_angle: None,
                        verdict: None,
                    };
                }
            };

        // レップ進行中は遷移判定より先に極値・変位を更新する
        if let Some(window) = self.phase.window_mut() {
            window.track(&sample, frame_height as f32);
        }

        let angle = sample.angle;
        let mut rep_completed = false;
        let mut verdict = None;

        self.phase = match std::mem::replace(&mut self.phase, Phase::Down) {
            Phase::Down => {
                if angle > self.up_threshold {
                    self.last_feedback = "Going up!".to_string();
                    Phase::GoingUp(RepWindow::open(&sample))
                } else {
                    Phase::Down
                }
            }
            Phase::GoingUp(window) => {
                if angle > self.up_threshold + self.up_buffer {
                    self.last_feedback = "Up position!".to_string();
                    Phase::Up(window)
                } else {
                    Phase::GoingUp(window)
                }
            }
            Phase::Up(window) => {
                if angle < self.up_threshold {
                    self.last_feedback = "Going down!".to_string();
                    Phase::GoingDown(window)
                } else {
                    Phase::Up(window)
                }
            }
            Phase::GoingDown(window) => {
                if angle < self.down_threshold {
                    let result = self.gates.evaluate(&window);
                    if result.is_correct() {
                        self.counts.correct += 1;
                        self.last_feedback = "Correct rep! +1".to_string();
                    } else {
                        self.counts.incorrect += 1;
                        self.last_feedback = "Incorrect form".to_string();
                    }
                    rep_completed = true;
                    verdict = Some(result);
                    Phase::Down
                } else {
                    Phase::GoingDown(window)
                }
            }
        };

        FrameAnalysis {
            feedback: self.last_feedback.clone(),
            rep_completed,
            torso_angle: Some(angle),
            verdict,
        }
    }

    pub fn counts(&self) -> SessionCounts {
        self.counts
    }

    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            state: self.phase.name(),
            rep_in_progress: self.phase.rep_in_progress(),
            last_feedback: self.last_feedback.clone(),
            missing_keypoints: self.missing.clone(),
        }
    }

    /// 全状態を初期化する（新しいビデオ/セッション開始時）
    pub fn reset(&mut self) {
        self.phase = Phase::Down;
        self.counts = SessionCounts::default();
        self.last_feedback = INITIAL_FEEDBACK.to_string();
        self.missing.clear();
    }
}

impl Default for SitUpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
