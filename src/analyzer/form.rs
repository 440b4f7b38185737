use serde::{Deserialize, Serialize};

use crate::analyzer::state::RepWindow;
use crate::config::{AnalyzerConfig, FormConfig};

/// フォームゲート違反の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFault {
    /// 最大角度が許容範囲 [min, max] の外（振幅不足または過伸展）
    UpAmplitude,
    /// 床付近まで戻り切っていない
    DownAmplitude,
    /// 腰の持ち上げ（胴体ではなく腰で稼ぐチート）
    HipLift,
    /// 膝の振り（脚のスイングで反動をつけるチート）
    KneeSwing,
}

/// 1レップ分のフォーム判定
/// 落ちたゲートをすべて列挙する。空なら正しいレップ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormVerdict {
    pub faults: Vec<FormFault>,
}

impl FormVerdict {
    pub fn is_correct(&self) -> bool {
        self.faults.is_empty()
    }
}

/// 閉じたRepWindowに対する4ゲート判定
#[derive(Debug, Clone, Copy)]
pub struct FormGates {
    /// 最大角度の許容範囲（両端含む）
    correct_angle_min: f32,
    correct_angle_max: f32,
    /// 最小角度の上限 = DOWN閾値 + マージン
    down_return_max: f32,
    /// 正規化した腰垂直変位の上限
    max_hip_drift: f32,
    /// 正規化した膝ユークリッド変位の上限
    max_knee_drift: f32,
}

impl FormGates {
    pub fn from_config(analyzer: &AnalyzerConfig, form: &FormConfig) -> Self {
        Self {
            correct_angle_min: form.correct_angle_min,
            correct_angle_max: form.correct_angle_max,
            down_return_max: analyzer.down_threshold + form.down_return_margin,
            max_hip_drift: form.max_hip_drift,
            max_knee_drift: form.max_knee_drift,
        }
    }

    /// レップ完了時に1回だけ評価する
    pub fn evaluate(&self, window: &RepWindow) -> FormVerdict {
        let mut faults = Vec::new();

        if window.max_angle < self.correct_angle_min || window.max_angle > self.correct_angle_max {
            faults.push(FormFault::UpAmplitude);
        }
        if window.min_angle > self.down_return_max {
            faults.push(FormFault::DownAmplitude);
        }
        if window.hip_drift > self.max_hip_drift {
            faults.push(FormFault::HipLift);
        }
        if window.knee_drift > self.max_knee_drift {
            faults.push(FormFault::KneeSwing);
        }

        FormVerdict { faults }
    }
}

impl Default for FormGates {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default(), &FormConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn window(max_angle: f32, min_angle: f32, hip_drift: f32, knee_drift: f32) -> RepWindow {
        RepWindow {
            max_angle,
            min_angle,
            initial_hip_y: 400.0,
            initial_knee: Point2::new(420.0, 420.0),
            hip_drift,
            knee_drift,
        }
    }

    #[test]
    fn test_all_gates_pass() {
        let gates = FormGates::default();
        let verdict = gates.evaluate(&window(90.0, 35.0, 0.05, 0.02));
        assert!(verdict.is_correct(), "faults={:?}", verdict.faults);
    }

    #[test]
    fn test_up_amplitude_boundaries_inclusive() {
        let gates = FormGates::default();
        // 60.0と100.0はちょうど境界、両端含む
        assert!(gates.evaluate(&window(60.0, 35.0, 0.0, 0.0)).is_correct());
        assert!(gates.evaluate(&window(100.0, 35.0, 0.0, 0.0)).is_correct());
        assert_eq!(
            gates.evaluate(&window(59.99, 35.0, 0.0, 0.0)).faults,
            vec![FormFault::UpAmplitude]
        );
        assert_eq!(
            gates.evaluate(&window(100.01, 35.0, 0.0, 0.0)).faults,
            vec![FormFault::UpAmplitude]
        );
    }

    #[test]
    fn test_down_amplitude_boundary() {
        let gates = FormGates::default();
        // down_return_max = 40 + 15 = 55
        assert!(gates.evaluate(&window(90.0, 55.0, 0.0, 0.0)).is_correct());
        assert_eq!(
            gates.evaluate(&window(90.0, 55.01, 0.0, 0.0)).faults,
            vec![FormFault::DownAmplitude]
        );
    }

    #[test]
    fn test_hip_lift_boundary() {
        let gates = FormGates::default();
        assert!(gates.evaluate(&window(90.0, 35.0, 0.15, 0.0)).is_correct());
        assert_eq!(
            gates.evaluate(&window(90.0, 35.0, 0.1501, 0.0)).faults,
            vec![FormFault::HipLift]
        );
    }

    #[test]
    fn test_knee_swing_boundary() {
        let gates = FormGates::default();
        assert!(gates.evaluate(&window(90.0, 35.0, 0.0, 0.08)).is_correct());
        assert_eq!(
            gates.evaluate(&window(90.0, 35.0, 0.0, 0.0801)).faults,
            vec![FormFault::KneeSwing]
        );
    }

    #[test]
    fn test_multiple_faults_all_listed() {
        let gates = FormGates::default();
        let verdict = gates.evaluate(&window(50.0, 60.0, 0.2, 0.1));
        assert_eq!(
            verdict.faults,
            vec![
                FormFault::UpAmplitude,
                FormFault::DownAmplitude,
                FormFault::HipLift,
                FormFault::KneeSwing,
            ]
        );
    }

    #[test]
    fn test_single_frame_rep_passes_down_gate() {
        // 開始角度シードのため、1フレームのレップはmin=maxとなり
        // 振幅ゲートの判定は開始角度次第になる
        let gates = FormGates::default();
        let verdict = gates.evaluate(&window(61.0, 61.0, 0.0, 0.0));
        assert_eq!(verdict.faults, vec![FormFault::DownAmplitude]);
    }
}
