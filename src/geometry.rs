use nalgebra::Point2;
use serde::Deserialize;

use crate::pose::{KeypointIndex, LandmarkFrame};

/// 左右ペアの欠損許容ポリシー
///
/// Strict: 両側必須（どちらか欠けたらフレーム検出不能扱い）
/// Relaxed: 片側のみ有効ならその点をペアのアンカーとして使う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairPolicy {
    #[default]
    Strict,
    Relaxed,
}

/// サイクル判定に必要な左右ペア（肩・腰・膝）
const REQUIRED_PAIRS: [(KeypointIndex, KeypointIndex); 3] = [
    (KeypointIndex::LeftShoulder, KeypointIndex::RightShoulder),
    (KeypointIndex::LeftHip, KeypointIndex::RightHip),
    (KeypointIndex::LeftKnee, KeypointIndex::RightKnee),
];

/// 1フレーム分の導出値: 胴体角度と変位追跡用アンカー
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorsoSample {
    /// 胴体角度（度、0〜180）: 腰→肩ベクトルの水平軸に対する角度
    pub angle: f32,
    pub shoulder: Point2<f32>,
    pub hip: Point2<f32>,
    pub knee: Point2<f32>,
}

/// 有効性チェックに失敗した必須キーポイントを列挙
/// Relaxedでもペアの片側が欠けていれば診断用に報告する
pub fn missing_keypoints(
    frame: &LandmarkFrame,
    confidence_threshold: f32,
) -> Vec<KeypointIndex> {
    let mut missing = Vec::new();
    for &(left, right) in &REQUIRED_PAIRS {
        if !frame.get(left).is_valid(confidence_threshold) {
            missing.push(left);
        }
        if !frame.get(right).is_valid(confidence_threshold) {
            missing.push(right);
        }
    }
    missing
}

/// 左右ペアのアンカー位置
/// 両側有効: 中点、Relaxedで片側のみ: その点
/// 原点(0,0)プレースホルダは中点を原点方向へ歪めるため使わない
fn pair_anchor(
    frame: &LandmarkFrame,
    left: KeypointIndex,
    right: KeypointIndex,
    confidence_threshold: f32,
    policy: PairPolicy,
) -> Option<Point2<f32>> {
    let l = frame.get(left);
    let r = frame.get(right);
    let l_valid = l.is_valid(confidence_threshold);
    let r_valid = r.is_valid(confidence_threshold);

    match (l_valid, r_valid) {
        (true, true) => Some(Point2::new((l.x + r.x) / 2.0, (l.y + r.y) / 2.0)),
        (true, false) if policy == PairPolicy::Relaxed => Some(Point2::new(l.x, l.y)),
        (false, true) if policy == PairPolicy::Relaxed => Some(Point2::new(r.x, r.y)),
        _ => None,
    }
}

/// フレームから胴体角度サンプルを抽出
/// 肩・腰・膝のいずれかのアンカーが得られない場合はNone
pub fn torso_sample(
    frame: &LandmarkFrame,
    confidence_threshold: f32,
    policy: PairPolicy,
) -> Option<TorsoSample> {
    let shoulder = pair_anchor(
        frame,
        KeypointIndex::LeftShoulder,
        KeypointIndex::RightShoulder,
        confidence_threshold,
        policy,
    )?;
    let hip = pair_anchor(
        frame,
        KeypointIndex::LeftHip,
        KeypointIndex::RightHip,
        confidence_threshold,
        policy,
    )?;
    let knee = pair_anchor(
        frame,
        KeypointIndex::LeftKnee,
        KeypointIndex::RightKnee,
        confidence_threshold,
        policy,
    )?;

    Some(TorsoSample {
        angle: torso_angle_deg(shoulder, hip),
        shoulder,
        hip,
        knee,
    })
}

/// 胴体角度（度）: 腰→肩ベクトルの水平軸に対する角度の絶対値
/// 左右の向きに依存しない。ゼロ長ベクトルは0度に退化（NaNを出さない）
pub fn torso_angle_deg(shoulder: Point2<f32>, hip: Point2<f32>) -> f32 {
    let dy = shoulder.y - hip.y;
    let dx = shoulder.x - hip.x;
    f32::atan2(dy, dx).to_degrees().abs()
}

/// 3点角度: 頂点bにおけるa-b-cの角度（度、0〜180に折り畳み）
pub fn angle_at(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> f32 {
    let radians = f32::atan2(c.y - b.y, c.x - b.x) - f32::atan2(a.y - b.y, a.x - b.x);
    let angle = radians.to_degrees().abs();
    angle.min(360.0 - angle)
}
