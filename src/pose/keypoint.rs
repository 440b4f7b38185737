use serde::{Deserialize, Serialize};

/// シットアップ解析で使う 8 キーポイントインデックス
/// 足首はプロトコル上予約済み（サイクル判定では未使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum KeypointIndex {
    LeftShoulder = 0,
    RightShoulder = 1,
    LeftHip = 2,
    RightHip = 3,
    LeftKnee = 4,
    RightKnee = 5,
    LeftAnkle = 6,
    RightAnkle = 7,
}

impl KeypointIndex {
    pub const COUNT: usize = 8;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::LeftShoulder),
            1 => Some(Self::RightShoulder),
            2 => Some(Self::LeftHip),
            3 => Some(Self::RightHip),
            4 => Some(Self::LeftKnee),
            5 => Some(Self::RightKnee),
            6 => Some(Self::LeftAnkle),
            7 => Some(Self::RightAnkle),
            _ => None,
        }
    }
}

/// 単一キーポイント（ピクセル座標）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// X座標（ピクセル）
    pub x: f32,
    /// Y座標（ピクセル、下方向が正）
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 信頼度が閾値以上か
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }
}

/// 1フレーム分のランドマーク
/// 姿勢推定プロバイダが毎フレーム生成し、ジオメトリ抽出後に破棄される
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
}

impl LandmarkFrame {
    pub fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self { keypoints }
    }

    /// インデックスでキーポイントを取得
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    pub fn set(&mut self, index: KeypointIndex, keypoint: Keypoint) {
        self.keypoints[index as usize] = keypoint;
    }
}

impl Default for LandmarkFrame {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::default(); KeypointIndex::COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_index_count() {
        assert_eq!(KeypointIndex::COUNT, 8);
    }

    #[test]
    fn test_keypoint_index_from_index() {
        assert_eq!(
            KeypointIndex::from_index(0),
            Some(KeypointIndex::LeftShoulder)
        );
        assert_eq!(
            KeypointIndex::from_index(7),
            Some(KeypointIndex::RightAnkle)
        );
        assert_eq!(KeypointIndex::from_index(8), None);
    }

    #[test]
    fn test_keypoint_is_valid() {
        let kp = Keypoint::new(320.0, 240.0, 0.7);
        assert!(kp.is_valid(0.5));
        assert!(!kp.is_valid(0.8));
    }

    #[test]
    fn test_frame_get_set() {
        let mut frame = LandmarkFrame::default();
        frame.set(KeypointIndex::LeftHip, Keypoint::new(100.0, 200.0, 0.9));

        let hip = frame.get(KeypointIndex::LeftHip);
        assert_eq!(hip.x, 100.0);
        assert_eq!(hip.y, 200.0);
        assert_eq!(hip.confidence, 0.9);
        // 他のキーポイントはデフォルトのまま
        assert_eq!(frame.get(KeypointIndex::RightHip).confidence, 0.0);
    }
}
