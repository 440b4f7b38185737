use nalgebra::Point2;

use crate::geometry::TorsoSample;

/// 進行中のレップの極値・変位アキュムレータ
///
/// 極値はレップ開始時の角度でシードする（±∞センチネルではない）
/// 1フレームで閉じたレップが振幅ゲートを自明に落とさないための仕様
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepWindow {
    pub max_angle: f32,
    pub min_angle: f32,
    /// レップ開始時の腰アンカーY座標（ピクセル）
    pub initial_hip_y: f32,
    /// レップ開始時の膝アンカー位置（ピクセル）
    pub initial_knee: Point2<f32>,
    /// 腰の垂直変位の最大値（フレーム高さで正規化）
    pub hip_drift: f32,
    /// 膝のユークリッド変位の最大値（フレーム高さで正規化）
    pub knee_drift: f32,
}

impl RepWindow {
    /// レップ開始: 現在のサンプルでシード
    pub fn open(sample: &TorsoSample) -> Self {
        Self {
            max_angle: sample.angle,
            min_angle: sample.angle,
            initial_hip_y: sample.hip.y,
            initial_knee: sample.knee,
            hip_drift: 0.0,
            knee_drift: 0.0,
        }
    }

    /// 毎フレーム更新: 極値と変位の追跡
    pub fn track(&mut self, sample: &TorsoSample, frame_height: f32) {
        self.max_angle = self.max_angle.max(sample.angle);
        self.min_angle = self.min_angle.min(sample.angle);

        if frame_height > 0.0 {
            let hip_delta = (sample.hip.y - self.initial_hip_y).abs() / frame_height;
            self.hip_drift = self.hip_drift.max(hip_delta);

            let knee_delta = (sample.knee - self.initial_knee).norm() / frame_height;
            self.knee_drift = self.knee_drift.max(knee_delta);
        }
    }
}

/// 4状態サイクル: Down → GoingUp → Up → GoingDown → Down
///
/// Down以外の状態はオープンなRepWindowを保持する
/// 「レップ進行中」フラグは状態から導出され、別管理のフラグと
/// 食い違う余地がない
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Down,
    GoingUp(RepWindow),
    Up(RepWindow),
    GoingDown(RepWindow),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Down => "DOWN",
            Phase::GoingUp(_) => "GOING_UP",
            Phase::Up(_) => "UP",
            Phase::GoingDown(_) => "GOING_DOWN",
        }
    }

    pub fn rep_in_progress(&self) -> bool {
        !matches!(self, Phase::Down)
    }

    pub fn window_mut(&mut self) -> Option<&mut RepWindow> {
        match self {
            Phase::Down => None,
            Phase::GoingUp(w) | Phase::Up(w) | Phase::GoingDown(w) => Some(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(angle: f32, hip: (f32, f32), knee: (f32, f32)) -> TorsoSample {
        TorsoSample {
            angle,
            shoulder: Point2::new(0.0, 0.0),
            hip: Point2::new(hip.0, hip.1),
            knee: Point2::new(knee.0, knee.1),
        }
    }

    #[test]
    fn test_seeds_extrema_from_first_sample() {
        let w = RepWindow::open(&sample(70.0, (320.0, 400.0), (420.0, 420.0)));
        // {0, 180}シードではなく開始角度でシードされること
        assert_eq!(w.max_angle, 70.0);
        assert_eq!(w.min_angle, 70.0);
        assert_eq!(w.hip_drift, 0.0);
        assert_eq!(w.knee_drift, 0.0);
    }

    #[test]
    fn test_extrema_monotonic() {
        let mut w = RepWindow::open(&sample(70.0, (320.0, 400.0), (420.0, 420.0)));
        let angles = [80.0, 95.0, 90.0, 60.0, 45.0];

        let mut prev_max = w.max_angle;
        let mut prev_min = w.min_angle;
        for &a in &angles {
            w.track(&sample(a, (320.0, 400.0), (420.0, 420.0)), 480.0);
            assert!(w.max_angle >= prev_max, "max_angle decreased at {}", a);
            assert!(w.min_angle <= prev_min, "min_angle increased at {}", a);
            prev_max = w.max_angle;
            prev_min = w.min_angle;
        }
        assert_eq!(w.max_angle, 95.0);
        assert_eq!(w.min_angle, 45.0);
    }

    #[test]
    fn test_hip_drift_tracks_maximum() {
        let mut w = RepWindow::open(&sample(70.0, (320.0, 400.0), (420.0, 420.0)));
        // 腰が96px持ち上がる → 96/480 = 0.2
        w.track(&sample(80.0, (320.0, 304.0), (420.0, 420.0)), 480.0);
        // 戻っても最大値は保持される
        w.track(&sample(85.0, (320.0, 400.0), (420.0, 420.0)), 480.0);
        assert!((w.hip_drift - 0.2).abs() < 1e-6, "hip_drift={}", w.hip_drift);
    }

    #[test]
    fn test_knee_drift_euclidean() {
        let mut w = RepWindow::open(&sample(70.0, (320.0, 400.0), (420.0, 420.0)));
        // 膝が(30, 40)px移動 → 距離50px → 50/480
        w.track(&sample(80.0, (320.0, 400.0), (450.0, 460.0)), 480.0);
        assert!(
            (w.knee_drift - 50.0 / 480.0).abs() < 1e-6,
            "knee_drift={}",
            w.knee_drift
        );
    }

    #[test]
    fn test_phase_names_and_progress() {
        let w = RepWindow::open(&sample(70.0, (320.0, 400.0), (420.0, 420.0)));
        assert_eq!(Phase::Down.name(), "DOWN");
        assert!(!Phase::Down.rep_in_progress());
        assert_eq!(Phase::GoingUp(w).name(), "GOING_UP");
        assert!(Phase::Up(w).rep_in_progress());
        assert_eq!(Phase::GoingDown(w).name(), "GOING_DOWN");
    }
}
