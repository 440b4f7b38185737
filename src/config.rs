use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::geometry::PairPolicy;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// UP遷移閾値（度）
    #[serde(default = "default_up_threshold")]
    pub up_threshold: f32,
    /// DOWN遷移閾値（度）
    #[serde(default = "default_down_threshold")]
    pub down_threshold: f32,
    /// GOING_UP→UPに必要な追加バッファ（度）
    #[serde(default = "default_up_buffer")]
    pub up_buffer: f32,
    /// キーポイント有効性の信頼度閾値
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// 左右ペアの欠損許容ポリシー ("strict" / "relaxed")
    #[serde(default)]
    pub pair_policy: PairPolicy,
}

fn default_up_threshold() -> f32 { 60.0 }
fn default_down_threshold() -> f32 { 40.0 }
fn default_up_buffer() -> f32 { 5.0 }
fn default_confidence_threshold() -> f32 { 0.5 }

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            up_threshold: default_up_threshold(),
            down_threshold: default_down_threshold(),
            up_buffer: default_up_buffer(),
            confidence_threshold: default_confidence_threshold(),
            pair_policy: PairPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    /// 最大角度の下限（度、境界含む）
    #[serde(default = "default_correct_angle_min")]
    pub correct_angle_min: f32,
    /// 最大角度の上限（度、境界含む）
    #[serde(default = "default_correct_angle_max")]
    pub correct_angle_max: f32,
    /// DOWN閾値に加算する戻り許容マージン（度）
    #[serde(default = "default_down_return_margin")]
    pub down_return_margin: f32,
    /// 腰垂直変位の上限（フレーム高さ比）
    #[serde(default = "default_max_hip_drift")]
    pub max_hip_drift: f32,
    /// 膝変位の上限（フレーム高さ比）
    #[serde(default = "default_max_knee_drift")]
    pub max_knee_drift: f32,
}

fn default_correct_angle_min() -> f32 { 60.0 }
fn default_correct_angle_max() -> f32 { 100.0 }
fn default_down_return_margin() -> f32 { 15.0 }
fn default_max_hip_drift() -> f32 { 0.15 }
fn default_max_knee_drift() -> f32 { 0.08 }

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            correct_angle_min: default_correct_angle_min(),
            correct_angle_max: default_correct_angle_max(),
            down_return_margin: default_down_return_margin(),
            max_hip_drift: default_max_hip_drift(),
            max_knee_drift: default_max_knee_drift(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String { "0.0.0.0:9100".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 読めなければデフォルト設定を返す（パースエラーのみ警告）
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("設定ファイルのパースに失敗: {} (デフォルトを使用)", e);
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = Config::default();
        assert_eq!(config.analyzer.up_threshold, 60.0);
        assert_eq!(config.analyzer.down_threshold, 40.0);
        assert_eq!(config.analyzer.up_buffer, 5.0);
        assert_eq!(config.form.correct_angle_max, 100.0);
        assert_eq!(config.analyzer.pair_policy, PairPolicy::Strict);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [analyzer]
            up_threshold = 65.0
            pair_policy = "relaxed"

            [form]
            max_hip_drift = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(config.analyzer.up_threshold, 65.0);
        assert_eq!(config.analyzer.pair_policy, PairPolicy::Relaxed);
        // 未指定フィールドはデフォルト
        assert_eq!(config.analyzer.down_threshold, 40.0);
        assert_eq!(config.form.max_hip_drift, 0.2);
        assert_eq!(config.form.max_knee_drift, 0.08);
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.analyzer.up_threshold, 60.0);
        assert_eq!(config.server.listen_addr, "0.0.0.0:9100");
    }
}
