use serde::{Deserialize, Deserializer, Serialize};

/// 鑑定の最終判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DetectionVerdict {
    #[serde(rename = "AI_GENERATED")]
    AiGenerated,

    #[serde(rename = "DIGITAL_RENDER")]
    DigitalRender,

    #[serde(rename = "AUTHENTIC_PHOTO")]
    AuthenticPhoto,

    #[serde(rename = "UNCERTAIN")]
    Uncertain,
}

impl Default for DetectionVerdict {
    fn default() -> Self {
        DetectionVerdict::Uncertain
    }
}

impl DetectionVerdict {
    /// ワイヤー文字列から変換（未知の値はUncertainに落とす）
    pub fn from_wire(value: &str) -> Self {
        match value {
            "AI_GENERATED" => DetectionVerdict::AiGenerated,
            "DIGITAL_RENDER" => DetectionVerdict::DigitalRender,
            "AUTHENTIC_PHOTO" => DetectionVerdict::AuthenticPhoto,
            _ => DetectionVerdict::Uncertain,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            DetectionVerdict::AiGenerated => "AI_GENERATED",
            DetectionVerdict::DigitalRender => "DIGITAL_RENDER",
            DetectionVerdict::AuthenticPhoto => "AUTHENTIC_PHOTO",
            DetectionVerdict::Uncertain => "UNCERTAIN",
        }
    }
}

/// 指標の健全性ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Clean,
    Suspicious,
    AiConfirmed,
}

impl Default for MetricStatus {
    fn default() -> Self {
        MetricStatus::Suspicious
    }
}

impl MetricStatus {
    /// ワイヤー文字列から変換（未知の値はSuspiciousに落とす）
    pub fn from_wire(value: &str) -> Self {
        match value {
            "clean" => MetricStatus::Clean,
            "ai_confirmed" => MetricStatus::AiConfirmed,
            _ => MetricStatus::Suspicious,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            MetricStatus::Clean => "clean",
            MetricStatus::Suspicious => "suspicious",
            MetricStatus::AiConfirmed => "ai_confirmed",
        }
    }
}

/// 3分類の確率分布（各0〜100、合計100はモデル任せで保証されない）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probabilities {
    #[serde(deserialize_with = "de_percent")]
    pub ai: u8,

    #[serde(deserialize_with = "de_percent")]
    pub render: u8,

    #[serde(deserialize_with = "de_percent")]
    pub photo: u8,
}

/// フォレンジック指標（モデルが判定根拠として返すサブシグナル）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForensicMetric {
    pub name: String,

    #[serde(deserialize_with = "de_percent")]
    pub value: u8,

    #[serde(deserialize_with = "de_status")]
    pub status: MetricStatus,
}

/// 自由記述の痕跡所見
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub label: String,
    pub description: String,
}

/// 画像1枚分の解析結果
///
/// Geminiに要求するレスポンススキーマと同形。verdict・status・
/// 数値はワイヤー値をそのまま信用せず、取り込み時に正規化する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(deserialize_with = "de_verdict")]
    pub verdict: DetectionVerdict,

    pub probabilities: Probabilities,

    pub summary: String,

    pub metrics: Vec<ForensicMetric>,

    pub artifacts: Vec<Artifact>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_prompt: Option<String>,
}

/// パーセント値を0〜100のu8に丸め込む
///
/// スキーマでは整数を要求しているが、モデルは小数や範囲外の値を
/// 返すことがあるため、拒否せずクランプする。
fn de_percent<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Ok(0);
    }
    Ok(value.clamp(0.0, 100.0).round() as u8)
}

fn de_verdict<'de, D>(deserializer: D) -> std::result::Result<DetectionVerdict, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(DetectionVerdict::from_wire(&value))
}

fn de_status<'de, D>(deserializer: D) -> std::result::Result<MetricStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(MetricStatus::from_wire(&value))
}

// =====================================================
// テスト
// =====================================================
