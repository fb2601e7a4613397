mod gemini;
mod parser;
mod prompt;
mod types;

pub use gemini::{GeminiClient, KeySource, DEFAULT_MODEL};
pub use parser::{extract_json, parse_analysis_response};
pub use prompt::analysis_prompt;
pub use types::{
    AnalysisResult, Artifact, DetectionVerdict, ForensicMetric, MetricStatus, Probabilities,
};

use async_trait::async_trait;

use crate::error::Result;
use crate::i18n::Language;
use crate::loader::LoadedImage;

/// 解析クライアントの差し替え点
///
/// 本番はGeminiClient、テストではスタブを注入する。
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// 画像1枚を解析して鑑定結果を返す
    async fn analyze(&self, image: &LoadedImage, language: Language) -> Result<AnalysisResult>;
}
