//! レポートカード
//!
//! 解析結果1件をテーマ付きカードに組み立て、PNG描画（render）と
//! 印刷フォールバック（print）を提供する

mod print;
mod render;

pub use print::print_report;
pub use render::{CardRenderer, Rasterizer, EXPORT_SCALE};

use crate::analyzer::{AnalysisResult, Artifact, DetectionVerdict, MetricStatus};
use crate::i18n::{self, Language};
use crate::theme::AppTheme;

/// カード下部に印字するブランド名
const BRAND: &str = "AI-Detector Lab";

/// 機種名が返らなかった場合の既定エンジン表記
const DEFAULT_ENGINE: &str = "DNA-LAB V5";

/// 確率バーの色チャンネル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityChannel {
    Ai,
    Render,
    Photo,
}

/// 確率バー1本分
#[derive(Debug, Clone)]
pub struct ProbabilityRow {
    pub label: &'static str,
    pub value: u8,
    pub channel: ProbabilityChannel,
}

/// 指標1行分
#[derive(Debug, Clone)]
pub struct MetricRow {
    pub name: String,
    pub value: u8,
    pub status: MetricStatus,
}

/// 推測プロンプトパネル（AI判定かつプロンプトありの場合のみ）
#[derive(Debug, Clone)]
pub struct PromptPanel {
    pub label: &'static str,
    pub text: String,
}

/// 組み立て済みレポートカード
///
/// 表示文字列をすべて確定させた形。ここから先は見た目の処理だけで、
/// 解析結果そのものへの参照は持たない。
#[derive(Debug, Clone)]
pub struct ReportCard {
    pub language: Language,
    pub theme: AppTheme,
    pub verdict: DetectionVerdict,
    pub badge_label: String,
    pub dist_title: &'static str,
    pub engine_label: String,
    pub probability_rows: Vec<ProbabilityRow>,
    pub summary_label: &'static str,
    pub summary: String,
    pub metrics_label: &'static str,
    pub metrics: Vec<MetricRow>,
    pub artifacts_label: &'static str,
    pub artifacts: Vec<Artifact>,
    pub prompt_panel: Option<PromptPanel>,
    pub brand: &'static str,
    pub hash_stamp: String,
    pub footer_note: &'static str,
}

impl ReportCard {
    /// 解析結果からカードを組み立てる
    ///
    /// hash_stampは元画像バイト列由来の短縮ハッシュ。同じ画像と
    /// 同じ結果からは常に同じカードができる。
    pub fn compose(
        result: &AnalysisResult,
        hash_stamp: String,
        language: Language,
        theme: AppTheme,
    ) -> Self {
        let t = i18n::text(language);

        let badge_label = match result.verdict {
            DetectionVerdict::AiGenerated => t.verdict_ai,
            DetectionVerdict::DigitalRender => t.verdict_render,
            DetectionVerdict::AuthenticPhoto => t.verdict_photo,
            DetectionVerdict::Uncertain => t.verdict_uncertain,
        }
        .to_string();

        // プロンプトパネルはAI判定のときだけ載せる
        let prompt_panel = match (result.verdict, &result.suggested_prompt) {
            (DetectionVerdict::AiGenerated, Some(prompt)) => Some(PromptPanel {
                label: t.prompt_label,
                text: prompt.clone(),
            }),
            _ => None,
        };

        ReportCard {
            language,
            theme,
            verdict: result.verdict,
            badge_label,
            dist_title: t.dist_title,
            engine_label: result
                .suggested_model
                .clone()
                .unwrap_or_else(|| DEFAULT_ENGINE.to_string()),
            probability_rows: vec![
                ProbabilityRow {
                    label: t.ai_label,
                    value: result.probabilities.ai,
                    channel: ProbabilityChannel::Ai,
                },
                ProbabilityRow {
                    label: t.render_label,
                    value: result.probabilities.render,
                    channel: ProbabilityChannel::Render,
                },
                ProbabilityRow {
                    label: t.photo_label,
                    value: result.probabilities.photo,
                    channel: ProbabilityChannel::Photo,
                },
            ],
            summary_label: t.summary_label,
            summary: result.summary.clone(),
            metrics_label: t.metrics_label,
            metrics: result
                .metrics
                .iter()
                .map(|m| MetricRow {
                    name: m.name.clone(),
                    value: m.value,
                    status: m.status,
                })
                .collect(),
            artifacts_label: t.artifacts_label,
            artifacts: result.artifacts.clone(),
            prompt_panel,
            brand: BRAND,
            hash_stamp,
            footer_note: t.footer_note,
        }
    }
}

// =====================================================
// テスト
// =====================================================
