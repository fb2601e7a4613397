//! Gemini API連携
//!
//! 画像1枚＋鑑定指示を単発のgenerateContent呼び出しで送り、
//! スキーマ制約付きJSONレスポンスをAnalysisResultにパースする

use async_trait::async_trait;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::parser::parse_analysis_response;
use super::prompt::analysis_prompt;
use super::types::AnalysisResult;
use super::AnalysisClient;
use crate::error::{DetectorError, Result};
use crate::i18n::Language;
use crate::loader::LoadedImage;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// デフォルトの鑑定モデル
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// APIキーの供給源（Analyzeの都度評価される）
pub type KeySource = Box<dyn Fn() -> Option<String> + Send + Sync>;

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

lazy_static! {
    /// Geminiに要求するレスポンススキーマ（AnalysisResultと同形）
    static ref RESPONSE_SCHEMA: serde_json::Value = json!({
        "type": "OBJECT",
        "properties": {
            "verdict": { "type": "STRING" },
            "probabilities": {
                "type": "OBJECT",
                "properties": {
                    "ai": { "type": "INTEGER" },
                    "render": { "type": "INTEGER" },
                    "photo": { "type": "INTEGER" }
                },
                "required": ["ai", "render", "photo"]
            },
            "summary": { "type": "STRING" },
            "suggestedModel": { "type": "STRING" },
            "suggestedPrompt": { "type": "STRING" },
            "metrics": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "value": { "type": "NUMBER" },
                        "status": { "type": "STRING" }
                    },
                    "required": ["name", "value", "status"]
                }
            },
            "artifacts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["label", "description"]
                }
            }
        },
        "required": ["verdict", "probabilities", "summary", "artifacts", "metrics"]
    });
}

/// Gemini APIクライアント
pub struct GeminiClient {
    base_url: String,
    model: String,
    key_source: KeySource,
}

impl GeminiClient {
    pub fn new(model: impl Into<String>, key_source: KeySource) -> Self {
        GeminiClient {
            base_url: GEMINI_API_BASE.to_string(),
            model: model.into(),
            key_source,
        }
    }

    /// 接続先を差し替える（モックサーバー向け）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        )
    }

    /// Gemini API呼び出し（共通処理）
    async fn call_gemini_api(&self, api_key: &str, request: &GeminiRequest) -> Result<String> {
        let client = reqwest::Client::new();
        let response = client
            .post(self.endpoint(api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &body));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| DetectorError::ApiParse(format!("レスポンスJSONが不正: {}", e)))?;

        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| DetectorError::ApiParse("レスポンスが空です".into()))?;

        Ok(text)
    }
}

#[async_trait]
impl AnalysisClient for GeminiClient {
    /// 画像を解析して鑑定結果を返す
    ///
    /// APIキーは呼び出しの都度key_sourceから取得する。未設定なら
    /// ネットワークに一切出ずにMissingApiKeyを返す。
    async fn analyze(&self, image: &LoadedImage, language: Language) -> Result<AnalysisResult> {
        let api_key = (self.key_source)().ok_or(DetectorError::MissingApiKey)?;

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                    Part::Text {
                        text: analysis_prompt(language).to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
                response_schema: RESPONSE_SCHEMA.clone(),
            },
        };

        let text = self.call_gemini_api(&api_key, &request).await?;
        parse_analysis_response(&text)
    }
}

/// プロバイダエラーの分類
///
/// キー無効・権限・エンティティ未発見系はCredentialRejected、
/// それ以外はApiCallに落とす。
fn classify_api_error(status: reqwest::StatusCode, body: &str) -> DetectorError {
    const CREDENTIAL_MARKERS: &[&str] = &[
        "API_KEY_INVALID",
        "API key not valid",
        "API key expired",
        "PERMISSION_DENIED",
        "NOT_FOUND",
    ];

    if CREDENTIAL_MARKERS.iter().any(|marker| body.contains(marker)) {
        DetectorError::CredentialRejected(format!("status {}", status))
    } else {
        let snippet: String = body.chars().take(200).collect();
        DetectorError::ApiCall(format!("status {}: {}", status, snippet))
    }
}

// =====================================================
// テスト
// =====================================================
