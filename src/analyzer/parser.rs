//! Geminiレスポンスパーサー
//!
//! レスポンステキストからJSONオブジェクトを抽出し、
//! 鑑定結果（AnalysisResult）としてパースする

use super::types::AnalysisResult;
use crate::error::{DetectorError, Result};

/// レスポンステキストからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
///
/// # Arguments
/// * `response` - APIレスポンス文字列
///
/// # Returns
/// * `Ok(&str)` - 抽出されたJSON文字列
/// * `Err` - JSONが見つからない場合
///
/// # Examples
/// ```
/// use ai_detector_rust::analyzer::extract_json;
///
/// let response = "{\"verdict\": \"UNCERTAIN\"}";
/// let json = extract_json(response).unwrap();
/// assert!(json.contains("verdict"));
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(DetectorError::ApiParse("JSONが見つかりません".into()))
}

/// 鑑定レスポンスをパース
///
/// # Arguments
/// * `response` - GeminiのレスポンステキストPart
///
/// # Returns
/// * `Ok(AnalysisResult)` - パース成功（数値・判定は取り込み時に正規化済み）
/// * `Err` - JSONが見つからないかパース失敗
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult> {
    let json_str = extract_json(response)?;
    let result: AnalysisResult = serde_json::from_str(json_str.trim())
        .map_err(|e| DetectorError::ApiParse(format!("鑑定JSONパースエラー: {}", e)))?;
    Ok(result)
}

// =====================================================
// テスト
// =====================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::types::DetectionVerdict;

    const WIRE_JSON: &str = r#"{
        "verdict": "AI_GENERATED",
        "probabilities": {"ai": 92, "render": 6, "photo": 2},
        "summary": "皮肤质感过于顺滑，背景文字扭曲，AI 痕迹明显！",
        "metrics": [
            {"name": "texture", "value": 90, "status": "ai_confirmed"},
            {"name": "text_integrity", "value": 35, "status": "suspicious"}
        ],
        "artifacts": [{"label": "文字", "description": "招牌文字呈乱码状"}],
        "suggestedModel": "Midjourney v6",
        "suggestedPrompt": "a photorealistic portrait, cinematic lighting"
    }"#;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = format!("以下是分析结果：\n```json\n{}\n```\n以上。", WIRE_JSON);
        let json = extract_json(&response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("verdict"));
    }

    #[test]
    fn test_extract_json_raw_object() {
        let response = format!("前置き {} 後書き", WIRE_JSON);
        let json = extract_json(&response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.contains("probabilities"));
    }

    #[test]
    fn test_extract_json_not_found() {
        let result = extract_json("ここにJSONはありません");
        assert!(matches!(result, Err(DetectorError::ApiParse(_))));
    }

    #[test]
    fn test_parse_analysis_response_full() {
        let result = parse_analysis_response(WIRE_JSON).unwrap();
        assert_eq!(result.verdict, DetectionVerdict::AiGenerated);
        assert_eq!(result.probabilities.ai, 92);
        assert_eq!(result.metrics.len(), 2);
        assert_eq!(result.artifacts.len(), 1);
        assert_eq!(result.suggested_model.as_deref(), Some("Midjourney v6"));
        assert!(result
            .suggested_prompt
            .as_deref()
            .unwrap()
            .contains("photorealistic"));
    }

    #[test]
    fn test_parse_analysis_response_code_block() {
        let response = format!("```json\n{}\n```", WIRE_JSON);
        let result = parse_analysis_response(&response).unwrap();
        assert_eq!(result.verdict, DetectionVerdict::AiGenerated);
    }

    #[test]
    fn test_parse_analysis_response_broken_json() {
        let result = parse_analysis_response("{\"verdict\": ");
        assert!(matches!(result, Err(DetectorError::ApiParse(_))));
    }

    #[test]
    fn test_parse_analysis_response_plain_text() {
        let result = parse_analysis_response("この画像はAIっぽいですね");
        assert!(result.is_err());
    }
}
