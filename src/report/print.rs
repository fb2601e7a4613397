//! 印刷フォールバック
//!
//! PNG描画に失敗した場合の代替出力。カードの内容をテキストだけの
//! PDFとして保存する。組み込みHelveticaで扱えない文字は'?'に代替する。

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::render::wrap_text;
use super::ReportCard;
use crate::error::{DetectorError, Result};

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 14.0;
const LINE_MM: f32 = 6.5;
const BODY_PT: f32 = 11.0;
const HEADING_PT: f32 = 16.0;
const WRAP_CHARS: usize = 88;

/// 1行分の出力内容
struct PrintLine {
    text: String,
    size: f32,
    bold: bool,
}

impl PrintLine {
    fn body(text: impl Into<String>) -> Self {
        PrintLine {
            text: text.into(),
            size: BODY_PT,
            bold: false,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        PrintLine {
            text: text.into(),
            size: HEADING_PT,
            bold: true,
        }
    }

    fn blank() -> Self {
        Self::body("")
    }
}

/// カードをテキストPDFとして保存する
pub fn print_report(card: &ReportCard, output_path: &Path) -> Result<()> {
    let (doc, page1, layer1) = PdfDocument::new(
        "AI-Detector Lab Report",
        Mm(A4_WIDTH_MM),
        Mm(A4_HEIGHT_MM),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| DetectorError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| DetectorError::PdfGeneration(format!("フォント追加エラー: {:?}", e)))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = A4_HEIGHT_MM - MARGIN_MM - 8.0;

    for line in assemble_lines(card) {
        if y < MARGIN_MM + 8.0 {
            let (page, new_layer) =
                doc.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(new_layer);
            y = A4_HEIGHT_MM - MARGIN_MM - 8.0;
        }
        if !line.text.is_empty() {
            let face = if line.bold { &font_bold } else { &font };
            layer.use_text(
                ascii_line(&line.text),
                line.size,
                Mm(MARGIN_MM),
                Mm(y),
                face,
            );
        }
        y -= LINE_MM;
    }

    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| DetectorError::PdfGeneration(format!("PDF保存エラー: {:?}", e)))?;

    Ok(())
}

/// カードの内容を出力行の並びに展開する
fn assemble_lines(card: &ReportCard) -> Vec<PrintLine> {
    let mut lines = Vec::new();

    lines.push(PrintLine::heading(&card.badge_label));
    lines.push(PrintLine::blank());

    lines.push(PrintLine::body(format!(
        "{}  [{}]",
        card.dist_title, card.engine_label
    )));
    for row in &card.probability_rows {
        lines.push(PrintLine::body(format!(
            "  {:<20} {} {:>3}%",
            row.label,
            text_bar(row.value),
            row.value
        )));
    }
    lines.push(PrintLine::blank());

    lines.push(PrintLine::body(card.summary_label));
    for line in wrap_text(&card.summary, WRAP_CHARS) {
        lines.push(PrintLine::body(format!("  {}", line)));
    }
    lines.push(PrintLine::blank());

    lines.push(PrintLine::body(card.metrics_label));
    for metric in &card.metrics {
        lines.push(PrintLine::body(format!(
            "  {:<20} {:>3}% ({})",
            metric.name,
            metric.value,
            metric.status.as_wire()
        )));
    }

    if !card.artifacts.is_empty() {
        lines.push(PrintLine::blank());
        lines.push(PrintLine::body(card.artifacts_label));
        for artifact in &card.artifacts {
            for line in wrap_text(
                &format!("{}: {}", artifact.label, artifact.description),
                WRAP_CHARS,
            ) {
                lines.push(PrintLine::body(format!("  {}", line)));
            }
        }
    }

    if let Some(panel) = &card.prompt_panel {
        lines.push(PrintLine::blank());
        lines.push(PrintLine::body(panel.label));
        for line in wrap_text(&panel.text, WRAP_CHARS) {
            lines.push(PrintLine::body(format!("  {}", line)));
        }
    }

    lines.push(PrintLine::blank());
    lines.push(PrintLine::body(format!(
        "{}  {}",
        card.brand, card.hash_stamp
    )));
    for line in wrap_text(card.footer_note, WRAP_CHARS) {
        lines.push(PrintLine::body(line));
    }

    lines
}

/// 20文字のテキストバー
fn text_bar(value: u8) -> String {
    let filled = (value.min(100) as usize * 20) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled))
}

/// 印字可能なASCII以外を'?'に代替する
fn ascii_line(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}

// =====================================================
// テスト
// =====================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{
        AnalysisResult, Artifact, DetectionVerdict, ForensicMetric, MetricStatus, Probabilities,
    };
    use crate::i18n::Language;
    use crate::theme::AppTheme;

    fn sample_card() -> ReportCard {
        let result = AnalysisResult {
            verdict: DetectionVerdict::DigitalRender,
            probabilities: Probabilities {
                ai: 20,
                render: 70,
                photo: 10,
            },
            summary: "高光过于完美，疑似渲染器输出。".to_string(),
            metrics: vec![ForensicMetric {
                name: "specular".to_string(),
                value: 88,
                status: MetricStatus::Suspicious,
            }],
            artifacts: vec![Artifact {
                label: "高光".to_string(),
                description: "反射缺乏微小瑕疵".to_string(),
            }],
            suggested_model: Some("Blender Cycles".to_string()),
            suggested_prompt: None,
        };
        ReportCard::compose(
            &result,
            "HASH_AB12CD34E".to_string(),
            Language::Zh,
            AppTheme::Midnight,
        )
    }

    #[test]
    fn test_print_report_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");

        print_report(&sample_card(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_print_report_paginates_long_content() {
        // 1ページに収まらない量でも改ページして成功する
        let mut result = AnalysisResult {
            verdict: DetectionVerdict::AuthenticPhoto,
            probabilities: Probabilities {
                ai: 5,
                render: 10,
                photo: 85,
            },
            summary: "x".to_string(),
            metrics: vec![],
            artifacts: vec![],
            suggested_model: None,
            suggested_prompt: None,
        };
        for i in 0..80 {
            result.artifacts.push(Artifact {
                label: format!("finding-{}", i),
                description: "long description ".repeat(8),
            });
        }
        let card = ReportCard::compose(
            &result,
            "HASH_000000000".to_string(),
            Language::En,
            AppTheme::Pure,
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.pdf");
        print_report(&card, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_text_bar() {
        assert_eq!(text_bar(0), "[--------------------]");
        assert_eq!(text_bar(50), "[##########----------]");
        assert_eq!(text_bar(100), "[####################]");
    }

    #[test]
    fn test_ascii_line_substitutes_cjk() {
        assert_eq!(ascii_line("AI 魔法"), "AI ??");
        assert_eq!(ascii_line("plain text"), "plain text");
    }

    #[test]
    fn test_assemble_lines_include_all_sections() {
        let lines = assemble_lines(&sample_card());
        let all: String = lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n");
        assert!(all.contains("来源可能性分布"));
        assert!(all.contains("Blender Cycles"));
        assert!(all.contains("HASH_AB12CD34E"));
        assert!(all.contains("(suspicious)"));
    }
}
