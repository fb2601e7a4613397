//! レポートカードのPNG描画
//!
//! font8x8のビットマップフォントでカードを直接描画する。
//! グリフはASCIIのみのため、描画できない文字は'?'で代替する
//! （CJKテキストは印刷・コンソール出力側で原文のまま扱う）。

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

use super::{ProbabilityChannel, ReportCard};
use crate::analyzer::DetectionVerdict;
use crate::error::Result;
use crate::theme::Gradient;

/// エクスポート倍率（論理ピクセルに対する超解像係数）
pub const EXPORT_SCALE: u32 = 2;

// 論理レイアウト定数
const TOTAL_W: u32 = 640;
const MARGIN: u32 = 24;
const PADDING: u32 = 32;
const CONTENT_X: u32 = MARGIN + PADDING;
const CONTENT_W: u32 = TOTAL_W - 2 * (MARGIN + PADDING);
const CONTENT_CHARS: usize = (CONTENT_W / 8) as usize;

const GLYPH: u32 = 8; // font8x8は8x8固定
const LINE_GAP: u32 = 6;
const LINE_H: u32 = GLYPH + LINE_GAP;
const BADGE_H: u32 = 44;
const BAR_H: u32 = 12;
const METRIC_BAR_H: u32 = 4;
const PROB_ROW_H: u32 = GLYPH + 4 + BAR_H + 14;
const METRIC_ROW_H: u32 = GLYPH + 4 + METRIC_BAR_H + 12;
const PANEL_PAD: u32 = 12;

/// ラスタライザの差し替え点
///
/// 「カードと背景色を渡すと画像バッファが返る、または失敗する」
/// という契約だけを持つ。失敗時の印刷フォールバックは呼び出し側の責務。
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, card: &ReportCard, background: [u8; 3]) -> Result<RgbaImage>;
}

/// font8x8ベースのカード描画器
pub struct CardRenderer {
    scale: u32,
}

impl Default for CardRenderer {
    fn default() -> Self {
        CardRenderer {
            scale: EXPORT_SCALE,
        }
    }
}

/// セクションごとの確定済みY座標と折り返し済みテキスト
struct CardLayout {
    height: u32,
    badge_y: u32,
    dist_y: u32,
    bars_y: u32,
    summary_label_y: u32,
    summary_panel_y: u32,
    summary_lines: Vec<String>,
    metrics_label_y: u32,
    metrics_y: u32,
    artifact_label_y: Option<u32>,
    artifact_blocks: Vec<(u32, Vec<String>)>,
    prompt_divider_y: Option<u32>,
    prompt_label_y: u32,
    prompt_panel_y: u32,
    prompt_lines: Vec<String>,
    footer_divider_y: u32,
    footer_row_y: u32,
    footer_note_y: u32,
    footer_lines: Vec<String>,
}

impl CardRenderer {
    #[cfg(test)]
    fn with_scale(scale: u32) -> Self {
        CardRenderer { scale }
    }

    /// カード全体のレイアウトを1回の走査で確定させる
    fn layout(&self, card: &ReportCard) -> CardLayout {
        let mut y = MARGIN + PADDING;

        let badge_y = y;
        y += BADGE_H + 24;

        let dist_y = y;
        y += GLYPH + 14;

        let bars_y = y;
        y += card.probability_rows.len() as u32 * PROB_ROW_H;

        let summary_label_y = y;
        y += GLYPH + 10;
        let summary_lines = wrap_text(&card.summary, CONTENT_CHARS);
        let summary_panel_y = y;
        y += panel_height(summary_lines.len()) + 20;

        let metrics_label_y = y;
        y += GLYPH + 10;
        let metrics_y = y;
        y += card.metrics.len() as u32 * METRIC_ROW_H;

        let mut artifact_blocks = Vec::new();
        let artifact_label_y = if card.artifacts.is_empty() {
            None
        } else {
            let label_y = y;
            y += GLYPH + 10;
            for artifact in &card.artifacts {
                let lines = wrap_text(
                    &format!("{}: {}", artifact.label, artifact.description),
                    CONTENT_CHARS,
                );
                let block_h = lines.len() as u32 * LINE_H + 6;
                artifact_blocks.push((y, lines));
                y += block_h;
            }
            y += 8;
            Some(label_y)
        };

        let (prompt_divider_y, prompt_label_y, prompt_panel_y, prompt_lines) =
            match &card.prompt_panel {
                Some(panel) => {
                    let divider_y = y + 8;
                    y = divider_y + 16;
                    let label_y = y;
                    y += GLYPH + 10;
                    let lines = wrap_text(&panel.text, CONTENT_CHARS);
                    let panel_y = y;
                    y += panel_height(lines.len()) + 12;
                    (Some(divider_y), label_y, panel_y, lines)
                }
                None => (None, 0, 0, Vec::new()),
            };

        let footer_divider_y = y + 8;
        y = footer_divider_y + 16;
        let footer_row_y = y;
        y += GLYPH + 10;
        let footer_lines = wrap_text(card.footer_note, CONTENT_CHARS);
        let footer_note_y = y;
        y += footer_lines.len() as u32 * LINE_H;

        y += PADDING;
        let height = y + MARGIN;

        CardLayout {
            height,
            badge_y,
            dist_y,
            bars_y,
            summary_label_y,
            summary_panel_y,
            summary_lines,
            metrics_label_y,
            metrics_y,
            artifact_label_y,
            artifact_blocks,
            prompt_divider_y,
            prompt_label_y,
            prompt_panel_y,
            prompt_lines,
            footer_divider_y,
            footer_row_y,
            footer_note_y,
            footer_lines,
        }
    }

    fn gradient_for(&self, card: &ReportCard, channel: ProbabilityChannel) -> Gradient {
        let tokens = card.theme.tokens();
        match channel {
            ProbabilityChannel::Ai => tokens.ai_bar,
            ProbabilityChannel::Render => tokens.render_bar,
            ProbabilityChannel::Photo => tokens.photo_bar,
        }
    }

    // -----------------------------------------------
    // 描画プリミティブ（論理座標、内部でscale倍）
    // -----------------------------------------------

    fn fill_rect(&self, img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        let s = self.scale;
        for py in (y * s)..((y + h) * s) {
            for px in (x * s)..((x + w) * s) {
                if px < img.width() && py < img.height() {
                    let dst = *img.get_pixel(px, py);
                    img.put_pixel(px, py, blend_pixel(dst, color));
                }
            }
        }
    }

    fn fill_gradient(&self, img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, grad: Gradient) {
        if w == 0 {
            return;
        }
        let s = self.scale;
        let span = (w * s).max(1);
        for dx in 0..(w * s) {
            let t = dx as f64 / span as f64;
            let color = Rgba([
                lerp(grad.0[0], grad.1[0], t),
                lerp(grad.0[1], grad.1[1], t),
                lerp(grad.0[2], grad.1[2], t),
                255,
            ]);
            for py in (y * s)..((y + h) * s) {
                let px = x * s + dx;
                if px < img.width() && py < img.height() {
                    img.put_pixel(px, py, color);
                }
            }
        }
    }

    fn stroke_rect(&self, img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        self.fill_rect(img, x, y, w, 1, color);
        self.fill_rect(img, x, y + h - 1, w, 1, color);
        self.fill_rect(img, x, y, 1, h, color);
        self.fill_rect(img, x + w - 1, y, 1, h, color);
    }

    /// ビットマップテキスト描画（描画不能グリフは'?'に代替）
    fn draw_text(
        &self,
        img: &mut RgbaImage,
        x: u32,
        y: u32,
        text: &str,
        color: Rgba<u8>,
        size: u32,
    ) {
        let scale_i = (size * self.scale).max(1) as i32;
        let mut cursor_x = (x * self.scale) as i32;
        let base_y = (y * self.scale) as i32;
        for ch in text.chars() {
            let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
            let Some(glyph) = glyph else {
                cursor_x += 8 * scale_i;
                continue;
            };
            for (row_idx, row) in glyph.iter().enumerate() {
                let row_bits = *row;
                for col_idx in 0..8 {
                    if (row_bits >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + col_idx * scale_i;
                    let py = base_y + row_idx as i32 * scale_i;
                    for sy in 0..scale_i {
                        for sx in 0..scale_i {
                            let tx = px + sx;
                            let ty = py + sy;
                            if tx >= 0
                                && ty >= 0
                                && tx < img.width() as i32
                                && ty < img.height() as i32
                            {
                                let dst = *img.get_pixel(tx as u32, ty as u32);
                                img.put_pixel(tx as u32, ty as u32, blend_pixel(dst, color));
                            }
                        }
                    }
                }
            }
            cursor_x += 8 * scale_i;
        }
    }

    /// 論理単位でのテキスト幅
    fn text_width(&self, text: &str, size: u32) -> u32 {
        text.chars().count() as u32 * GLYPH * size
    }

    fn draw_text_right(
        &self,
        img: &mut RgbaImage,
        right_x: u32,
        y: u32,
        text: &str,
        color: Rgba<u8>,
        size: u32,
    ) {
        let x = right_x.saturating_sub(self.text_width(text, size));
        self.draw_text(img, x, y, text, color, size);
    }
}

impl Rasterizer for CardRenderer {
    fn rasterize(&self, card: &ReportCard, background: [u8; 3]) -> Result<RgbaImage> {
        let tokens = card.theme.tokens();
        let layout = self.layout(card);
        let s = self.scale;
        let mut img = RgbaImage::from_pixel(TOTAL_W * s, layout.height * s, rgba(background));

        // カード本体
        let card_h = layout.height - 2 * MARGIN;
        self.fill_rect(
            &mut img,
            MARGIN,
            MARGIN,
            TOTAL_W - 2 * MARGIN,
            card_h,
            rgba(tokens.card),
        );
        self.stroke_rect(
            &mut img,
            MARGIN,
            MARGIN,
            TOTAL_W - 2 * MARGIN,
            card_h,
            rgba(tokens.border),
        );

        // 判定バッジ（中央寄せ）
        let badge_w = (self.text_width(&card.badge_label, 2) + 40).min(TOTAL_W - 2 * MARGIN);
        let badge_x = (TOTAL_W - badge_w) / 2;
        match badge_channel(card.verdict) {
            Some(channel) => {
                let grad = self.gradient_for(card, channel);
                self.fill_gradient(&mut img, badge_x, layout.badge_y, badge_w, BADGE_H, grad);
                self.draw_text(
                    &mut img,
                    badge_x + 20,
                    layout.badge_y + (BADGE_H - 2 * GLYPH) / 2,
                    &card.badge_label,
                    rgba([0xff, 0xff, 0xff]),
                    2,
                );
            }
            None => {
                self.fill_rect(
                    &mut img,
                    badge_x,
                    layout.badge_y,
                    badge_w,
                    BADGE_H,
                    rgba(tokens.border),
                );
                self.draw_text(
                    &mut img,
                    badge_x + 20,
                    layout.badge_y + (BADGE_H - 2 * GLYPH) / 2,
                    &card.badge_label,
                    rgba(tokens.text_primary),
                    2,
                );
            }
        }

        // 分布ヘッダ（左: タイトル、右: エンジン表記）
        self.draw_text(
            &mut img,
            CONTENT_X,
            layout.dist_y,
            card.dist_title,
            rgba(tokens.text_muted),
            1,
        );
        self.draw_text_right(
            &mut img,
            CONTENT_X + CONTENT_W,
            layout.dist_y,
            &card.engine_label,
            rgba(tokens.accent),
            1,
        );

        // 確率バー3本
        for (i, row) in card.probability_rows.iter().enumerate() {
            let row_y = layout.bars_y + i as u32 * PROB_ROW_H;
            let grad = self.gradient_for(card, row.channel);
            self.draw_text(&mut img, CONTENT_X, row_y, row.label, rgba(grad.1), 1);
            self.draw_text_right(
                &mut img,
                CONTENT_X + CONTENT_W,
                row_y,
                &format!("{}%", row.value),
                rgba(tokens.text_primary),
                1,
            );
            let bar_y = row_y + GLYPH + 4;
            self.fill_rect(
                &mut img,
                CONTENT_X,
                bar_y,
                CONTENT_W,
                BAR_H,
                rgba(tokens.panel),
            );
            let fill_w = CONTENT_W * row.value.min(100) as u32 / 100;
            self.fill_gradient(&mut img, CONTENT_X, bar_y, fill_w, BAR_H, grad);
        }

        // 摘要
        self.draw_text(
            &mut img,
            CONTENT_X,
            layout.summary_label_y,
            card.summary_label,
            rgba(tokens.text_muted),
            1,
        );
        self.draw_panel(
            &mut img,
            layout.summary_panel_y,
            &layout.summary_lines,
            rgba(tokens.panel),
            rgba(tokens.border),
            rgba(tokens.text_primary),
        );

        // 指標
        self.draw_text(
            &mut img,
            CONTENT_X,
            layout.metrics_label_y,
            card.metrics_label,
            rgba(tokens.text_muted),
            1,
        );
        for (i, metric) in card.metrics.iter().enumerate() {
            let row_y = layout.metrics_y + i as u32 * METRIC_ROW_H;
            self.draw_text(
                &mut img,
                CONTENT_X,
                row_y,
                &metric.name,
                rgba(tokens.text_muted),
                1,
            );
            self.draw_text_right(
                &mut img,
                CONTENT_X + CONTENT_W,
                row_y,
                &format!("{}%", metric.value),
                rgba(tokens.text_primary),
                1,
            );
            let bar_y = row_y + GLYPH + 4;
            self.fill_rect(
                &mut img,
                CONTENT_X,
                bar_y,
                CONTENT_W,
                METRIC_BAR_H,
                rgba(tokens.panel),
            );
            let fill_w = CONTENT_W * metric.value.min(100) as u32 / 100;
            self.fill_rect(
                &mut img,
                CONTENT_X,
                bar_y,
                fill_w,
                METRIC_BAR_H,
                rgba(tokens.accent),
            );
        }

        // 痕跡所見
        if let Some(label_y) = layout.artifact_label_y {
            self.draw_text(
                &mut img,
                CONTENT_X,
                label_y,
                card.artifacts_label,
                rgba(tokens.text_muted),
                1,
            );
            for (block_y, lines) in &layout.artifact_blocks {
                for (i, line) in lines.iter().enumerate() {
                    self.draw_text(
                        &mut img,
                        CONTENT_X,
                        block_y + i as u32 * LINE_H,
                        line,
                        rgba(tokens.text_primary),
                        1,
                    );
                }
            }
        }

        // 推測プロンプト
        if let (Some(divider_y), Some(panel)) = (layout.prompt_divider_y, &card.prompt_panel) {
            self.fill_rect(
                &mut img,
                CONTENT_X,
                divider_y,
                CONTENT_W,
                1,
                rgba(tokens.border),
            );
            self.draw_text(
                &mut img,
                CONTENT_X,
                layout.prompt_label_y,
                panel.label,
                rgba(tokens.accent),
                1,
            );
            self.draw_panel(
                &mut img,
                layout.prompt_panel_y,
                &layout.prompt_lines,
                rgba(tokens.panel),
                rgba(tokens.border),
                rgba(tokens.accent),
            );
        }

        // フッター（ブランド + ハッシュ + 注記）
        self.fill_rect(
            &mut img,
            CONTENT_X,
            layout.footer_divider_y,
            CONTENT_W,
            1,
            rgba(tokens.border),
        );
        self.draw_text(
            &mut img,
            CONTENT_X,
            layout.footer_row_y,
            card.brand,
            rgba(tokens.text_muted),
            1,
        );
        self.draw_text_right(
            &mut img,
            CONTENT_X + CONTENT_W,
            layout.footer_row_y,
            &card.hash_stamp,
            rgba(tokens.text_muted),
            1,
        );
        for (i, line) in layout.footer_lines.iter().enumerate() {
            self.draw_text(
                &mut img,
                CONTENT_X,
                layout.footer_note_y + i as u32 * LINE_H,
                line,
                rgba(tokens.text_muted),
                1,
            );
        }

        Ok(img)
    }
}

impl CardRenderer {
    fn draw_panel(
        &self,
        img: &mut RgbaImage,
        y: u32,
        lines: &[String],
        fill: Rgba<u8>,
        border: Rgba<u8>,
        text_color: Rgba<u8>,
    ) {
        let h = panel_height(lines.len());
        self.fill_rect(img, CONTENT_X, y, CONTENT_W, h, fill);
        self.stroke_rect(img, CONTENT_X, y, CONTENT_W, h, border);
        for (i, line) in lines.iter().enumerate() {
            self.draw_text(
                img,
                CONTENT_X + PANEL_PAD,
                y + PANEL_PAD + i as u32 * LINE_H,
                line,
                text_color,
                1,
            );
        }
    }
}

/// バッジに使う色チャンネル（Uncertainは無彩色）
fn badge_channel(verdict: DetectionVerdict) -> Option<ProbabilityChannel> {
    match verdict {
        DetectionVerdict::AiGenerated => Some(ProbabilityChannel::Ai),
        DetectionVerdict::DigitalRender => Some(ProbabilityChannel::Render),
        DetectionVerdict::AuthenticPhoto => Some(ProbabilityChannel::Photo),
        DetectionVerdict::Uncertain => None,
    }
}

fn panel_height(lines: usize) -> u32 {
    lines.max(1) as u32 * LINE_H + 2 * PANEL_PAD
}

fn rgba(c: [u8; 3]) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) * (1.0 - t) + f64::from(b) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = f64::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let r = (f64::from(dst[0]) * inv + f64::from(src[0]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let g = (f64::from(dst[1]) * inv + f64::from(src[1]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let b = (f64::from(dst[2]) * inv + f64::from(src[2]) * a)
        .round()
        .clamp(0.0, 255.0) as u8;
    let out_a = (f64::from(dst[3]) * inv + f64::from(src[3]))
        .round()
        .clamp(0.0, 255.0) as u8;
    Rgba([r, g, b, out_a])
}

/// 文字数ベースの折り返し
///
/// 空白区切りの単語単位で折り返し、max_charsを超える単語
/// （空白を含まないCJK文など）は文字単位で強制分割する。
pub(super) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut count = 0usize;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if word_len > max_chars {
                // 長過ぎる単語は文字単位で分割
                if count > 0 {
                    lines.push(std::mem::take(&mut current));
                    count = 0;
                }
                let mut chunk = String::new();
                let mut chunk_len = 0usize;
                for ch in word.chars() {
                    if chunk_len == max_chars {
                        lines.push(std::mem::take(&mut chunk));
                        chunk_len = 0;
                    }
                    chunk.push(ch);
                    chunk_len += 1;
                }
                if chunk_len > 0 {
                    current = chunk;
                    count = chunk_len;
                }
                continue;
            }
            let needed = if count == 0 { word_len } else { word_len + 1 };
            if count + needed > max_chars && count > 0 {
                lines.push(std::mem::take(&mut current));
                count = 0;
            }
            if count > 0 {
                current.push(' ');
                count += 1;
            }
            current.push_str(word);
            count += word_len;
        }
        if count > 0 {
            lines.push(current);
        }
    }
    lines
}

// =====================================================
// テスト
// =====================================================
