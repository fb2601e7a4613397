//! アプリケーション状態機械
//!
//! 画像・解析中フラグ・結果・エラー・言語・テーマを1箇所で持ち、
//! 遷移（画像読み込み・解析・エクスポート・リセット）だけが状態を
//! 書き換える。解析クライアントと描画器は差し替え可能な形で注入する。

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyzer::{AnalysisClient, AnalysisResult};
use crate::error::{DetectorError, Result};
use crate::i18n::{self, Language};
use crate::loader::LoadedImage;
use crate::report::{print_report, Rasterizer, ReportCard};
use crate::theme::AppTheme;

/// エクスポート前の安定待ち時間
const EXPORT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// セッション状態
#[derive(Debug, Clone)]
pub struct AppState {
    pub image: Option<LoadedImage>,
    pub is_analyzing: bool,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    pub language: Language,
    pub theme: AppTheme,
    pub is_exporting: bool,
}

impl AppState {
    fn new(language: Language, theme: AppTheme) -> Self {
        AppState {
            image: None,
            is_analyzing: false,
            result: None,
            error: None,
            language,
            theme,
            is_exporting: false,
        }
    }
}

/// 発行済み解析ジョブ（発行時点の画像と言語を固定する）
struct AnalyzeJob {
    image: LoadedImage,
    language: Language,
}

/// エクスポートの結末
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// PNGカードを書き出した
    Png(PathBuf),
    /// 描画に失敗し、印刷フォールバックでPDFを書き出した
    PrintFallback(PathBuf),
}

/// 検出ラボ本体
pub struct DetectorApp {
    pub state: AppState,
    client: Box<dyn AnalysisClient>,
    rasterizer: Box<dyn Rasterizer>,
}

impl DetectorApp {
    pub fn new(
        client: Box<dyn AnalysisClient>,
        rasterizer: Box<dyn Rasterizer>,
        language: Language,
        theme: AppTheme,
    ) -> Self {
        DetectorApp {
            state: AppState::new(language, theme),
            client,
            rasterizer,
        }
    }

    /// 画像読み込み遷移。前の結果とエラーを破棄する。
    pub fn load_image(&mut self, image: LoadedImage) {
        self.state.image = Some(image);
        self.state.result = None;
        self.state.error = None;
    }

    /// 保存済み結果の復元（解析済みJSONからの再エクスポート用）
    ///
    /// 画像が読み込まれていなければ何もしない。
    pub fn restore_result(&mut self, result: AnalysisResult) -> bool {
        if self.state.image.is_none() {
            return false;
        }
        self.state.result = Some(result);
        true
    }

    /// リセット遷移。言語・テーマは保持する。
    pub fn reset(&mut self) {
        self.state.image = None;
        self.state.result = None;
        self.state.error = None;
    }

    pub fn set_language(&mut self, language: Language) {
        self.state.language = language;
    }

    /// テーマ切替（設定ファイルへの永続化は設定側の責務）
    pub fn set_theme(&mut self, theme: AppTheme) {
        self.state.theme = theme;
    }

    /// 解析遷移。ガードに弾かれた場合はfalseを返す。
    pub async fn analyze(&mut self) -> bool {
        let Some(job) = self.begin_analyze() else {
            return false;
        };
        let outcome = self.client.analyze(&job.image, job.language).await;
        self.finish_analyze(&job, outcome);
        true
    }

    /// 解析開始。画像なし・解析中はNone。
    ///
    /// ジョブには発行時点の画像と言語を固定し、完了時の照合に使う。
    fn begin_analyze(&mut self) -> Option<AnalyzeJob> {
        if self.state.is_analyzing {
            return None;
        }
        let image = self.state.image.clone()?;
        self.state.is_analyzing = true;
        self.state.error = None;
        Some(AnalyzeJob {
            image,
            language: self.state.language,
        })
    }

    /// 解析完了。ジョブ発行後に画像が差し替わっていた場合、
    /// 遅れて届いた結果・エラーは捨ててフラグだけ解除する。
    fn finish_analyze(&mut self, job: &AnalyzeJob, outcome: Result<AnalysisResult>) {
        self.state.is_analyzing = false;

        let still_current = self
            .state
            .image
            .as_ref()
            .map(|image| image.fingerprint == job.image.fingerprint)
            .unwrap_or(false);
        if !still_current {
            return;
        }

        match outcome {
            Ok(result) => {
                self.state.result = Some(result);
            }
            Err(err) => {
                self.state.error = Some(i18n::error_message(&err, job.language).to_string());
            }
        }
    }

    /// エクスポート遷移
    ///
    /// 結果がない・エクスポート中はOk(None)。PNG書き出しに失敗した
    /// 場合は同じタイムスタンプのPDFに印刷フォールバックする。
    /// is_exportingは成否にかかわらず解除される。
    pub async fn export_report(&mut self, output_dir: &Path) -> Result<Option<ExportOutcome>> {
        let Some(card) = self.begin_export() else {
            return Ok(None);
        };

        tokio::time::sleep(EXPORT_SETTLE_DELAY).await;

        let outcome = self.run_export(&card, output_dir);
        self.finish_export();
        outcome.map(Some)
    }

    fn begin_export(&mut self) -> Option<ReportCard> {
        if self.state.is_exporting {
            return None;
        }
        let result = self.state.result.as_ref()?;
        let image = self.state.image.as_ref()?;
        let card = ReportCard::compose(
            result,
            image.hash_stamp(),
            self.state.language,
            self.state.theme,
        );
        self.state.is_exporting = true;
        Some(card)
    }

    fn finish_export(&mut self) {
        self.state.is_exporting = false;
    }

    fn run_export(&self, card: &ReportCard, output_dir: &Path) -> Result<ExportOutcome> {
        let timestamp = chrono::Local::now().timestamp_millis();
        let background = card.theme.tokens().background;

        let png_path = output_dir.join(format!("AI-Lab-Report-{}.png", timestamp));
        let rendered = self
            .rasterizer
            .rasterize(card, background)
            .and_then(|img| save_png(&img, &png_path));

        match rendered {
            Ok(()) => Ok(ExportOutcome::Png(png_path)),
            Err(_) => {
                // 描画失敗時は印刷フォールバック
                let pdf_path = output_dir.join(format!("AI-Lab-Report-{}.pdf", timestamp));
                print_report(card, &pdf_path)?;
                Ok(ExportOutcome::PrintFallback(pdf_path))
            }
        }
    }
}

fn save_png(img: &image::RgbaImage, path: &Path) -> Result<()> {
    img.save(path)
        .map_err(|e| DetectorError::Export(format!("PNG保存エラー: {}", e)))
}

// =====================================================
// テスト
// =====================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{DetectionVerdict, ForensicMetric, MetricStatus, Probabilities};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum StubBehavior {
        Succeed(AnalysisResult),
        FailMissingKey,
        FailCredential,
        FailGeneric,
    }

    struct StubClient {
        behavior: StubBehavior,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AnalysisClient for StubClient {
        async fn analyze(
            &self,
            _image: &LoadedImage,
            _language: Language,
        ) -> Result<AnalysisResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                StubBehavior::Succeed(result) => Ok(result.clone()),
                StubBehavior::FailMissingKey => Err(DetectorError::MissingApiKey),
                StubBehavior::FailCredential => {
                    Err(DetectorError::CredentialRejected("400".to_string()))
                }
                StubBehavior::FailGeneric => Err(DetectorError::ApiCall("500".to_string())),
            }
        }
    }

    struct StubRasterizer {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Rasterizer for StubRasterizer {
        fn rasterize(&self, _card: &ReportCard, background: [u8; 3]) -> Result<image::RgbaImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DetectorError::Render("stub failure".to_string()));
            }
            Ok(image::RgbaImage::from_pixel(
                4,
                4,
                image::Rgba([background[0], background[1], background[2], 255]),
            ))
        }
    }

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            verdict: DetectionVerdict::AiGenerated,
            probabilities: Probabilities {
                ai: 92,
                render: 6,
                photo: 2,
            },
            summary: "AI 痕迹明显！".to_string(),
            metrics: vec![ForensicMetric {
                name: "texture".to_string(),
                value: 90,
                status: MetricStatus::AiConfirmed,
            }],
            artifacts: vec![],
            suggested_model: None,
            suggested_prompt: Some("portrait".to_string()),
        }
    }

    fn sample_image() -> LoadedImage {
        LoadedImage::from_bytes("a.png", b"image-a")
    }

    fn other_image() -> LoadedImage {
        LoadedImage::from_bytes("b.png", b"image-b")
    }

    struct TestCounters {
        client_calls: Arc<AtomicUsize>,
        raster_calls: Arc<AtomicUsize>,
    }

    fn build_app(behavior: StubBehavior, raster_fail: bool) -> (DetectorApp, TestCounters) {
        let client_calls = Arc::new(AtomicUsize::new(0));
        let raster_calls = Arc::new(AtomicUsize::new(0));
        let app = DetectorApp::new(
            Box::new(StubClient {
                behavior,
                calls: Arc::clone(&client_calls),
            }),
            Box::new(StubRasterizer {
                fail: raster_fail,
                calls: Arc::clone(&raster_calls),
            }),
            Language::Zh,
            AppTheme::Midnight,
        );
        (
            app,
            TestCounters {
                client_calls,
                raster_calls,
            },
        )
    }

    // =====================================================
    // 初期状態・基本遷移
    // =====================================================

    #[test]
    fn test_initial_state() {
        let (app, _) = build_app(StubBehavior::FailGeneric, false);
        assert!(app.state.image.is_none());
        assert!(app.state.result.is_none());
        assert!(app.state.error.is_none());
        assert!(!app.state.is_analyzing);
        assert!(!app.state.is_exporting);
        assert_eq!(app.state.language, Language::Zh);
        assert_eq!(app.state.theme, AppTheme::Midnight);
    }

    #[test]
    fn test_load_image_clears_result_and_error() {
        let (mut app, _) = build_app(StubBehavior::FailGeneric, false);
        app.state.result = Some(sample_result());
        app.state.error = Some("old error".to_string());

        app.load_image(sample_image());

        assert!(app.state.image.is_some());
        assert!(app.state.result.is_none());
        assert!(app.state.error.is_none());
    }

    #[test]
    fn test_reset_preserves_preferences() {
        let (mut app, _) = build_app(StubBehavior::FailGeneric, false);
        app.set_language(Language::En);
        app.set_theme(AppTheme::Cyberpunk);
        app.load_image(sample_image());
        app.state.result = Some(sample_result());
        app.state.error = Some("x".to_string());

        app.reset();

        assert!(app.state.image.is_none());
        assert!(app.state.result.is_none());
        assert!(app.state.error.is_none());
        assert_eq!(app.state.language, Language::En);
        assert_eq!(app.state.theme, AppTheme::Cyberpunk);
    }

    // =====================================================
    // 解析遷移
    // =====================================================

    #[tokio::test]
    async fn test_analyze_success() {
        let (mut app, counters) = build_app(StubBehavior::Succeed(sample_result()), false);
        app.load_image(sample_image());

        let ran = app.analyze().await;

        assert!(ran);
        assert!(!app.state.is_analyzing);
        assert!(app.state.error.is_none());
        let result = app.state.result.as_ref().expect("結果が入る");
        assert_eq!(result.verdict, DetectionVerdict::AiGenerated);
        assert_eq!(counters.client_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_analyze_without_image_is_noop() {
        let (mut app, counters) = build_app(StubBehavior::Succeed(sample_result()), false);

        let ran = app.analyze().await;

        assert!(!ran);
        assert_eq!(counters.client_calls.load(Ordering::SeqCst), 0);
        assert!(app.state.result.is_none());
    }

    #[tokio::test]
    async fn test_analyze_while_analyzing_is_noop() {
        let (mut app, counters) = build_app(StubBehavior::Succeed(sample_result()), false);
        app.load_image(sample_image());
        app.state.is_analyzing = true;

        let ran = app.analyze().await;

        assert!(!ran);
        assert_eq!(counters.client_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_missing_key_message_localized() {
        let (mut app, _) = build_app(StubBehavior::FailMissingKey, false);
        app.load_image(sample_image());
        app.analyze().await;
        assert_eq!(app.state.error.as_deref(), Some("请先配置 API Key"));

        let (mut app_en, _) = build_app(StubBehavior::FailMissingKey, false);
        app_en.set_language(Language::En);
        app_en.load_image(sample_image());
        app_en.analyze().await;
        assert_eq!(
            app_en.state.error.as_deref(),
            Some("Please configure API Key first")
        );
    }

    #[tokio::test]
    async fn test_analyze_credential_rejected_message() {
        let (mut app, _) = build_app(StubBehavior::FailCredential, false);
        app.load_image(sample_image());
        app.analyze().await;
        assert_eq!(
            app.state.error.as_deref(),
            Some("API Key 无效或已过期，请重新配置")
        );
        assert!(!app.state.is_analyzing);
    }

    #[tokio::test]
    async fn test_analyze_generic_failure_message() {
        let (mut app, _) = build_app(StubBehavior::FailGeneric, false);
        app.load_image(sample_image());
        app.analyze().await;
        assert_eq!(app.state.error.as_deref(), Some("实验室能量波动，请重试..."));
        assert!(app.state.result.is_none());
    }

    #[tokio::test]
    async fn test_error_cleared_when_analysis_restarts() {
        let (mut app, _) = build_app(StubBehavior::Succeed(sample_result()), false);
        app.load_image(sample_image());
        app.state.error = Some("古いエラー".to_string());

        app.analyze().await;

        assert!(app.state.error.is_none());
        assert!(app.state.result.is_some());
    }

    // =====================================================
    // 画像差し替えレース
    // =====================================================

    #[test]
    fn test_stale_success_discarded_after_image_swap() {
        let (mut app, _) = build_app(StubBehavior::Succeed(sample_result()), false);
        app.load_image(sample_image());

        let job = app.begin_analyze().expect("ジョブ発行");
        // 解析中に別の画像へ差し替え
        app.load_image(other_image());
        app.finish_analyze(&job, Ok(sample_result()));

        assert!(!app.state.is_analyzing);
        assert!(app.state.result.is_none(), "古い結果は捨てる");
    }

    #[test]
    fn test_stale_error_discarded_after_reset() {
        let (mut app, _) = build_app(StubBehavior::FailGeneric, false);
        app.load_image(sample_image());

        let job = app.begin_analyze().expect("ジョブ発行");
        app.reset();
        app.finish_analyze(&job, Err(DetectorError::ApiCall("500".to_string())));

        assert!(!app.state.is_analyzing);
        assert!(app.state.error.is_none(), "古いエラーは表示しない");
    }

    #[test]
    fn test_same_image_result_applied() {
        let (mut app, _) = build_app(StubBehavior::Succeed(sample_result()), false);
        app.load_image(sample_image());

        let job = app.begin_analyze().expect("ジョブ発行");
        app.finish_analyze(&job, Ok(sample_result()));

        assert!(app.state.result.is_some());
    }

    // =====================================================
    // エクスポート遷移
    // =====================================================

    #[tokio::test]
    async fn test_export_without_result_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, counters) = build_app(StubBehavior::Succeed(sample_result()), false);

        let outcome = app.export_report(dir.path()).await.unwrap();

        assert_eq!(outcome, None);
        assert_eq!(counters.raster_calls.load(Ordering::SeqCst), 0);
        assert!(!app.state.is_exporting);
    }

    #[tokio::test]
    async fn test_export_while_exporting_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, counters) = build_app(StubBehavior::Succeed(sample_result()), false);
        app.load_image(sample_image());
        app.restore_result(sample_result());
        app.state.is_exporting = true;

        let outcome = app.export_report(dir.path()).await.unwrap();

        assert_eq!(outcome, None);
        assert_eq!(counters.raster_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, counters) = build_app(StubBehavior::Succeed(sample_result()), false);
        app.load_image(sample_image());
        app.restore_result(sample_result());

        let outcome = app.export_report(dir.path()).await.unwrap();

        let path = match outcome {
            Some(ExportOutcome::Png(path)) => path,
            other => panic!("PNG出力のはず: {:?}", other),
        };
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("AI-Lab-Report-"));
        assert!(name.ends_with(".png"));
        assert_eq!(counters.raster_calls.load(Ordering::SeqCst), 1);
        assert!(!app.state.is_exporting);
    }

    #[tokio::test]
    async fn test_export_falls_back_to_print_on_render_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, counters) = build_app(StubBehavior::Succeed(sample_result()), true);
        app.load_image(sample_image());
        app.restore_result(sample_result());

        let outcome = app.export_report(dir.path()).await.unwrap();

        let path = match outcome {
            Some(ExportOutcome::PrintFallback(path)) => path,
            other => panic!("印刷フォールバックのはず: {:?}", other),
        };
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with(".pdf"));
        assert_eq!(counters.raster_calls.load(Ordering::SeqCst), 1);
        // PNGは書かれていない
        let pngs = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "png").unwrap_or(false))
            .count();
        assert_eq!(pngs, 0);
        assert!(!app.state.is_exporting, "失敗してもフラグは解除");
    }

    #[test]
    fn test_restore_result_requires_image() {
        let (mut app, _) = build_app(StubBehavior::Succeed(sample_result()), false);

        assert!(!app.restore_result(sample_result()));
        assert!(app.state.result.is_none());

        app.load_image(sample_image());
        assert!(app.restore_result(sample_result()));
        assert!(app.state.result.is_some());
    }
}
