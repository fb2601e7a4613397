use ai_detector_rust::{analyzer, app, cli, config, error, i18n, loader, report, theme};
use analyzer::{AnalysisResult, DetectionVerdict, GeminiClient, MetricStatus};
use app::{DetectorApp, ExportOutcome};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::{DetectorError, Result};
use i18n::Language;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;
use theme::AppTheme;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze {
            image,
            output,
            language,
            model,
        } => {
            println!("🔬 ai-detector - AI画像鑑定\n");

            let model = model.unwrap_or_else(|| config.model.clone());
            if cli.verbose {
                println!("- モデル: {}", model);
            }
            let mut app = build_app(model, language, config.theme());

            // 1. 画像読み込み
            println!("[1/2] 画像を読み込み中...");
            let loaded = loader::load_image(&image)?;
            println!(
                "✔ {} ({} bytes, {})\n",
                loaded.file_name, loaded.byte_len, loaded.mime_type
            );
            app.load_image(loaded);

            // 2. AI鑑定
            println!("[2/2] AI鑑定中...");
            let result = run_analysis(&mut app).await?;
            println!("✔ 鑑定完了");

            print_verdict(&result, language);

            if cli.verbose {
                println!("\n{}", serde_json::to_string_pretty(&result)?);
            }

            // 結果保存
            let output_path = output.unwrap_or_else(|| image.with_file_name("result.json"));
            let json = serde_json::to_string_pretty(&result)?;
            std::fs::write(&output_path, json)?;
            println!("\n✔ 結果を保存: {}", output_path.display());

            println!("\n✅ 鑑定完了");
        }

        Commands::Export {
            input,
            image,
            output,
            theme,
            language,
        } => {
            println!("📄 ai-detector - レポートカード生成\n");

            let card_theme = theme.unwrap_or_else(|| config.theme());

            // 1. 鑑定結果と画像の読み込み
            println!("[1/2] 鑑定結果を読み込み中...");
            let content = std::fs::read_to_string(&input)?;
            let result: AnalysisResult = serde_json::from_str(&content)?;
            let loaded = loader::load_image(&image)?;
            println!("✔ {} / {}\n", input.display(), loaded.file_name);

            let mut app = build_app(config.model.clone(), language, card_theme);
            app.load_image(loaded);
            if !app.restore_result(result) {
                return Err(DetectorError::Export(
                    "鑑定結果を復元できませんでした".to_string(),
                ));
            }

            // 2. カード出力
            println!("[2/2] レポートカードを出力中...");
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            report_outcome(export_card(&mut app, &output_dir).await?)?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Run {
            image,
            output,
            theme,
            language,
            model,
        } => {
            println!("🚀 ai-detector - 一括鑑定\n");

            let model = model.unwrap_or_else(|| config.model.clone());
            let card_theme = theme.unwrap_or_else(|| config.theme());
            if cli.verbose {
                println!("- モデル: {} / テーマ: {}", model, card_theme.id());
            }
            let mut app = build_app(model, language, card_theme);

            // 1. 画像読み込み
            println!("[1/3] 画像を読み込み中...");
            let loaded = loader::load_image(&image)?;
            println!("✔ {} ({} bytes)\n", loaded.file_name, loaded.byte_len);
            app.load_image(loaded);

            // 2. AI鑑定
            println!("[2/3] AI鑑定中...");
            let result = run_analysis(&mut app).await?;
            println!("✔ 鑑定完了");
            print_verdict(&result, language);

            // 3. カード出力
            println!("\n[3/3] レポートカードを出力中...");
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            report_outcome(export_card(&mut app, &output_dir).await?)?;

            println!("\n✅ 完了");
        }

        Commands::Config {
            set_api_key,
            set_theme,
            show,
        } => {
            let mut config = config;

            if let Some(maybe_key) = set_api_key {
                let key = match maybe_key {
                    Some(key) => key,
                    None => prompt_api_key()?,
                };
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(theme) = set_theme {
                config.set_theme(theme)?;
                println!("✔ テーマを設定しました: {}", theme.id());
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  テーマ: {}", config.theme().id());
                println!(
                    "  APIキー: {}",
                    if config.api_key.is_some() {
                        "設定済み"
                    } else {
                        "未設定"
                    }
                );
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn build_app(model: String, language: Language, card_theme: AppTheme) -> DetectorApp {
    let client = GeminiClient::new(model, config::key_source());
    DetectorApp::new(
        Box::new(client),
        Box::new(report::CardRenderer::default()),
        language,
        card_theme,
    )
}

/// スピナー付きで鑑定を実行し、状態機械から結果を取り出す
///
/// 鑑定エラーは状態機械側でローカライズ済みなので、そのまま表示して
/// 終了コード1で終わる。
async fn run_analysis(app: &mut DetectorApp) -> Result<AnalysisResult> {
    let t = i18n::text(app.state.language);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(t.analyzing);
    spinner.enable_steady_tick(Duration::from_millis(100));

    app.analyze().await;

    spinner.finish_and_clear();

    if let Some(message) = app.state.error.clone() {
        eprintln!("\n❌ {}", message);
        std::process::exit(1);
    }

    app.state
        .result
        .clone()
        .ok_or_else(|| DetectorError::ApiCall("鑑定結果が空です".to_string()))
}

/// スピナー付きでレポートカードを書き出す
async fn export_card(app: &mut DetectorApp, output_dir: &Path) -> Result<Option<ExportOutcome>> {
    let t = i18n::text(app.state.language);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(t.exporting);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = app.export_report(output_dir).await;

    spinner.finish_and_clear();
    outcome
}

/// 鑑定結果をコンソールに表示
fn print_verdict(result: &AnalysisResult, language: Language) {
    let t = i18n::text(language);

    let badge = match result.verdict {
        DetectionVerdict::AiGenerated => t.verdict_ai,
        DetectionVerdict::DigitalRender => t.verdict_render,
        DetectionVerdict::AuthenticPhoto => t.verdict_photo,
        DetectionVerdict::Uncertain => t.verdict_uncertain,
    };

    println!("\n━━━ {} ━━━", badge);
    println!("  {} {:>3}%", t.ai_label, result.probabilities.ai);
    println!("  {} {:>3}%", t.render_label, result.probabilities.render);
    println!("  {} {:>3}%", t.photo_label, result.probabilities.photo);
    println!("\n{}: {}", t.summary_label, result.summary);

    if !result.metrics.is_empty() {
        println!("\n{}:", t.metrics_label);
        for metric in &result.metrics {
            println!(
                "  {} {} {:>3}%",
                status_marker(metric.status),
                metric.name,
                metric.value
            );
        }
    }

    if !result.artifacts.is_empty() {
        println!("\n{}:", t.artifacts_label);
        for artifact in &result.artifacts {
            println!("  • {}: {}", artifact.label, artifact.description);
        }
    }

    if let Some(ref model) = result.suggested_model {
        println!("\n{}: {}", t.model_label, model);
    }
    if let Some(ref prompt) = result.suggested_prompt {
        println!("{}: {}", t.prompt_label, prompt);
    }
}

fn status_marker(status: MetricStatus) -> &'static str {
    match status {
        MetricStatus::AiConfirmed => "⚠",
        MetricStatus::Suspicious => "△",
        MetricStatus::Clean => "✓",
    }
}

fn report_outcome(outcome: Option<ExportOutcome>) -> Result<()> {
    match outcome {
        Some(ExportOutcome::Png(path)) => {
            println!("✔ カードを保存: {}", path.display());
            Ok(())
        }
        Some(ExportOutcome::PrintFallback(path)) => {
            println!("⚠ PNG出力に失敗したため印刷用PDFで保存: {}", path.display());
            Ok(())
        }
        None => Err(DetectorError::Export(
            "エクスポートを開始できませんでした".to_string(),
        )),
    }
}

fn prompt_api_key() -> Result<String> {
    dialoguer::Password::new()
        .with_prompt("Gemini API Key")
        .interact()
        .map_err(|e| DetectorError::Config(format!("APIキー入力エラー: {}", e)))
}
