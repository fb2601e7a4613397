use crate::i18n::Language;
use crate::theme::AppTheme;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ai-detector")]
#[command(about = "AI画像鑑定・フォレンジックレポートカード生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を鑑定してJSONを出力
    Analyze {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 出力JSONファイル（デフォルト: 画像と同じ場所のresult.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 鑑定言語 (zh/en)
        #[arg(short, long, value_enum, default_value = "zh")]
        language: Language,

        /// Geminiモデル（省略時は設定値）
        #[arg(short, long)]
        model: Option<String>,
    },

    /// 鑑定結果JSONからレポートカードを生成
    Export {
        /// 鑑定結果JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 鑑定した画像ファイル
        #[arg(short, long, required = true)]
        image: PathBuf,

        /// 出力ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// カードテーマ (midnight/pure/cyberpunk/nordic、省略時は設定値)
        #[arg(short, long, value_enum)]
        theme: Option<AppTheme>,

        /// カード言語 (zh/en)
        #[arg(short, long, value_enum, default_value = "zh")]
        language: Language,
    },

    /// 鑑定からレポートカード出力まで一括実行
    Run {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 出力ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// カードテーマ (midnight/pure/cyberpunk/nordic、省略時は設定値)
        #[arg(short, long, value_enum)]
        theme: Option<AppTheme>,

        /// 言語 (zh/en)
        #[arg(short, long, value_enum, default_value = "zh")]
        language: Language,

        /// Geminiモデル（省略時は設定値）
        #[arg(short, long)]
        model: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定（値を省略すると対話入力）
        #[arg(long, num_args = 0..=1)]
        set_api_key: Option<Option<String>>,

        /// デフォルトテーマを設定
        #[arg(long, value_enum)]
        set_theme: Option<AppTheme>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
