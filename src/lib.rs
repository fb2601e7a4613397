//! AI画像鑑定・フォレンジックレポートカード生成ツール
//!
//! 画像をGemini APIで鑑定し、AI生成/CG/実写の判定と確率分布を
//! テーマ付きレポートカード（PNG、失敗時はPDF）として出力する。

pub mod analyzer;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod i18n;
pub mod loader;
pub mod report;
pub mod theme;

pub use error::{DetectorError, Result};
