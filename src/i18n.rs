use clap::ValueEnum;

use crate::error::DetectorError;

/// 表示言語（要約文とUIラベルの言語）
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
    /// 中国語（簡体字）
    Zh,
    /// 英語
    En,
}

impl Default for Language {
    fn default() -> Self {
        Language::Zh
    }
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }
}

/// UIラベル文字列テーブル（言語ごとに1つ）
#[derive(Debug)]
pub struct UiText {
    pub app_title: &'static str,
    pub app_subtitle: &'static str,
    pub upload_title: &'static str,
    pub upload_hint: &'static str,
    pub analyze_btn: &'static str,
    pub dist_title: &'static str,
    pub ai_label: &'static str,
    pub render_label: &'static str,
    pub photo_label: &'static str,
    pub summary_label: &'static str,
    pub metrics_label: &'static str,
    pub artifacts_label: &'static str,
    pub prompt_label: &'static str,
    pub reset_btn: &'static str,
    pub export_btn: &'static str,
    pub exporting: &'static str,
    pub model_label: &'static str,
    pub analyzing: &'static str,
    pub footer_note: &'static str,
    pub verdict_ai: &'static str,
    pub verdict_render: &'static str,
    pub verdict_photo: &'static str,
    pub verdict_uncertain: &'static str,
    pub err_no_key: &'static str,
    pub err_bad_key: &'static str,
    pub err_generic: &'static str,
}

pub const ZH: UiText = UiText {
    app_title: "AI 鉴别专家",
    app_subtitle: "图像真实性鉴定工具",
    upload_title: "丢张图进来检测",
    upload_hint: "点击或拖拽上传图片",
    analyze_btn: "一键探测",
    dist_title: "来源可能性分布",
    ai_label: "AI 生成几率",
    render_label: "CG 渲染几率",
    photo_label: "真实照片几率",
    summary_label: "分析摘要",
    metrics_label: "数字指纹分析",
    artifacts_label: "异常痕迹",
    prompt_label: "推测 AI 生成咒语",
    reset_btn: "再测一张",
    export_btn: "导出报告卡片",
    exporting: "正在生成...",
    model_label: "疑似机型/软件",
    analyzing: "正在破解像素密码...",
    footer_note: "本实验室结果通过像素指纹分析得出，仅供交流研究参考。",
    verdict_ai: "🤖 AI 魔法产物",
    verdict_render: "🎮 3D 虚拟渲染",
    verdict_photo: "📷 现实相机实拍",
    verdict_uncertain: "还在思考中...",
    err_no_key: "请先配置 API Key",
    err_bad_key: "API Key 无效或已过期，请重新配置",
    err_generic: "实验室能量波动，请重试...",
};

pub const EN: UiText = UiText {
    app_title: "AI Detective",
    app_subtitle: "FORENSIC ANALYSIS TOOL",
    upload_title: "Drop image here",
    upload_hint: "Click or drag to upload",
    analyze_btn: "Detect",
    dist_title: "Probability Distribution",
    ai_label: "AI Prob.",
    render_label: "CG Prob.",
    photo_label: "Photo Prob.",
    summary_label: "Summary",
    metrics_label: "Fingerprint Analysis",
    artifacts_label: "Artifacts",
    prompt_label: "Prompt Reversal",
    reset_btn: "New Scan",
    export_btn: "Export Report",
    exporting: "Generating...",
    model_label: "Suspected Engine",
    analyzing: "Cracking pixels...",
    footer_note: "Results based on digital fingerprint analysis.",
    verdict_ai: "AI CREATED",
    verdict_render: "DIGITAL RENDER",
    verdict_photo: "REAL PHOTO",
    verdict_uncertain: "THINKING...",
    err_no_key: "Please configure API Key first",
    err_bad_key: "Invalid or expired API Key, please reconfigure",
    err_generic: "Laboratory energy flux, please retry...",
};

/// 言語に対応するラベルテーブルを返す
pub fn text(language: Language) -> &'static UiText {
    match language {
        Language::Zh => &ZH,
        Language::En => &EN,
    }
}

/// 解析エラーをユーザー向けメッセージに変換する
///
/// APIキー未設定・キー拒否の2種だけ専用文言を持ち、
/// それ以外（通信断・パース失敗など）は汎用メッセージに落とす。
pub fn error_message(error: &DetectorError, language: Language) -> &'static str {
    let t = text(language);
    match error {
        DetectorError::MissingApiKey => t.err_no_key,
        DetectorError::CredentialRejected(_) => t.err_bad_key,
        _ => t.err_generic,
    }
}

// =====================================================
// テスト
// =====================================================
