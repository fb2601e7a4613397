use clap::ValueEnum;

/// グラデーション（開始色, 終了色）
pub type Gradient = ([u8; 3], [u8; 3]);

/// レポートカードのテーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AppTheme {
    /// 深夜のラボ（デフォルト）
    Midnight,
    /// 白基調
    Pure,
    /// ネオン
    Cyberpunk,
    /// 北欧配色
    Nordic,
}

impl Default for AppTheme {
    fn default() -> Self {
        AppTheme::Midnight
    }
}

/// テーマごとの視覚トークン一式
#[derive(Debug, Clone, Copy)]
pub struct ThemeTokens {
    pub background: [u8; 3],
    pub card: [u8; 3],
    pub panel: [u8; 3],
    pub text_primary: [u8; 3],
    pub text_muted: [u8; 3],
    pub border: [u8; 3],
    pub accent: [u8; 3],
    pub ai_bar: Gradient,
    pub render_bar: Gradient,
    pub photo_bar: Gradient,
}

const MIDNIGHT: ThemeTokens = ThemeTokens {
    background: [0x06, 0x08, 0x0c],
    card: [0x0f, 0x12, 0x1a],
    panel: [0x0a, 0x0c, 0x12],
    text_primary: [0xf1, 0xf5, 0xf9],
    text_muted: [0x64, 0x74, 0x8b],
    border: [0x23, 0x27, 0x34],
    accent: [0x81, 0x8c, 0xf8],
    ai_bar: ([0x93, 0x33, 0xea], [0xec, 0x48, 0x99]),
    render_bar: ([0x08, 0x91, 0xb2], [0x3b, 0x82, 0xf6]),
    photo_bar: ([0x05, 0x96, 0x69], [0x22, 0xc5, 0x5e]),
};

const PURE: ThemeTokens = ThemeTokens {
    background: [0xf8, 0xfa, 0xfc],
    card: [0xff, 0xff, 0xff],
    panel: [0xf1, 0xf5, 0xf9],
    text_primary: [0x0f, 0x17, 0x2a],
    text_muted: [0x64, 0x74, 0x8b],
    border: [0xe2, 0xe8, 0xf0],
    accent: [0x4f, 0x46, 0xe5],
    ai_bar: ([0x7c, 0x3a, 0xed], [0xdb, 0x27, 0x77]),
    render_bar: ([0x0e, 0x74, 0x90], [0x25, 0x63, 0xeb]),
    photo_bar: ([0x04, 0x78, 0x57], [0x16, 0xa3, 0x4a]),
};

const CYBERPUNK: ThemeTokens = ThemeTokens {
    background: [0x0d, 0x02, 0x21],
    card: [0x1a, 0x0b, 0x2e],
    panel: [0x12, 0x06, 0x27],
    text_primary: [0xfd, 0xf4, 0xff],
    text_muted: [0xc0, 0x84, 0xfc],
    border: [0x4c, 0x1d, 0x95],
    accent: [0x22, 0xd3, 0xee],
    ai_bar: ([0xd9, 0x46, 0xef], [0xec, 0x48, 0x99]),
    render_bar: ([0x22, 0xd3, 0xee], [0x0e, 0xa5, 0xe9]),
    photo_bar: ([0xa3, 0xe6, 0x35], [0x4a, 0xde, 0x80]),
};

const NORDIC: ThemeTokens = ThemeTokens {
    background: [0x2e, 0x34, 0x40],
    card: [0x3b, 0x42, 0x52],
    panel: [0x43, 0x4c, 0x5e],
    text_primary: [0xec, 0xef, 0xf4],
    text_muted: [0xd8, 0xde, 0xe9],
    border: [0x4c, 0x56, 0x6a],
    accent: [0x88, 0xc0, 0xd0],
    ai_bar: ([0xb4, 0x8e, 0xad], [0xbf, 0x61, 0x6a]),
    render_bar: ([0x88, 0xc0, 0xd0], [0x5e, 0x81, 0xac]),
    photo_bar: ([0xa3, 0xbe, 0x8c], [0x8f, 0xbc, 0xbb]),
};

impl AppTheme {
    /// 設定ファイルに保存する識別子
    pub fn id(&self) -> &'static str {
        match self {
            AppTheme::Midnight => "midnight",
            AppTheme::Pure => "pure",
            AppTheme::Cyberpunk => "cyberpunk",
            AppTheme::Nordic => "nordic",
        }
    }

    /// 識別子からテーマを引く（未知の識別子はNone）
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "midnight" => Some(AppTheme::Midnight),
            "pure" => Some(AppTheme::Pure),
            "cyberpunk" => Some(AppTheme::Cyberpunk),
            "nordic" => Some(AppTheme::Nordic),
            _ => None,
        }
    }

    pub fn all() -> &'static [AppTheme] {
        &[
            AppTheme::Midnight,
            AppTheme::Pure,
            AppTheme::Cyberpunk,
            AppTheme::Nordic,
        ]
    }

    pub fn tokens(&self) -> &'static ThemeTokens {
        match self {
            AppTheme::Midnight => &MIDNIGHT,
            AppTheme::Pure => &PURE,
            AppTheme::Cyberpunk => &CYBERPUNK,
            AppTheme::Nordic => &NORDIC,
        }
    }
}

// =====================================================
// テスト
// =====================================================
