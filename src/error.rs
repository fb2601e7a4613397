use thiserror::Error;

#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum DetectorError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`ai-detector config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("APIキーが無効または期限切れです: {0}")]
    CredentialRejected(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("レンダリングエラー: {0}")]
    Render(String),

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("エクスポートエラー: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, DetectorError>;
