use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::error::{DetectorError, Result};

/// 読み込み済み画像（解析・カード出力の入力）
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub file_name: String,
    pub mime_type: String,
    /// Base64エンコード済み画像データ
    pub data: String,
    /// 元バイト列のSHA-256（16進64文字）
    pub fingerprint: String,
    pub byte_len: usize,
}

impl LoadedImage {
    /// バイト列から画像を構築する
    ///
    /// MIMEタイプはバイト列の先頭から推定し、判別できない場合は
    /// "image/jpeg" として扱う。デコード可能かどうかは検証しない。
    pub fn from_bytes(file_name: &str, bytes: &[u8]) -> Self {
        let mime_type = image::guess_format(bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "image/jpeg".to_string());
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let fingerprint = hex::encode(hasher.finalize());
        LoadedImage {
            file_name: file_name.to_string(),
            mime_type,
            data: STANDARD.encode(bytes),
            fingerprint,
            byte_len: bytes.len(),
        }
    }

    /// Data URL形式（"data:image/png;base64,..."）に変換
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Data URLから復元
    pub fn from_data_url(file_name: &str, data_url: &str) -> Result<Self> {
        let base64_data = extract_base64_from_data_url(data_url)
            .ok_or_else(|| DetectorError::ImageLoad(format!("Data URLが不正: {}", file_name)))?;
        let bytes = STANDARD
            .decode(base64_data)
            .map_err(|e| DetectorError::ImageLoad(format!("Base64デコードに失敗: {}", e)))?;
        Ok(Self::from_bytes(file_name, &bytes))
    }

    /// カード右下に印字する短縮ハッシュ（"HASH_" + 16進9文字）
    pub fn hash_stamp(&self) -> String {
        format!("HASH_{}", self.fingerprint[..9].to_uppercase())
    }
}

/// 画像ファイルを読み込む
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    if !path.exists() {
        return Err(DetectorError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    Ok(LoadedImage::from_bytes(&file_name, &bytes))
}

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,..." 形式のData URL
///
/// # Returns
/// MIMEタイプ（例: "image/jpeg"）、抽出失敗時は"image/jpeg"をデフォルトとして返す
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .unwrap_or("image/jpeg")
}

// =====================================================
// テスト
// =====================================================
