//! 鑑定指示プロンプト
//!
//! 画像と一緒にGeminiへ送る固定指示文。要約の言語だけが異なり、
//! 3分類タクソノミーと出力要件は両言語で共通。

use crate::i18n::Language;

/// 中国語向け鑑定プロンプト
const PROMPT_ZH: &str = r#"你是一个数字图像专家实验室。请深度分析此图并将其归类为以下三类之一：
    - AI_GENERATED: AI 生成（如 Midjourney, DALL-E, Stable Diffusion）
    - DIGITAL_RENDER: 3D 渲染/CG（如 Blender, Unreal Engine, Octane）
    - AUTHENTIC_PHOTO: 真实摄影（手机或相机实拍）

    要求：
    1. 【摘要】：必须用通俗、活泼的中文写一段分析摘要（50字左右）。
    2. 【提示词】：如果判定为 AI，请务必根据画面推测其可能的英文咒语 (Prompt)。
    3. 【概率分布】：必须返回三个维度的可能性百分比 (0-100 整数)：AI 几率、渲染几率、照片几率。
    4. 【数值】：所有百分比数值必须为整数。
    5. 【结论】：verdict 必须是对应的英文枚举值。

    JSON Schema 必须严格遵守。"#;

/// 英語向け鑑定プロンプト
const PROMPT_EN: &str = r#"You are a digital image forensics laboratory. Analyze this image in depth and classify it into exactly one of:
    - AI_GENERATED: generative AI output (e.g. Midjourney, DALL-E, Stable Diffusion)
    - DIGITAL_RENDER: 3D render / CG (e.g. Blender, Unreal Engine, Octane)
    - AUTHENTIC_PHOTO: real photography (phone or camera)

    Requirements:
    1. [Summary]: write a short, lively English summary of the analysis (about 50 words).
    2. [Prompt]: if the verdict is AI, you must reverse-engineer the likely English generation prompt from the picture.
    3. [Distribution]: return probability percentages (integers 0-100) for all three dimensions: AI, render, photo.
    4. [Numbers]: all percentage values must be integers.
    5. [Verdict]: verdict must be the corresponding English enum value.

    The JSON Schema must be followed strictly."#;

/// 言語に対応する鑑定指示を返す
pub fn analysis_prompt(language: Language) -> &'static str {
    match language {
        Language::Zh => PROMPT_ZH,
        Language::En => PROMPT_EN,
    }
}
