//! Recognition replies: turning model output into ingredient lines.
//!
//! The vision and language models are asked to answer one ingredient per
//! line in the form `名称：数量（约重量）`. Everything here is plain text
//! handling; the HTTP call itself lives in the CLI.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::RecognizedIngredient;
use crate::units::{JIN_IN_GRAMS, KILOGRAM_UNIT, format_grams, to_fixed_2};

pub const DEFAULT_API_URL: &str = "https://api.siliconflow.cn/v1/chat/completions";
pub const DEFAULT_VISION_MODEL: &str = "deepseek-ai/deepseek-vl2";
pub const DEFAULT_TEXT_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";
pub const TEMPERATURE: f32 = 0.2;
pub const MAX_TOKENS: u32 = 1000;

pub const IMAGE_SYSTEM_PROMPT: &str = "你是一个专业的食材识别助手。请识别图片中的所有食材，并按以下格式返回结果：

1. 食材名称：数量 x 单位（估计重量，单位为克）
2. 食材名称：数量 x 单位（估计重量，单位为克）
...

例如：
1. 西红柿：2个（约300克）
2. 洋葱：1个（约150克）
3. 鸡胸肉：1块（约200克）

请尽可能详细地描述食材的种类、数量和估计重量。如果无法确定准确数量或重量，请给出合理的估计值。
如果无法识别图片中的内容，请回复\"无法识别图片中的食材\"。

请只返回食材列表，不要有其他解释或描述。";

pub const IMAGE_USER_PROMPT: &str = "请识别图片中的所有食材，包括种类、数量和估计重量。";

pub const VOICE_SYSTEM_PROMPT: &str = "你是一个专业的食材整理助手。用户会给出一段语音转写的食材清单，已经按句切分为 JSON 数组，\
部分条目附带了预先解析出的数量（quantity）和重量（weight）。请整理出所有食材，并按以下格式返回结果：

1. 食材名称：数量（约重量）
2. 食材名称：数量（约重量）

例如：
1. 土豆：3个（约450克）
2. 猪肉：1斤（约500克）

已给出的数量和重量请直接沿用，缺失的请给出合理的估计值。请只返回食材列表，不要有其他解释或描述。";

static NUMBERED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s*").expect("valid prefix pattern"));
static INGREDIENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)：(.+?)（约(.+?)）$").expect("valid line pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static VOICE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)(斤|克|g|千克|公斤|个|包|袋|盒)").expect("valid amount pattern")
});

const CHINESE_DIGITS: [(char, char); 10] = [
    ('一', '1'),
    ('二', '2'),
    ('三', '3'),
    ('四', '4'),
    ('五', '5'),
    ('六', '6'),
    ('七', '7'),
    ('八', '8'),
    ('九', '9'),
    // Only the first character of "10" is substituted.
    ('十', '1'),
];

/// Parse a reply into one entry per non-blank line.
///
/// A leading `1. ` style number is dropped. Lines that do not follow
/// `名称：数量（约重量）` become a bare name with no amounts.
#[must_use]
pub fn parse_recognition_text(text: &str) -> Vec<RecognizedIngredient> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> RecognizedIngredient {
    let clean = NUMBERED_PREFIX.replace(line, "");
    let clean = clean.trim();

    if let Some(caps) = INGREDIENT_LINE.captures(clean) {
        return RecognizedIngredient {
            name: caps[1].trim().to_string(),
            quantity: caps[2].trim().to_string(),
            weight: caps[3].trim().to_string(),
        };
    }

    RecognizedIngredient {
        name: clean.to_string(),
        quantity: String::new(),
        weight: String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// The model answered with nothing usable.
    Empty,
    /// The reply reports an error or failure.
    Failed,
    Text(String),
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Classify a raw reply, unwrapping structured content parts first.
#[must_use]
pub fn interpret_reply(raw: &str) -> RecognitionOutcome {
    let text = extract_text_parts(raw).unwrap_or_else(|| raw.to_string());

    if text.trim().is_empty() {
        RecognitionOutcome::Empty
    } else if text.to_lowercase().contains("error") || text.contains("失败") || text.contains("错误")
    {
        RecognitionOutcome::Failed
    } else {
        RecognitionOutcome::Text(text)
    }
}

fn extract_text_parts(raw: &str) -> Option<String> {
    let parts: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    let parts: Vec<ContentPart> = parts
        .into_iter()
        .filter_map(|p| serde_json::from_value(p).ok())
        .collect();
    if !parts.iter().any(|p| p.kind == "text") {
        return None;
    }
    Some(
        parts
            .into_iter()
            .filter(|p| p.kind == "text")
            .map(|p| p.text.unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Clean up speech-to-text output before it is split into lines.
#[must_use]
pub fn normalize_voice_text(text: &str) -> String {
    let mut processed = WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned();

    processed = processed
        .chars()
        .map(|c| {
            CHINESE_DIGITS
                .iter()
                .find(|(zh, _)| *zh == c)
                .map_or(c, |(_, digit)| *digit)
        })
        .collect();
    processed = processed.replace('两', "2").replace('半', ".5");
    processed = processed.replace("。。", "。").replace("，，", "，");

    if !processed.ends_with('。') && !processed.ends_with('，') {
        processed.push('。');
    }

    // The last separator closes the list.
    if let Some((idx, sep)) = processed
        .char_indices()
        .rev()
        .find(|(_, c)| matches!(c, ',' | '，' | '。'))
        .filter(|(_, c)| *c != '。')
    {
        processed.replace_range(idx..idx + sep.len_utf8(), "。");
    }

    processed
}

/// A sentence of spoken input with any amount found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceLine {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

/// Split normalized voice text into sentences and pre-parse their amounts.
///
/// `斤`, `克`/`g` and `千克`/`公斤` amounts also yield a weight in grams or
/// kilograms; count units (`个`, `包`, `袋`, `盒`) only yield a quantity.
#[must_use]
pub fn voice_lines(text: &str) -> Vec<VoiceLine> {
    text.split(['。', '，', ','])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let Some(caps) = VOICE_AMOUNT.captures(line) else {
                return VoiceLine {
                    text: line.to_string(),
                    quantity: None,
                    weight: None,
                };
            };
            let unit = &caps[2];
            let amount: f64 = caps[1].parse().unwrap_or_default();
            let weight = match unit {
                "斤" => Some(format_grams(amount * JIN_IN_GRAMS)),
                "克" | "g" => Some(format_grams(amount)),
                "千克" | "公斤" => Some(format!("{}{KILOGRAM_UNIT}", to_fixed_2(amount))),
                _ => None,
            };
            VoiceLine {
                text: line.to_string(),
                quantity: Some(format!("{amount}{unit}")),
                weight,
            }
        })
        .collect()
}

// --- Chat completion payloads ---

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: serde_json::Value::String(content.to_string()),
        }
    }
}

#[must_use]
pub fn image_request(model: &str, image_base64: &str) -> ChatRequest {
    let user = ChatMessage {
        role: "user".to_string(),
        content: serde_json::json!([
            { "type": "text", "text": IMAGE_USER_PROMPT },
            {
                "type": "image_url",
                "image_url": { "url": format!("data:image/jpeg;base64,{image_base64}") }
            }
        ]),
    };
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::text("system", IMAGE_SYSTEM_PROMPT), user],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

pub fn voice_request(model: &str, lines: &[VoiceLine]) -> Result<ChatRequest> {
    let payload = serde_json::to_string(lines)?;
    Ok(ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::text("system", VOICE_SYSTEM_PROMPT),
            ChatMessage::text("user", &payload),
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    })
}

/// The first choice's content: strings as-is, structured content as JSON.
pub fn reply_content(response: ChatResponse) -> Result<String> {
    let Some(choice) = response.choices.into_iter().next() else {
        bail!("Recognition API returned no choices");
    };
    Ok(match choice.message.content {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
