use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// 字幕資料庫查詢條件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleQuery {
    pub language: String,
    pub movie_hash: String,
    pub movie_byte_size: u64,
    pub episode: Option<u32>,
    pub season_number: Option<u32>,
}

/// 搜尋結果中的一筆字幕，只存在於排序期間
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubtitleCandidate {
    #[serde(rename = "IDSubtitleFile", deserialize_with = "deserialize_id")]
    pub subtitle_id: String,
    #[serde(rename = "SubBad", default, deserialize_with = "deserialize_flag")]
    pub bad: bool,
    #[serde(rename = "Score", default, deserialize_with = "deserialize_score")]
    pub score: f64,
    #[serde(rename = "SubFromTrusted", default, deserialize_with = "deserialize_flag")]
    pub trusted: bool,
    #[serde(rename = "SubDownloadLink", default)]
    pub download_link: Option<String>,
    #[serde(rename = "SubFormat", default)]
    pub format: Option<String>,
}

/// 遠端的布林欄位可能是 `true`/`false`、`0`/`1` 或它們的字串形式
#[must_use]
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "" | "0" | "false" | "no" => Some(false),
            "1" | "true" | "yes" => Some(true),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v != 0.0),
        },
        _ => None,
    }
}

/// 只接受有限數值，`NaN` 與 `inf` 視為無法解析
#[must_use]
pub fn parse_score(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    parse_flag(&value).ok_or_else(|| de::Error::custom(format!("無法解析布林欄位: {value}")))
}

/// 無法解析的分數記為 0，該筆候選排在有效分數之後
fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_score(&value).unwrap_or(0.0))
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("無效的字幕 ID: {other}"))),
    }
}
