//! 飞书消息体模块
//!
//! 卡片文档到飞书自定义机器人 `interactive` 消息的序列化结构，
//! 以及签名校验所需的 `timestamp`/`sign` 字段。

use crate::error::NotificationError;
use crate::notification::card::{CardDocument, CardElement};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 飞书webhook消息体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LarkPayload {
    /// 签名时间戳（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// 签名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<String>,
    pub msg_type: String,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub config: CardConfig,
    pub header: CardHeader,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub wide_screen_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardHeader {
    pub title: Text,
}

/// 文本对象，`tag` 为 `plain_text` 或 `lark_md`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub tag: String,
    pub content: String,
}

impl Text {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            tag: "plain_text".to_string(),
            content: content.into(),
        }
    }

    pub fn lark_md(content: impl Into<String>) -> Self {
        Self {
            tag: "lark_md".to_string(),
            content: content.into(),
        }
    }
}

/// 卡片元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum Element {
    Hr,
    Action { actions: Vec<Button> },
    Div { text: Text },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub tag: String,
    pub url: String,
    pub text: Text,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&CardElement> for Element {
    fn from(element: &CardElement) -> Self {
        match element {
            CardElement::Divider => Element::Hr,
            CardElement::Button { label, url } => Element::Action {
                actions: vec![Button {
                    tag: "button".to_string(),
                    url: url.clone(),
                    text: Text::plain(label.as_str()),
                    kind: "primary".to_string(),
                }],
            },
            CardElement::TextBlock { content } => Element::Div {
                text: Text::lark_md(content.as_str()),
            },
        }
    }
}

impl LarkPayload {
    /// 由卡片文档生成消息体（宽屏模式）
    pub fn from_card(card: &CardDocument) -> Self {
        Self {
            timestamp: None,
            sign: None,
            msg_type: "interactive".to_string(),
            card: Card {
                config: CardConfig {
                    wide_screen_mode: true,
                },
                header: CardHeader {
                    title: Text::plain(card.header.as_str()),
                },
                elements: card.elements.iter().map(Element::from).collect(),
            },
        }
    }

    /// 附加签名字段
    ///
    /// # 参数
    /// * `secret` - 机器人签名密钥
    /// * `timestamp` - Unix时间戳（秒）
    pub fn with_signature(
        mut self,
        secret: &str,
        timestamp: i64,
    ) -> Result<Self, NotificationError> {
        self.sign = Some(sign(secret, timestamp)?);
        self.timestamp = Some(timestamp.to_string());
        Ok(self)
    }

    /// 序列化为JSON值
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// 计算飞书webhook签名
///
/// 以 `"{timestamp}\n{secret}"` 为密钥对空消息做 HMAC-SHA256，再做 Base64 编码。
pub fn sign(secret: &str, timestamp: i64) -> Result<String, NotificationError> {
    let key = format!("{timestamp}\n{secret}");
    let mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| NotificationError::ConfigError(format!("签名密钥无效: {e}")))?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
