//! 飞书通知发送器模块
//!
//! 通过飞书自定义机器人webhook投递卡片消息

use crate::error::NotificationError;
use crate::notification::payload::LarkPayload;
use crate::notification::sender::{DeliveryReceipt, NotificationSender};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

/// 飞书webhook响应
///
/// 新旧两种格式的字段可能同时出现：`code`/`msg` 与 `StatusCode`/`StatusMessage`。
#[derive(Debug, Default, Deserialize)]
struct LarkReply {
    code: Option<i64>,
    msg: Option<String>,
    #[serde(rename = "StatusCode")]
    status_code: Option<i64>,
    #[serde(rename = "StatusMessage")]
    status_message: Option<String>,
}

impl LarkReply {
    fn code(&self) -> Option<i64> {
        self.code.or(self.status_code)
    }

    fn message(&self) -> Option<&str> {
        self.msg.as_deref().or(self.status_message.as_deref())
    }
}

/// 飞书通知发送器
pub struct LarkSender {
    /// HTTP客户端
    client: Client,
}

impl LarkSender {
    /// 创建新的飞书发送器
    ///
    /// # 参数
    /// * `timeout` - 请求超时时间
    ///
    /// # 返回
    /// * `Result<Self, NotificationError>` - 发送器实例
    pub fn new(timeout: Duration) -> Result<Self, NotificationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// 根据HTTP状态和响应体判定投递结果
    fn interpret(
        status: u16,
        success: bool,
        body: &str,
    ) -> Result<DeliveryReceipt, NotificationError> {
        let reply = serde_json::from_str::<LarkReply>(body).ok();
        let code = reply.as_ref().and_then(LarkReply::code);
        let message = reply
            .as_ref()
            .and_then(LarkReply::message)
            .unwrap_or(body)
            .to_string();

        match (success, code) {
            (true, Some(0)) | (true, None) => Ok(DeliveryReceipt {
                status,
                code: 0,
                message,
            }),
            (_, code) => Err(NotificationError::Rejected {
                status,
                code: code.unwrap_or(-1),
                message,
            }),
        }
    }
}

#[async_trait]
impl NotificationSender for LarkSender {
    async fn send(
        &self,
        webhook_url: &str,
        payload: &LarkPayload,
    ) -> Result<DeliveryReceipt, NotificationError> {
        debug!("发送消息到飞书webhook: {}", webhook_url);

        let response = self.client.post(webhook_url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("响应状态码: {}, 内容: {}", status, body);

        match Self::interpret(status.as_u16(), status.is_success(), &body) {
            Ok(receipt) => {
                info!("飞书消息发送成功");
                Ok(receipt)
            }
            Err(e) => {
                error!("飞书消息发送失败: {}", e);
                Err(e)
            }
        }
    }
}
