//! 通知发送器模块
//!
//! 定义通知投递的trait和基础实现

use crate::error::NotificationError;
use crate::notification::payload::LarkPayload;
use async_trait::async_trait;

/// 一次成功投递的回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// HTTP状态码
    pub status: u16,
    /// 飞书返回的业务码（0表示成功）
    pub code: i64,
    /// 飞书返回的消息
    pub message: String,
}

/// 通知发送器trait
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 投递消息
    ///
    /// # 参数
    /// * `webhook_url` - 机器人webhook地址
    /// * `payload` - 消息体
    ///
    /// # 返回
    /// * `Result<DeliveryReceipt, NotificationError>` - 投递回执或错误
    async fn send(
        &self,
        webhook_url: &str,
        payload: &LarkPayload,
    ) -> Result<DeliveryReceipt, NotificationError>;
}

/// 空的通知发送器实现（用于演练或禁用通知）
pub struct NoOpSender;

#[async_trait]
impl NotificationSender for NoOpSender {
    async fn send(
        &self,
        _webhook_url: &str,
        _payload: &LarkPayload,
    ) -> Result<DeliveryReceipt, NotificationError> {
        Ok(DeliveryReceipt {
            status: 200,
            code: 0,
            message: "dry run".to_string(),
        })
    }
}
