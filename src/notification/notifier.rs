//! 通知编排模块
//!
//! 渲染模板、构建卡片、签名并投递。投递失败只记录日志和指标，
//! 不会向事件处理流程传播。

use crate::config::types::NotifierSettings;
use crate::error::NotificationError;
use crate::event::EventContext;
use crate::logging::LoggingSystem;
use crate::notification::card::CardBuilder;
use crate::notification::payload::LarkPayload;
use crate::notification::sender::{DeliveryReceipt, NotificationSender};
use crate::notification::template::TemplateRenderer;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 通知渠道名称（日志和指标使用）
const CHANNEL: &str = "lark";

/// 一次通知的结果
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// 投递成功
    Delivered(DeliveryReceipt),
    /// 投递失败
    Failed(NotificationError),
    /// 未投递（项目未配置或已禁用）
    Skipped(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DeliveryOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DeliveryOutcome::Skipped(_))
    }
}

/// 单个项目的飞书通知器
pub struct Notifier {
    settings: NotifierSettings,
    renderer: TemplateRenderer,
    builder: CardBuilder,
    sender: Arc<dyn NotificationSender>,
    logging: Option<Arc<LoggingSystem>>,
}

impl Notifier {
    /// 创建通知器
    ///
    /// # 参数
    /// * `settings` - 项目通知设置
    /// * `sender` - 消息投递实现
    pub fn new(settings: NotifierSettings, sender: Arc<dyn NotificationSender>) -> Self {
        let builder = CardBuilder::default();
        let renderer = TemplateRenderer::with_separator(
            &settings.message_template,
            &builder.syntax().separator,
        );

        Self {
            settings,
            renderer,
            builder,
            sender,
            logging: None,
        }
    }

    /// 附加日志系统，用于记录通知日志和指标
    pub fn with_logging(mut self, logging: Arc<LoggingSystem>) -> Self {
        self.logging = Some(logging);
        self
    }

    pub fn settings(&self) -> &NotifierSettings {
        &self.settings
    }

    /// webhook和模板都已配置
    pub fn is_configured(&self) -> bool {
        !self.settings.webhook.trim().is_empty()
            && !self.settings.message_template.trim().is_empty()
    }

    /// 构建消息体，配置了密钥时使用当前时间签名
    pub fn build_message(&self, event: &EventContext) -> Result<LarkPayload, NotificationError> {
        self.build_message_at(event, chrono::Utc::now().timestamp())
    }

    /// 构建消息体，使用指定的签名时间戳
    pub fn build_message_at(
        &self,
        event: &EventContext,
        timestamp: i64,
    ) -> Result<LarkPayload, NotificationError> {
        let card = self.builder.build_template(&self.renderer, event);
        let payload = LarkPayload::from_card(&card);

        match self.settings.secret.as_deref() {
            Some(secret) => payload.with_signature(secret, timestamp),
            None => Ok(payload),
        }
    }

    /// 发送事件通知
    ///
    /// 永远不会返回错误：失败会被记录并体现在 [`DeliveryOutcome`] 中。
    pub async fn notify(&self, event: &EventContext) -> DeliveryOutcome {
        let project = self.settings.project.as_str();
        debug!("收到事件通知, 项目: {}, 标签: {:?}", project, event.tags);

        if !self.settings.enabled {
            debug!("项目 {} 已禁用通知，跳过", project);
            return DeliveryOutcome::Skipped(format!("项目 {project} 已禁用"));
        }
        if !self.is_configured() {
            warn!("项目 {} 未配置webhook或消息模板，跳过通知", project);
            return DeliveryOutcome::Skipped(format!("项目 {project} 未配置"));
        }

        let outcome = match self.build_message(event) {
            Ok(payload) => {
                debug!("构建的消息体: {}", payload.to_json());
                debug!("webhook地址: {}", self.settings.webhook);
                match self.sender.send(&self.settings.webhook, &payload).await {
                    Ok(receipt) => DeliveryOutcome::Delivered(receipt),
                    Err(e) => DeliveryOutcome::Failed(e),
                }
            }
            Err(e) => DeliveryOutcome::Failed(e),
        };

        match &outcome {
            DeliveryOutcome::Delivered(receipt) => {
                info!("项目 {} 通知发送成功: {}", project, receipt.message);
                self.record(true, None);
            }
            DeliveryOutcome::Failed(e) => {
                error!("项目 {} 通知发送失败: {}", project, e);
                self.record(false, Some(&e.to_string()));
            }
            DeliveryOutcome::Skipped(_) => {}
        }

        outcome
    }

    fn record(&self, success: bool, error: Option<&str>) {
        if let Some(ref logging) = self.logging {
            logging.notification_log(CHANNEL, &self.settings.project, success, error);
        }
    }
}
