//! Lark Sentry - 错误追踪事件的飞书卡片通知
//!
//! 将错误追踪系统的事件渲染为飞书（Lark）交互式卡片并推送到机器人webhook：
//! - 基于占位符的消息模板渲染，缺失数据显示为 `[not set]`
//! - `<br>` 分段、`<hr>` 分割线、`<btn:文字>url` 按钮
//! - 可选的webhook签名
//! - 投递失败只记录日志，不影响事件处理

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod notification;

// 重新导出主要类型
pub use config::{Config, GlobalConfig, ProjectConfig};
pub use error::LarkSentryError;
pub use event::{EventContext, NOT_SET};
pub use notification::{CardBuilder, CardDocument, CardElement, Notifier, TemplateRenderer};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
