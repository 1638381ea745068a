//! 通知模块
//!
//! 提供消息模板渲染、飞书卡片构建和webhook投递功能

pub mod card;
pub mod lark;
pub mod notifier;
pub mod payload;
pub mod sender;
pub mod template;

// 重新导出主要类型
pub use card::{CardBuilder, CardDocument, CardElement, CardSyntax, Segment};
pub use lark::LarkSender;
pub use notifier::{DeliveryOutcome, Notifier};
pub use payload::LarkPayload;
pub use sender::{DeliveryReceipt, NoOpSender, NotificationSender};
pub use template::{Placeholder, TemplateRenderer};
