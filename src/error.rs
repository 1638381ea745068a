//! 错误处理模块
//!
//! 定义应用程序的统一错误类型。模板渲染和卡片构建不会失败，
//! 只有配置加载和消息投递会产生错误。

use thiserror::Error;

/// Lark Sentry 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum LarkSentryError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 找不到项目配置
    #[error("未找到项目配置: {name}")]
    ProjectNotFound { name: String },
}

/// 通知投递错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 网络传输失败（连接、超时等）
    #[error("webhook请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// 飞书服务端拒绝了消息
    #[error("飞书拒绝消息: HTTP {status}, code {code}, {message}")]
    Rejected {
        status: u16,
        code: i64,
        message: String,
    },

    /// 通知配置错误
    #[error("通知配置错误: {0}")]
    ConfigError(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, LarkSentryError>;
