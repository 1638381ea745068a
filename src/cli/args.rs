//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::config::TemplateLocale;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Lark Sentry - 将错误追踪事件以飞书卡片形式推送
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lark-sentry",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "LARK_SENTRY_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别（未指定时使用配置文件中的 log_level）
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "LARK_SENTRY_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// 日志文件路径，指定后日志写入文件而不是终端
    #[arg(long, value_name = "FILE", help = "日志文件路径", env = "LARK_SENTRY_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// 是否输出JSON格式日志
    #[arg(long, help = "输出JSON格式日志")]
    pub json_logs: bool,

    /// 是否启用详细输出
    #[arg(short, long, help = "启用详细输出")]
    pub verbose: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 渲染事件卡片但不发送
    Render {
        /// 事件JSON文件
        #[arg(short, long, value_name = "FILE", help = "事件JSON文件")]
        event: PathBuf,

        /// 项目名称（默认取事件中的 project_name）
        #[arg(short, long, value_name = "NAME", help = "项目名称")]
        project: Option<String>,

        /// 覆盖配置中的消息模板
        #[arg(short, long, value_name = "TEMPLATE", help = "消息模板")]
        template: Option<String>,

        /// 输出格式
        #[arg(short, long, value_enum, default_value = "json", help = "输出格式")]
        format: OutputFormat,
    },

    /// 渲染并发送事件通知
    Send {
        /// 事件JSON文件
        #[arg(short, long, value_name = "FILE", help = "事件JSON文件")]
        event: PathBuf,

        /// 项目名称（默认取事件中的 project_name）
        #[arg(short, long, value_name = "NAME", help = "项目名称")]
        project: Option<String>,

        /// 只构建消息，不实际发送
        #[arg(long, help = "只构建消息，不实际发送")]
        dry_run: bool,
    },

    /// 验证配置文件
    Validate {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径")]
        config_path: Option<PathBuf>,

        /// 是否显示详细信息
        #[arg(short, long, help = "显示详细信息")]
        verbose: bool,
    },

    /// 初始化配置文件
    Init {
        /// 配置文件路径
        #[arg(
            value_name = "FILE",
            help = "配置文件路径",
            default_value = "lark-sentry.toml"
        )]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,

        /// 默认模板语言
        #[arg(long, value_enum, default_value = "en", help = "默认模板语言")]
        locale: Locale,
    },

    /// 发送测试通知
    TestNotification {
        /// 项目名称（默认取第一个项目）
        #[arg(short, long, value_name = "NAME", help = "项目名称")]
        project: Option<String>,

        /// 测试消息内容
        #[arg(
            short,
            long,
            default_value = "This is a test notification from lark-sentry",
            help = "测试消息内容"
        )]
        message: String,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

/// 模板语言
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum Locale {
    En,
    Zh,
}

impl From<Locale> for TemplateLocale {
    fn from(locale: Locale) -> Self {
        match locale {
            Locale::En => TemplateLocale::En,
            Locale::Zh => TemplateLocale::Zh,
        }
    }
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }

    /// 是否启用详细输出
    pub fn is_verbose(&self) -> bool {
        self.verbose || matches!(self.log_level, Some(LogLevel::Debug))
    }
}
