//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use crate::notification::template::TemplateRenderer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 英文默认消息模板
pub const DEFAULT_TEMPLATE_EN: &str = "{header}<br>**Project**:  {project_name}<br>**User**:  {user}\
<br>**Env**:  {environment}<br>**Ver**:  {release}\
<br>**Msg**:  {message}<br><btn:View details>{url}";

/// 中文默认消息模板
pub const DEFAULT_TEMPLATE_ZH: &str = "{header}<br>【项目】{project_name}<br>【用户】{user}\
<br>【环境】{tag['environment']}<br>【版本】{tag['sentry:release']}\
<br><hr><br>【内容】{message}<br><btn:点击查看详情>{url}";

/// 主配置结构，包含全局配置和项目列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// 项目配置列表
    pub projects: Vec<ProjectConfig>,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    /// 默认模板语言
    #[serde(default)]
    pub template_locale: TemplateLocale,
}

impl GlobalConfig {
    /// 配置的日志级别，无法识别时使用 info
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_timeout(),
            template_locale: TemplateLocale::default(),
        }
    }
}

/// 项目配置结构：一个webhook加一个消息模板
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// 项目名称
    pub name: String,
    /// 飞书机器人webhook URL
    pub webhook: String,
    /// 消息模板，未配置时使用默认模板
    pub message_template: Option<String>,
    /// 机器人签名密钥
    pub secret: Option<String>,
    /// 项目级模板语言
    pub template_locale: Option<TemplateLocale>,
    /// 是否启用
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// 默认模板语言
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateLocale {
    #[default]
    En,
    Zh,
}

impl TemplateLocale {
    /// 该语言的默认消息模板
    pub fn default_template(self) -> &'static str {
        match self {
            TemplateLocale::En => DEFAULT_TEMPLATE_EN,
            TemplateLocale::Zh => DEFAULT_TEMPLATE_ZH,
        }
    }
}

/// 解析后的单项目通知设置
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierSettings {
    pub project: String,
    pub webhook: String,
    pub message_template: String,
    pub secret: Option<String>,
    pub enabled: bool,
}

impl ProjectConfig {
    /// 合并全局默认值，得到通知设置
    pub fn settings(&self, global: &GlobalConfig) -> NotifierSettings {
        let locale = self.template_locale.unwrap_or(global.template_locale);
        NotifierSettings {
            project: self.name.clone(),
            webhook: self.webhook.clone(),
            message_template: self
                .message_template
                .clone()
                .unwrap_or_else(|| locale.default_template().to_string()),
            secret: self.secret.clone().filter(|s| !s.is_empty()),
            enabled: self.enabled,
        }
    }
}

impl Config {
    /// 按名称查找项目
    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.name == name)
    }
}

// 默认值函数
fn default_log_level() -> String {
    "info".to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_enabled() -> bool {
    true
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.global.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    // 验证日志级别
    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    if config.projects.is_empty() {
        return Err("至少需要配置一个项目".to_string());
    }

    let mut names = HashSet::new();
    for project in &config.projects {
        if project.name.trim().is_empty() {
            return Err("项目名称不能为空".to_string());
        }

        if !names.insert(project.name.as_str()) {
            return Err(format!("项目名称重复: {}", project.name));
        }

        if !project.webhook.starts_with("http://") && !project.webhook.starts_with("https://") {
            return Err(format!("项目 {} 的webhook URL格式无效", project.name));
        }

        if let Some(ref template) = project.message_template {
            if template.trim().is_empty() {
                return Err(format!("项目 {} 的消息模板不能为空", project.name));
            }
        }
    }

    Ok(())
}

/// 列出模板中无法识别的占位符
///
/// 这些占位符只有在事件恰好带有同名标签时才有值，否则总是渲染为 `[not set]`。
pub fn unknown_placeholders(template: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TemplateRenderer::new(template)
        .placeholders()
        .into_iter()
        .filter(|p| !p.is_known())
        .map(|p| p.to_string())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
