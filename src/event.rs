//! 事件上下文模块
//!
//! 一次可通知事件的只读视图，由宿主错误追踪系统提供

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 缺失数据时替换的固定值
pub const NOT_SET: &str = "[not set]";

/// `user` 字段缺失时回退查找的标签
const USER_TAG: &str = "sentry:user";
/// `release` 字段缺失时回退查找的标签
const RELEASE_TAG: &str = "sentry:release";
/// `environment` 字段缺失时回退查找的标签
const ENVIRONMENT_TAG: &str = "environment";

/// 事件上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// 事件标题
    #[serde(default, alias = "title")]
    pub header: Option<String>,
    /// 事件消息
    #[serde(default)]
    pub message: Option<String>,
    /// 项目名称
    #[serde(default)]
    pub project_name: Option<String>,
    /// 触发事件的用户
    #[serde(default)]
    pub user: Option<String>,
    /// 运行环境
    #[serde(default)]
    pub environment: Option<String>,
    /// 发布版本
    #[serde(default)]
    pub release: Option<String>,
    /// 指向事件详情的链接
    #[serde(default)]
    pub url: Option<String>,
    /// 事件标签
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl EventContext {
    /// 创建空的事件上下文
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_project_name(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// 按名称查找字段值
    ///
    /// 固定字段优先；`user`、`release`、`environment` 缺失时回退到对应的
    /// Sentry 标签；其他名称按同名标签查找。空字符串视为缺失。
    ///
    /// # 参数
    /// * `name` - 占位符名称
    ///
    /// # 返回
    /// * `Option<&str>` - 字段值，缺失时为 `None`
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let (field, fallback_tag) = match name {
            "header" => (&self.header, None),
            "message" => (&self.message, None),
            "project_name" => (&self.project_name, None),
            "url" => (&self.url, None),
            "user" => (&self.user, Some(USER_TAG)),
            "release" => (&self.release, Some(RELEASE_TAG)),
            "environment" => (&self.environment, Some(ENVIRONMENT_TAG)),
            other => return self.tag_value(other),
        };

        non_empty(field.as_deref()).or_else(|| fallback_tag.and_then(|tag| self.tag_value(tag)))
    }

    /// 查找标签值，空值视为缺失
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        non_empty(self.tags.get(key).map(String::as_str))
    }

    /// 按名称查找字段值，缺失时返回 [`NOT_SET`]
    pub fn lookup_or_not_set(&self, name: &str) -> &str {
        self.lookup(name).unwrap_or(NOT_SET)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
