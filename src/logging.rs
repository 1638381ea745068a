//! 日志系统模块
//!
//! 提供结构化日志配置和通知投递指标

use log::LevelFilter;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 全局subscriber是否已安装
static GLOBAL_LOGGING_INITIALIZED: OnceLock<Mutex<bool>> = OnceLock::new();

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径，未设置时输出到标准错误
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
    /// 是否收集通知指标
    pub enable_metrics: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            json_format: false,
            enable_metrics: true,
        }
    }
}

/// 计数器指标收集器
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    counters: Arc<Mutex<HashMap<String, u64>>>,
}

impl MetricsCollector {
    /// 创建新的指标收集器
    pub fn new() -> Self {
        Self::default()
    }

    /// 增加计数器
    pub fn increment_counter(&self, name: &str, value: u64) {
        if let Ok(mut counters) = self.counters.lock() {
            *counters.entry(name.to_string()).or_insert(0) += value;
        }
    }

    /// 读取计数器
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .map(|counters| counters.get(name).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// 获取所有指标
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counters
            .lock()
            .map(|counters| counters.clone())
            .unwrap_or_default()
    }
}

/// 日志系统管理器
pub struct LoggingSystem {
    /// 指标收集器
    metrics_collector: Option<Arc<MetricsCollector>>,
    /// 配置
    config: LogConfig,
}

impl LoggingSystem {
    /// 创建新的日志系统（不安装全局subscriber）
    pub fn new(config: LogConfig) -> Self {
        let metrics_collector = config
            .enable_metrics
            .then(|| Arc::new(MetricsCollector::new()));

        Self {
            metrics_collector,
            config,
        }
    }

    /// 初始化日志系统
    ///
    /// 全局subscriber只安装一次，重复调用返回新的 `LoggingSystem` 实例。
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<Self> {
        let initialized = GLOBAL_LOGGING_INITIALIZED.get_or_init(|| Mutex::new(false));
        let mut initialized = initialized
            .lock()
            .map_err(|e| anyhow::anyhow!("日志状态锁异常: {}", e))?;

        if !*initialized {
            Self::init_log_tracer()?;
            Self::init_tracing_subscriber(&config)?;
            *initialized = true;
        }

        Ok(Self::new(config))
    }

    /// 初始化 LogTracer（log crate 到 tracing 的桥接）
    fn init_log_tracer() -> anyhow::Result<()> {
        use tracing_log::LogTracer;

        static LOG_TRACER_INIT: OnceLock<Result<(), String>> = OnceLock::new();

        let result = LOG_TRACER_INIT.get_or_init(|| LogTracer::init().map_err(|e| e.to_string()));

        result
            .as_ref()
            .map_err(|e| anyhow::anyhow!("LogTracer初始化失败: {}", e))?;
        Ok(())
    }

    /// 初始化 tracing subscriber
    fn init_tracing_subscriber(config: &LogConfig) -> anyhow::Result<()> {
        let env_filter =
            EnvFilter::from_default_env().add_directive(Self::level_directive(config.level)?);

        let result = match &config.file_path {
            Some(file_path) => {
                let file = std::fs::File::create(file_path)
                    .map_err(|e| anyhow::anyhow!("创建日志文件失败: {}", e))?;
                let file_layer = if config.json_format {
                    fmt::layer()
                        .json()
                        .with_timer(fmt::time::ChronoUtc::rfc_3339())
                        .with_writer(Arc::new(file))
                        .boxed()
                } else {
                    fmt::layer()
                        .with_timer(fmt::time::ChronoUtc::rfc_3339())
                        .with_writer(Arc::new(file))
                        .with_ansi(false)
                        .with_file(true)
                        .with_line_number(true)
                        .boxed()
                };
                registry().with(env_filter).with(file_layer).try_init()
            }
            None => {
                let fmt_layer = if config.json_format {
                    fmt::layer()
                        .json()
                        .with_timer(fmt::time::ChronoUtc::rfc_3339())
                        .with_writer(std::io::stderr)
                        .boxed()
                } else {
                    fmt::layer()
                        .with_timer(fmt::time::ChronoUtc::rfc_3339())
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .boxed()
                };
                registry().with(env_filter).with(fmt_layer).try_init()
            }
        };

        match result {
            Ok(()) => {
                tracing::debug!("日志配置: {:?}", config);
                Ok(())
            }
            Err(e) => {
                // 测试或宿主进程可能已安装subscriber
                tracing::debug!("日志系统已经初始化过了: {}", e);
                Ok(())
            }
        }
    }

    /// 将 log::LevelFilter 转换为 tracing 的指令
    fn level_directive(
        level: LevelFilter,
    ) -> anyhow::Result<tracing_subscriber::filter::Directive> {
        level
            .as_str()
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("无效的日志级别 {}: {}", level, e))
    }

    /// 获取指标收集器
    pub fn metrics_collector(&self) -> Option<Arc<MetricsCollector>> {
        self.metrics_collector.clone()
    }

    /// 记录通知日志
    ///
    /// # 参数
    /// * `notification_type` - 通知渠道，如 `lark`
    /// * `recipient` - 接收方（项目名）
    /// * `success` - 是否投递成功
    /// * `error` - 失败原因
    pub fn notification_log(
        &self,
        notification_type: &str,
        recipient: &str,
        success: bool,
        error: Option<&str>,
    ) {
        if self.config.json_format {
            let notification_entry = json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "type": "notification",
                "notification_type": notification_type,
                "recipient": recipient,
                "success": success,
                "error": error.unwrap_or(""),
            });
            tracing::info!("{notification_entry}");
        } else {
            tracing::info!(
                "NOTIFICATION: {} to {} - {} {}",
                notification_type,
                recipient,
                if success { "SUCCESS" } else { "FAILED" },
                error.unwrap_or("")
            );
        }

        if let Some(ref collector) = self.metrics_collector {
            collector.increment_counter(&format!("notification_{notification_type}_total"), 1);
            let outcome = if success { "success" } else { "failed" };
            collector.increment_counter(&format!("notification_{notification_type}_{outcome}"), 1);
        }
    }
}
