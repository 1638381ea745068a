//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{
    unknown_placeholders, Config, ConfigLoader, ProjectConfig, TemplateLocale, TomlConfigLoader,
};
use crate::error::{ConfigError, Result};
use crate::event::EventContext;
use crate::logging::{LogConfig, LoggingSystem};
use crate::notification::{
    CardBuilder, CardElement, DeliveryOutcome, LarkSender, NoOpSender, NotificationSender,
    Notifier, TemplateRenderer,
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// 示例配置文件
const SAMPLE_CONFIG: &str = include_str!("../../demos/config.toml");

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 加载配置文件
async fn load_config(args: &Args) -> Result<Config> {
    TomlConfigLoader::new(true)
        .load_from_file(args.get_config_path())
        .await
}

/// 未通过命令行指定日志级别时，从配置文件读取
///
/// 配置文件不存在或无法加载时使用 info，具体错误留给子命令报告。
pub async fn configured_log_level(args: &Args) -> log::LevelFilter {
    load_config(args)
        .await
        .map(|config| config.global.level_filter())
        .unwrap_or(log::LevelFilter::Info)
}

/// 从JSON文件加载事件
async fn load_event(path: &Path) -> Result<EventContext> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// 选择项目：显式名称优先，其次事件中的项目名，最后取第一个项目
///
/// 显式指定的项目不存在时报错；事件中的项目名未配置时回退到第一个项目。
pub fn resolve_project<'a>(
    config: &'a Config,
    name: Option<&str>,
    event: Option<&EventContext>,
) -> Result<&'a ProjectConfig> {
    if let Some(name) = name {
        return config.project(name).ok_or_else(|| {
            ConfigError::ProjectNotFound {
                name: name.to_string(),
            }
            .into()
        });
    }

    let event_project = event.and_then(|e| e.project_name.as_deref());
    if let Some(project) = event_project.and_then(|name| config.project(name)) {
        return Ok(project);
    }

    let first = config.projects.first().ok_or_else(|| ConfigError::ProjectNotFound {
        name: event_project.unwrap_or_default().to_string(),
    })?;
    if let Some(name) = event_project {
        tracing::warn!("事件项目 {} 未配置，使用第一个项目 {}", name, first.name);
    }
    Ok(first)
}

/// 输出卡片的文本预览
fn print_card_preview(template: &str, event: &EventContext) {
    let renderer = TemplateRenderer::new(template);
    let card = CardBuilder::default().build_template(&renderer, event);

    println!("标题: {}", card.header);
    for element in &card.elements {
        match element {
            CardElement::Divider => println!("------------------------------"),
            CardElement::Button { label, url } => println!("[{label}] -> {url}"),
            CardElement::TextBlock { content } => println!("{content}"),
        }
    }
}

/// 渲染命令
pub struct RenderCommand;

#[async_trait]
impl Command for RenderCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let Commands::Render {
            event,
            project,
            template,
            format,
        } = &args.command
        else {
            return Ok(());
        };

        let event = load_event(event).await?;

        // 指定模板时不需要配置文件
        let settings = match template {
            Some(template) => crate::config::NotifierSettings {
                project: project.clone().unwrap_or_default(),
                webhook: String::new(),
                message_template: template.clone(),
                secret: None,
                enabled: true,
            },
            None => {
                let config = load_config(args).await?;
                resolve_project(&config, project.as_deref(), Some(&event))?.settings(&config.global)
            }
        };

        match format {
            OutputFormat::Json => {
                let notifier = Notifier::new(settings, Arc::new(NoOpSender));
                let payload = notifier.build_message(&event)?;
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            OutputFormat::Text => print_card_preview(&settings.message_template, &event),
        }

        Ok(())
    }
}

/// 发送命令
pub struct SendCommand;

#[async_trait]
impl Command for SendCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let Commands::Send {
            event,
            project,
            dry_run,
        } = &args.command
        else {
            return Ok(());
        };

        let config = load_config(args).await?;
        let event = load_event(event).await?;
        let project = resolve_project(&config, project.as_deref(), Some(&event))?;

        deliver(args, &config, project, &event, *dry_run).await
    }
}

/// 通过项目配置投递事件，投递失败时返回错误以便设置退出码
async fn deliver(
    args: &Args,
    config: &Config,
    project: &ProjectConfig,
    event: &EventContext,
    dry_run: bool,
) -> Result<()> {
    let sender: Arc<dyn NotificationSender> = if dry_run {
        Arc::new(NoOpSender)
    } else {
        Arc::new(LarkSender::new(Duration::from_secs(
            config.global.request_timeout_seconds,
        ))?)
    };

    let logging = Arc::new(LoggingSystem::new(LogConfig {
        json_format: args.json_logs,
        ..Default::default()
    }));
    let notifier = Notifier::new(project.settings(&config.global), sender).with_logging(logging);

    if dry_run {
        let payload = notifier.build_message(event)?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    match notifier.notify(event).await {
        DeliveryOutcome::Delivered(receipt) => {
            println!("✅ 项目 {} 通知已发送 ({})", project.name, receipt.message);
            Ok(())
        }
        DeliveryOutcome::Skipped(reason) => {
            println!("⏭️  跳过: {reason}");
            Ok(())
        }
        DeliveryOutcome::Failed(e) => {
            eprintln!("❌ 项目 {} 通知发送失败: {}", project.name, e);
            Err(e.into())
        }
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let Commands::Validate {
            config_path,
            verbose,
        } = &args.command
        else {
            return Ok(());
        };

        let config_file = config_path
            .clone()
            .unwrap_or_else(|| args.get_config_path());
        let config = TomlConfigLoader::new(true)
            .load_from_file(&config_file)
            .await?;

        println!("✅ 配置文件验证通过: {}", config_file.display());
        println!("项目数量: {}", config.projects.len());

        for project in &config.projects {
            let settings = project.settings(&config.global);
            let unknown = unknown_placeholders(&settings.message_template);

            if *verbose || args.is_verbose() {
                println!(
                    "  - {} (启用: {}, 签名: {})",
                    project.name,
                    project.enabled,
                    if settings.secret.is_some() { "是" } else { "否" }
                );
                println!("    模板: {}", settings.message_template);
            }
            if !unknown.is_empty() {
                println!(
                    "⚠️  项目 {} 的模板包含未知占位符（无同名标签时显示为 [not set]）: {}",
                    project.name,
                    unknown.join(", ")
                );
            }
        }

        Ok(())
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let Commands::Init {
            config_path,
            force,
            locale,
        } = &args.command
        else {
            return Ok(());
        };

        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(config_path, sample_config(TemplateLocale::from(*locale))).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑配置文件填写机器人webhook地址");

        Ok(())
    }
}

/// 生成指定语言的示例配置
pub fn sample_config(locale: TemplateLocale) -> String {
    let value = match locale {
        TemplateLocale::En => "en",
        TemplateLocale::Zh => "zh",
    };
    SAMPLE_CONFIG.replace(
        "template_locale = \"en\"",
        &format!("template_locale = \"{value}\""),
    )
}

/// 测试通知命令
pub struct TestNotificationCommand;

#[async_trait]
impl Command for TestNotificationCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let Commands::TestNotification { project, message } = &args.command else {
            return Ok(());
        };

        let config = load_config(args).await?;
        let project = resolve_project(&config, project.as_deref(), None)?;

        let event = EventContext::new()
            .with_header("Test notification")
            .with_message(message.as_str())
            .with_project_name(project.name.as_str())
            .with_user("lark-sentry")
            .with_environment("test")
            .with_release(crate::VERSION)
            .with_url("https://sentry.io/");

        deliver(args, &config, project, &event, false).await
    }
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}
