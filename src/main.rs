//! Lark Sentry 主程序入口

use anyhow::{Context, Result};
use clap::Parser;
use lark_sentry::cli::args::{Args, Commands};
use lark_sentry::cli::commands::{
    configured_log_level, Command, InitCommand, RenderCommand, SendCommand,
    TestNotificationCommand, ValidateCommand, VersionCommand,
};
use lark_sentry::logging::{LogConfig, LoggingSystem};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match &args.log_level {
        Some(level) => level.clone().into(),
        None => configured_log_level(&args).await,
    };
    let log_config = LogConfig {
        level,
        file_path: args.log_file.clone(),
        json_format: args.json_logs,
        ..Default::default()
    };

    let _logging_system =
        LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    debug!("Lark Sentry v{} 启动", lark_sentry::VERSION);

    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 执行CLI命令
async fn execute_command(args: &Args) -> Result<()> {
    let command: Box<dyn Command> = match &args.command {
        Commands::Render { .. } => Box::new(RenderCommand),
        Commands::Send { .. } => Box::new(SendCommand),
        Commands::Validate { .. } => Box::new(ValidateCommand),
        Commands::Init { .. } => Box::new(InitCommand),
        Commands::TestNotification { .. } => Box::new(TestNotificationCommand),
        Commands::Version { .. } => Box::new(VersionCommand),
    };

    command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
}
