//! `fbdesk` - CLI for feedbackdesk
//!
//! This binary submits, reviews and exports internal feature requests.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use tracing::{error, info};

use feedbackdesk::cli::{
    ClearCommand, Cli, Command, ConfigCommand, DeleteCommand, ExportCommand, ListCommand,
    OutputFormat, ShowCommand, SubmitCommand,
};
use feedbackdesk::gate::Mode;
use feedbackdesk::view::{
    arrange, detail, format_timestamp, summary_line, PriorityCounts, PriorityFilter,
};
use feedbackdesk::{
    init_logging, open_store, AccessGate, Config, Desk, Elevation, Error, Priority,
};

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Submit(cmd) => handle_submit(&open_desk(&config)?, &cmd).await,
        Command::List(cmd) => handle_list(&open_desk(&config)?, &cmd).await,
        Command::Show(cmd) => handle_show(&open_desk(&config)?, &cmd).await,
        Command::Delete(cmd) => Ok(handle_delete(&open_desk(&config)?, &cmd).await),
        Command::Clear(cmd) => Ok(handle_clear(&open_desk(&config)?, &cmd).await),
        Command::Export(cmd) => Ok(handle_export(&open_desk(&config)?, &config, &cmd).await),
        Command::Login(cmd) => handle_login(&mut open_desk(&config)?, &cmd.secret),
        Command::Logout => handle_logout(&mut open_desk(&config)?),
        Command::Status(cmd) => handle_status(&open_desk(&config)?, &config, cmd.json).await,
    }
}

fn open_desk(config: &Config) -> feedbackdesk::Result<Desk> {
    let missing = config.missing_backend_settings();
    if !missing.is_empty() {
        eprintln!(
            "警告：缺少数据库配置（{}），数据库功能不可用。请联系管理员配置 SUPABASE_URL 和 SUPABASE_ANON_KEY。",
            missing.join(", ")
        );
    }

    let store = open_store(config)?;
    Ok(Desk::new(store, AccessGate::from_config(config)))
}

async fn handle_submit(desk: &Desk, cmd: &SubmitCommand) -> CliResult {
    match desk.submit(&cmd.to_new_feedback()).await {
        Ok(record) => {
            println!("提交成功：您的需求已成功提交！");
            println!("{}", summary_line(&record));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_validation() => {
            eprintln!("请填写必填项（部门名称、联系人、需要解决的问题、程序要求）");
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!("Error submitting request: {}", e);
            eprintln!("提交失败，请稍后重试");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn handle_list(desk: &Desk, cmd: &ListCommand) -> CliResult {
    let records = desk.try_records().await.unwrap_or_else(|e| {
        error!("Error fetching requests: {}", e);
        eprintln!("加载需求列表失败");
        Vec::new()
    });
    let filter = PriorityFilter::from(cmd.priority.map(Priority::from));
    let shown = arrange(&records, filter);

    match cmd.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        OutputFormat::Table => {
            if shown.is_empty() {
                println!("暂无需求记录");
                return Ok(ExitCode::SUCCESS);
            }
            println!(
                "{:<4} {:<12} {:<10} {:<20} {}",
                "优先级", "部门名称", "联系人", "提交时间", "ID"
            );
            for record in &shown {
                println!(
                    "{:<4} {:<12} {:<10} {:<20} {}",
                    record.priority.label(),
                    record.department,
                    record.contact_name,
                    format_timestamp(&record.created_at),
                    record.id
                );
            }
        }
        OutputFormat::Plain => {
            let counts = PriorityCounts::tally(&records);
            println!(
                "需求汇总 [{}]  全部 {}  高 {}  中 {}  低 {}",
                desk.gate().mode(),
                counts.total,
                counts.high,
                counts.medium,
                counts.low
            );
            println!();
            if shown.is_empty() {
                println!("暂无需求记录");
            }
            for record in &shown {
                if cmd.expand {
                    println!("{}", detail(record));
                } else {
                    println!("{}", summary_line(record));
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_show(desk: &Desk, cmd: &ShowCommand) -> CliResult {
    let Some(record) = desk.find(&cmd.id).await else {
        eprintln!("未找到需求记录：{}", cmd.id);
        return Ok(ExitCode::FAILURE);
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", detail(&record));
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_delete(desk: &Desk, cmd: &DeleteCommand) -> ExitCode {
    if !desk.gate().can_mutate() {
        eprintln!("权限不足：只有管理员才能删除需求");
        return ExitCode::FAILURE;
    }
    if !cmd.yes {
        println!("确定要删除这条需求记录吗？此操作不可恢复。");
        println!("Use --yes to confirm.");
        return ExitCode::SUCCESS;
    }

    match desk.delete(&cmd.id).await {
        Ok(()) => {
            println!("删除成功：需求记录已删除");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error deleting request {}: {}", cmd.id, e);
            eprintln!("删除失败，请稍后重试");
            ExitCode::FAILURE
        }
    }
}

async fn handle_clear(desk: &Desk, cmd: &ClearCommand) -> ExitCode {
    if !desk.gate().can_mutate() {
        eprintln!("权限不足：只有管理员才能清空所有记录");
        return ExitCode::FAILURE;
    }
    if !cmd.yes {
        println!("确定要清空所有需求记录吗？此操作不可恢复！");
        println!("Use --yes to confirm.");
        return ExitCode::SUCCESS;
    }

    match desk.clear().await {
        Ok(()) => {
            println!("清空成功：所有需求记录已清空");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error clearing requests: {}", e);
            eprintln!("清空失败，请稍后重试");
            ExitCode::FAILURE
        }
    }
}

async fn handle_export(desk: &Desk, config: &Config, cmd: &ExportCommand) -> ExitCode {
    let dir = cmd.output.clone().unwrap_or_else(|| config.export_dir());

    match desk.export(&dir, &Local::now()).await {
        Ok(path) => {
            println!("导出成功：{}", path.display());
            ExitCode::SUCCESS
        }
        Err(Error::NothingToExport) => {
            eprintln!("暂无需求记录，无法导出");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Error exporting requests: {}", e);
            eprintln!("导出失败，请稍后重试");
            ExitCode::FAILURE
        }
    }
}

fn handle_login(desk: &mut Desk, secret: &str) -> CliResult {
    match desk.gate_mut().elevate(secret)? {
        Elevation::Granted => {
            info!("Admin mode enabled");
            println!("登录成功：已切换到管理员模式");
            Ok(ExitCode::SUCCESS)
        }
        Elevation::Denied => {
            eprintln!("管理员密码错误");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn handle_logout(desk: &mut Desk) -> CliResult {
    desk.gate_mut().revoke()?;
    if desk.gate().mode() == Mode::Admin {
        println!("已退出登录，但当前来源仍为本机，保持管理员模式");
    } else {
        println!("已退出管理员模式");
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_status(desk: &Desk, config: &Config, json: bool) -> CliResult {
    let counts = PriorityCounts::tally(&desk.records().await);
    let gate = desk.gate();

    if json {
        let status = serde_json::json!({
            "backend": desk.store().name(),
            "configured": config.missing_backend_settings().is_empty(),
            "admin": gate.can_mutate(),
            "trusted_origin": gate.trusted_origin(),
            "elevated": gate.elevated(),
            "counts": counts,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("fbdesk status");
        println!("-------------");
        println!("Backend:       {}", desk.store().name());
        println!("Mode:          {}", gate.mode());
        println!("Session file:  {}", gate.state_path().display());
        println!(
            "Requests:      {} (high {}, medium {}, low {})",
            counts.total, counts.high, counts.medium, counts.low
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let shown = |v: &Option<String>| v.clone().unwrap_or_else(|| "(not set)".into());
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Backend]");
                println!("  Kind:               {:?}", config.backend.kind);
                println!("  URL:                {}", shown(&config.backend.url));
                println!(
                    "  Anon key:           {}",
                    if config.backend.anon_key.is_some() {
                        "(set)"
                    } else {
                        "(not set)"
                    }
                );
                println!("  Table:              {}", config.backend.table);
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Gate]");
                println!("  Origin host:        {}", shown(&config.gate.origin_host));
                println!(
                    "  Session file:       {}",
                    config.session_state_path().display()
                );
                println!();
                println!("[Export]");
                println!("  Output dir:         {}", config.export_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(loaded) => {
                    println!("Configuration is valid.");
                    let missing = loaded.missing_backend_settings();
                    if !missing.is_empty() {
                        println!("Missing backend settings: {}", missing.join(", "));
                    }
                }
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
