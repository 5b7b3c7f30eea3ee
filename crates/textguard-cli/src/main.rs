use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use textguard_core::{
    fix_path, render_directory, render_file, render_fix, render_fix_summary, render_json, resolve_config,
    validate_path, FixMode, Target,
};
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "textguard", version, about = "Check and fix encoding, BOM and emoji in source files")]
struct Cli {
    /// 待检查的文件或目录
    #[arg(default_value = ".")]
    path: PathBuf,

    /// 修复模式（去除 BOM、规范化 emoji）；默认只校验
    #[arg(long)]
    fix: bool,

    /// 只预览修复结果，不写回文件；校验模式下本身就不写文件
    #[arg(long)]
    dry_run: bool,

    /// 不递归进入子目录
    #[arg(long)]
    no_recursive: bool,

    /// 配置文件路径（TOML），默认尝试 ./textguard.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// emoji 替换表（TOML），覆盖配置文件中的设置
    #[arg(long)]
    table: Option<PathBuf>,

    /// 需要检查的扩展名，可重复；覆盖配置文件
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// 线程数（"auto"=CPU 核心数）
    #[arg(long, default_value = "auto")]
    threads: String,

    /// 最大检查文件大小（字节）
    #[arg(long)]
    max_file_size: Option<u64>,

    /// 以 JSON 输出报告
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let mut cfg = resolve_config(cli.config.as_deref()).context("load config")?;
    if cli.table.is_some() {
        cfg.table = cli.table.clone();
    }
    let validator = cfg.build_validator().context("build validator")?;

    let mut opts = cfg.walk_options();
    opts.recursive = !cli.no_recursive;
    if !cli.extensions.is_empty() {
        opts.extensions = cli.extensions.clone();
    }
    if let Some(n) = parse_threads(&cli.threads) {
        opts.threads = Some(n);
    }
    if cli.max_file_size.is_some() {
        opts.max_file_size = cli.max_file_size;
    }

    let mut stdout = std::io::stdout().lock();

    if cli.fix {
        let mode = if cli.dry_run { FixMode::Preview } else { FixMode::Apply };
        info!(path = ?cli.path, ?mode, "starting fix");
        let target = fix_path(&cli.path, &validator, mode, &opts)?;
        let (text, failed) = match &target {
            Target::File(r) => (output(cli.json, r, render_fix)?, r.error.is_some()),
            Target::Directory(s) => (output(cli.json, s, render_fix_summary)?, s.failed > 0),
        };
        stdout.write_all(text.as_bytes())?;
        info!(failed, "fix finished");
        return Ok(exit_code(!failed));
    }

    info!(path = ?cli.path, "starting validation");
    let target = validate_path(&cli.path, &validator, &opts)?;
    let (text, ok) = match &target {
        Target::File(r) => (output(cli.json, r, render_file)?, r.passed),
        Target::Directory(d) => (output(cli.json, d, render_directory)?, d.is_clean()),
    };
    stdout.write_all(text.as_bytes())?;
    info!(ok, "validation finished");
    Ok(exit_code(ok))
}

fn output<T: serde::Serialize>(json: bool, value: &T, render: fn(&T) -> String) -> Result<String> {
    if json {
        let mut s = render_json(value)?;
        s.push('\n');
        Ok(s)
    } else {
        Ok(render(value))
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 只留报告
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
