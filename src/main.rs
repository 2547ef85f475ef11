//! ceb2txt 命令行入口
//!
//! 用法：
//!   ceb2txt [--output-dir DIR] [--utc] [-v] <archive>
//!
//! 流程：读取 Header → 交互输入密码 → 解密导入 → 写出转录文件。
//! 任何阶段失败都输出一行诊断信息并以状态码 1 退出。

use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::Context;
use ceb2txt::{Backup, Ceb2TxtError, Store, render_transcripts};
use chrono::{Local, Utc};
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ceb2txt",
    version,
    about = "Convert an encrypted chat backup into plain text transcripts"
)]
struct Args {
    /// Backup file to convert
    archive: PathBuf,

    /// Directory under which transcripts are written
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Use UTC instead of the local time zone for dates and times
    #[arg(long)]
    utc: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            exit(1);
        }
    };

    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("{}", diagnostic(&args.archive, &e));
        exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let backup = Backup::open(&args.archive)?;
    let owner = backup.header().owner.bare();

    let password = rpassword::prompt_password(format!("Enter password for {owner}: "))
        .context("failed to read password")?;

    let content = backup.decrypt(&password)?;

    let mut store = Store::open_in_memory()?;
    store.import(content)?;

    let summary = if args.utc {
        render_transcripts(&store, &args.output_dir, &Utc)?
    } else {
        render_transcripts(&store, &args.output_dir, &Local)?
    };

    println!(
        "{} conversations have been written to {}/*/*.txt",
        summary.conversations, summary.account
    );

    Ok(())
}

fn diagnostic(archive: &Path, err: &anyhow::Error) -> String {
    match err.downcast_ref::<Ceb2TxtError>() {
        Some(Ceb2TxtError::MalformedHeader(_)) => {
            let path = std::path::absolute(archive).unwrap_or_else(|_| archive.to_path_buf());
            format!("{} does not seem to be a valid backup file", path.display())
        }
        Some(Ceb2TxtError::DecryptionFailed) => "Wrong password or corrupt backup file".to_string(),
        _ => format!("Error: {err:#}"),
    }
}
