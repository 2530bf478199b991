// ==========================================
// 企业与联系人导入引擎 - 命令行入口
// ==========================================
// 用法:
//   crm-reconcile <batch.json> [--db <path>] [--user <id>]
//
// 以管理员身份执行一个 JSON 批次，结果 JSON 输出到 stdout，日志输出到 stderr
// 退出码: 0 = COMPLETED / CANCELLED，1 = 被拒绝或 FAILED
// ==========================================

use anyhow::{bail, Context};
use crm_reconcile::api::ImportApi;
use crm_reconcile::db::default_db_path;
use crm_reconcile::domain::Principal;
use crm_reconcile::logging;
use std::path::PathBuf;

const USAGE: &str = "用法: crm-reconcile <batch.json> [--db <path>] [--user <id>]";

#[derive(Debug)]
struct CliArgs {
    batch_file: PathBuf,
    db_path: PathBuf,
    user_id: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut batch_file: Option<PathBuf> = None;
    let mut db_path: Option<PathBuf> = None;
    let mut user_id = "cli".to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = args.next().context("--db 缺少参数值")?;
                db_path = Some(PathBuf::from(value));
            }
            "--user" => {
                user_id = args.next().context("--user 缺少参数值")?;
            }
            "-h" | "--help" => bail!("{}", USAGE),
            other if other.starts_with("--") => bail!("未知参数: {}\n{}", other, USAGE),
            other => {
                if batch_file.is_some() {
                    bail!("只能指定一个批次文件\n{}", USAGE);
                }
                batch_file = Some(PathBuf::from(other));
            }
        }
    }

    Ok(CliArgs {
        batch_file: batch_file.context(USAGE)?,
        db_path: db_path.unwrap_or_else(default_db_path),
        user_id,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args = parse_args(std::env::args().skip(1))?;

    if let Some(parent) = args.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("无法创建数据库目录: {}", parent.display()))?;
    }
    let db_path = args
        .db_path
        .to_str()
        .context("数据库路径不是合法 UTF-8")?
        .to_string();

    let payload = std::fs::read_to_string(&args.batch_file)
        .with_context(|| format!("无法读取批次文件: {}", args.batch_file.display()))?;

    tracing::info!(db_path = %db_path, batch_file = %args.batch_file.display(), "使用数据库");

    let api = ImportApi::new(&db_path)?;
    let response = api
        .import_batch_json(&Principal::admin(args.user_id), &payload)
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}
