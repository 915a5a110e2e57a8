// ==========================================
// 学校管理系统 - 命令行入口
// ==========================================
// 用法:
//   school-admin init                 初始化数据库
//   school-admin import <file>        批量导入学生（.xlsx/.xls/.csv）
//   school-admin template <out>       导出导入模板
//   school-admin add-guardian <name>  新增监护人（打印 ID）
// 环境变量:
//   SCHOOL_ADMIN_DB_PATH              数据库路径（可选）
// ==========================================

use school_admin::api::GuardianInput;
use school_admin::app::{get_default_db_path, AppState};
use school_admin::{logging, APP_NAME, VERSION};
use std::error::Error;
use std::path::Path;

const USAGE: &str = "用法: school-admin <init | import <file> | template <out> | add-guardian <name>>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 系统版本: {}", APP_NAME, VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path)?;

    match (command.as_str(), args.get(1)) {
        ("init", _) => {
            println!("数据库已就绪: {}", state.get_db_path());
        }
        ("import", Some(file)) => {
            let bytes = std::fs::read(file)?;
            let file_name = Path::new(file)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.clone());

            let result = state.import_api.import_students(&file_name, &bytes).await?;
            println!("{}", result.summary);
            for entry in &result.errors {
                println!(
                    "  行 {:>4} | {:<16} | {}",
                    entry.row,
                    entry.field.as_deref().unwrap_or("-"),
                    entry.message
                );
            }
            if !result.success {
                std::process::exit(1);
            }
        }
        ("template", Some(out)) => {
            let template = state.import_api.download_template()?;
            std::fs::write(out, &template.content)?;
            println!("模板已写入: {}", out);
        }
        ("add-guardian", Some(name)) => {
            let guardian = state.guardian_api.create_guardian(GuardianInput {
                full_name: name.clone(),
                ..Default::default()
            })?;
            println!("{}", guardian.guardian_id);
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
