// ==========================================
// Merchify 动态降价引擎 - 命令行入口
// ==========================================
// 用法: merchify-pricing <input.csv|xlsx> [config.json] [output.csv]
// 未给出输出路径时写到标准输出
// ==========================================

use anyhow::{bail, Context};
use merchify_pricing::api::{ApiError, CsvExporter, PricingApi};
use merchify_pricing::config::{get_default_config_path, ConfigManager};
use merchify_pricing::i18n::{self, t, t_with_args};
use merchify_pricing::logging;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // 显式指定语言时，导出的档位与季节列也使用该语言
    let locale = std::env::var("MERCHIFY_LOCALE").ok();
    if let Some(locale) = &locale {
        i18n::set_locale(locale);
    }
    let exporter = CsvExporter::default().with_localized_labels(locale.is_some());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(input) = args.first().map(PathBuf::from) else {
        eprintln!("{}", t("cli.usage"));
        bail!("missing input file");
    };

    tracing::info!(
        version = merchify_pricing::VERSION,
        app = merchify_pricing::APP_NAME,
        "启动"
    );

    let config_manager = match args.get(1) {
        Some(path) => ConfigManager::from_file(path)
            .with_context(|| format!("无法加载配置文件 {}", path))?,
        None => ConfigManager::load_or_default(get_default_config_path())?,
    };
    let api = PricingApi::new(Arc::new(config_manager));

    let report = match api.analyze_file(&input).await {
        Ok(report) => report,
        Err(ApiError::MissingColumns(missing)) => {
            eprintln!(
                "{}",
                t_with_args("import.missing_columns", &[("columns", &missing.join(", "))])
            );
            bail!("缺少必需列，导入终止: {}", input.display());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("分析失败: {}", input.display()));
        }
    };

    if report.dq_report.summary.blocked > 0 {
        eprintln!(
            "{}",
            t_with_args(
                "import.rows_blocked",
                &[("count", &report.dq_report.summary.blocked.to_string())]
            )
        );
    }

    let summary = &report.batch.summary;
    eprintln!(
        "{}",
        t_with_args(
            "cli.summary",
            &[
                ("total", &summary.total_rows.to_string()),
                ("tiers", &summary.tier_assigned.to_string()),
                ("insufficient", &summary.insufficient_sales_data.to_string()),
                ("no_target", &summary.no_target_defined.to_string()),
            ]
        )
    );

    match args.get(2) {
        Some(output) => {
            let rows = exporter.write_to_path(&report.batch, output)?;
            eprintln!(
                "{}",
                t_with_args(
                    "cli.exported",
                    &[("rows", &rows.to_string()), ("path", output)]
                )
            );
        }
        None => {
            exporter.write(&report.batch, std::io::stdout().lock())?;
        }
    }

    Ok(())
}
