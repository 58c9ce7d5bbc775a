mod cli;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use cli::Cli;
use ftp_mirror_estimator::config::Config;
use ftp_mirror_estimator::estimator::{EstimateOptions, Estimator};
use ftp_mirror_estimator::provider::{FtpProvider, ListingProvider, LocalProvider};
use ftp_mirror_estimator::reporter::{
    write_json_report, write_text_report, DetailedStats, RunSummary,
};
use ftp_mirror_estimator::utils::{format_count, format_duration, format_size};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，--verbose 时输出调试级别
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // 加载配置
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_file(config_path)?
    } else {
        Config::load_or_create_default()?
    };

    // 命令行参数覆盖配置
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(path) = &cli.path {
        config.server.root_path = path.clone();
    }
    if let Some(depth) = cli.max_depth {
        config.scan.max_depth = depth;
    }
    if let Some(sample_size) = cli.sample_size {
        config.scan.sample_size = sample_size;
    }
    if let Some(seed) = cli.seed {
        config.scan.seed = Some(seed);
    }

    // Ctrl-C 转为取消信号，中断时保留已完成的部分结果
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("收到中断信号，正在收尾...");
                cancel.cancel();
            }
        });
    }

    let options = EstimateOptions::from_config(&config);
    if let Some(dir) = &cli.local {
        let provider = LocalProvider::new(dir.clone());
        run_estimation(provider, &config, &cli, options, cancel).await
    } else {
        let provider = FtpProvider::new(
            config.server.host.clone(),
            config.server.root_path.clone(),
        )
        .with_credentials(config.server.user.clone(), config.server.password.clone())
        .with_timeout(Duration::from_secs(config.server.connect_timeout_secs));
        run_estimation(provider, &config, &cli, options, cancel).await
    }
}

async fn run_estimation<P: ListingProvider>(
    provider: P,
    config: &Config,
    cli: &Cli,
    options: EstimateOptions,
    cancel: CancellationToken,
) -> Result<()> {
    let mut estimator = Estimator::new(provider, options).with_cancel(cancel);

    println!("目标: {}", estimator.describe());
    estimator.connect().await?;

    // 快速扫描只看顶层结构
    if cli.quick_scan {
        let overview = estimator.quick_overview().await;
        estimator.disconnect().await;

        println!("顶层目录 ({} 个):", overview.directories.len());
        for name in &overview.directories {
            println!("  {}/", name);
        }
        println!("顶层文件: {} 个", overview.files.len());
        if let (Some(min), Some(max)) = (overview.temporal.min_date, overview.temporal.max_date) {
            println!("时间范围: {} ~ {}", min, max);
        }
        return Ok(());
    }

    // 创建进度条（在测试时禁用）
    let progress = if cfg!(test) {
        ProgressBar::hidden()
    } else {
        create_progress_bar()
    };
    {
        let progress = progress.clone();
        estimator = estimator.with_progress(move |update| {
            progress.set_message(format!(
                "扫描: {} | 目录: {} | 抽样: {}",
                update.current_path,
                update.counters.directories_scanned,
                update.counters.files_sampled_total
            ));
        });
    }

    let outcome = estimator.run().await;
    estimator.disconnect().await;
    progress.finish_with_message(format!(
        "估算完成！列取 {} 个目录，抽样 {} 个文件",
        outcome.counters.directories_scanned, outcome.counters.files_sampled_total
    ));

    let summary = RunSummary::from_outcome(&outcome);
    let stats = DetailedStats::from_outcome(&outcome);

    println!();
    println!("估算总大小: {}", format_size(outcome.root.estimated_size));
    println!("估算文件数: {}", format_count(outcome.root.file_count));
    println!("估算目录数: {}", format_count(outcome.root.dir_count));
    println!("分析耗时: {}", format_duration(outcome.duration));
    if outcome.interrupted {
        println!("(本次运行被中断，以上为部分结果)");
    }

    if let Some(output) = &cli.output {
        write_json_report(output, &outcome, &summary, &stats)?;
        println!("JSON 报告: {}", output.display());
    }
    write_text_report(&cli.text_report, &outcome, &summary, &stats, &config.report)?;
    println!("文本报告: {}", cli.text_report.display());

    Ok(())
}

/// 创建进度条
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
