use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ftp-mirror-estimator")]
#[command(about = "对大型 FTP 数据镜像做有界成本的规模与构成估算")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// FTP 服务器地址
    #[arg(long)]
    pub host: Option<String>,

    /// 镜像根路径
    #[arg(long)]
    pub path: Option<String>,

    /// 估算本地目录而不是 FTP 服务器 (调试用)
    #[arg(long, value_name = "DIR")]
    pub local: Option<PathBuf>,

    /// 最大递归深度
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// 每个目录的抽样文件数
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// 随机数种子，使抽样可复现
    #[arg(long)]
    pub seed: Option<u64>,

    /// 只扫描顶层结构，快速获得概览
    #[arg(long)]
    pub quick_scan: bool,

    /// JSON 报告输出路径
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 文本报告输出路径
    #[arg(long, default_value = "ftp_mirror_analysis_report.txt")]
    pub text_report: PathBuf,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,
}
