use anyhow::Result;
use ftp_mirror_estimator::estimator::{EstimateOptions, Estimator};
use ftp_mirror_estimator::provider::MemoryProvider;
use ftp_mirror_estimator::utils::{format_count, format_size};

#[tokio::main]
async fn main() -> Result<()> {
    println!("🚀 有界成本镜像估算演示");
    println!();

    // 构造一个 Argo 风格的内存目录树：两个数据中心下挂编号
    // 浮标目录，geo 下挂年份目录
    let mut provider = MemoryProvider::new();
    provider.add_file(".", "argo_index_global_prof.txt", 2048);

    provider.add_dir("./dac");
    provider.add_dir("./dac/aoml");
    for float_id in 5_900_200..5_900_220 {
        let dir = format!("./dac/aoml/{float_id}");
        provider.add_dir(&dir);
        provider.add_file(&dir, &format!("R{float_id}_001.nc"), 95_000);
        provider.add_file(&dir, &format!("R{float_id}_002.nc"), 105_000);
    }
    provider.add_dir("./dac/coriolis");
    for float_id in 6_900_200..6_900_210 {
        let dir = format!("./dac/coriolis/{float_id}");
        provider.add_dir(&dir);
        provider.add_file(&dir, &format!("D{float_id}_001.nc"), 95_000);
        provider.add_file(&dir, &format!("D{float_id}_002.nc"), 105_000);
    }

    provider.add_dir("./geo");
    for year in 2019..2023 {
        let dir = format!("./geo/{year}");
        provider.add_dir(&dir);
        provider.add_file(&dir, &format!("temp_grid_{year}0101.nc"), 80_000);
        provider.add_file(&dir, &format!("psal_grid_{year}0701.nc"), 90_000);
    }

    // 根目录 + dac/geo + 两个数据中心 + 30 个浮标目录 + 4 个年份目录
    let total_paths = 1 + 2 + 2 + 30 + 4;
    println!("📁 内存目录树: {} 个目录, 69 个文件", total_paths);
    println!();

    // 演示 1: 快速扫描，只看顶层结构
    println!("📊 演示 1: 快速扫描");
    let mut quick = Estimator::new(provider.clone(), EstimateOptions::default());
    let overview = quick.quick_overview().await;
    println!("顶层目录: {:?}", overview.directories);
    println!("顶层文件: {} 个", overview.files.len());
    println!();

    // 演示 2: 完整估算
    println!("💾 演示 2: 完整估算");
    let options = EstimateOptions {
        max_depth: 4,
        seed: Some(7),
        ..EstimateOptions::default()
    };
    let mut estimator = Estimator::new(provider, options);
    let outcome = estimator.run().await;

    println!("估算总大小: {}", format_size(outcome.root.estimated_size));
    println!("估算文件数: {}", format_count(outcome.root.file_count));
    println!("子目录总数: {}", format_count(outcome.root.dir_count));
    if let (Some(min), Some(max)) = (outcome.temporal.min_date, outcome.temporal.max_date) {
        println!("时间覆盖: {} ~ {}", min, max);
    }
    if !outcome.features.parameters.is_empty() {
        println!("观测参数: {:?}", outcome.features.parameters);
    }
    println!();

    println!("📈 各估算方式的节点数:");
    for (method, count) in outcome.root.method_counts() {
        println!("  - {}: {}", method, count);
    }
    println!();

    // 有界成本验证：编号浮标目录与年份目录只递归组内代表
    let listed = estimator.provider().listing_calls().len();
    println!("⚡ 实际列取 {} / {} 个目录", listed, total_paths);
    println!(
        "⚡ 抽样 {} 个文件, 结构复用节省 {} 次递归",
        outcome.counters.files_sampled_total,
        outcome.root.dir_count as usize + 1 - listed
    );

    assert!(listed < total_paths, "列取次数应远小于目录总数");
    assert!(!outcome.interrupted);
    println!("✅ 有界成本验证通过");

    println!();
    println!("🎉 演示完成！");

    Ok(())
}
