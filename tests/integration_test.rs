use std::collections::HashSet;
use std::fs;

use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

use ftp_mirror_estimator::estimator::{EstimateOptions, Estimator};
use ftp_mirror_estimator::models::EstimationMethod;
use ftp_mirror_estimator::provider::{LocalProvider, MemoryProvider};

fn seeded_options() -> EstimateOptions {
    EstimateOptions {
        seed: Some(42),
        ..EstimateOptions::default()
    }
}

/// 典型镜像布局：dac 下多个机构目录，geo 下年份目录
fn argo_like_fixture() -> MemoryProvider {
    let mut provider = MemoryProvider::new();
    provider.add_file(".", "ar_index_global_prof.txt", 2048);
    provider.add_dir("./dac");
    provider.add_dir("./dac/aoml");
    provider.add_file("./dac/aoml", "R5900001_001.nc", 120_000);
    provider.add_file("./dac/aoml", "R5900001_002.nc", 130_000);
    provider.add_dir("./dac/coriolis");
    provider.add_file("./dac/coriolis", "D5901000_001.nc", 110_000);
    provider.add_dir("./geo");
    provider.add_file("./geo", "readme.txt", 512);
    provider
}

#[tokio::test]
async fn test_full_run_on_small_tree_is_exact() {
    let provider = argo_like_fixture();
    let mut estimator = Estimator::new(provider, seeded_options());
    let outcome = estimator.run().await;

    // 每个目录的文件数都不超过抽样预算，结果应当精确
    let expected = 2048 + 120_000 + 130_000 + 110_000 + 512;
    assert_eq!(outcome.root.estimated_size, expected);
    assert_eq!(outcome.root.file_count, 5);
    assert_eq!(outcome.root.dir_count, 4, "dac、geo 以及 dac 下两个机构目录");
    assert!(!outcome.interrupted);

    // dac 子树自身也保持累计语义
    let dac = &outcome.root.subdirectories["dac"];
    assert_eq!(dac.estimated_size, 120_000 + 130_000 + 110_000);
    assert_eq!(dac.file_count, 3);
}

#[tokio::test]
async fn test_each_directory_listed_at_most_once() {
    let provider = argo_like_fixture();
    let mut estimator = Estimator::new(provider, seeded_options());
    estimator.run().await;

    let calls = estimator.provider().listing_calls();
    let unique: HashSet<&String> = calls.iter().collect();
    assert_eq!(calls.len(), unique.len(), "重复列取: {calls:?}");
}

#[tokio::test]
async fn test_identical_structures_skipped_after_first() {
    let mut provider = MemoryProvider::new();
    // 两个结构完全相同的目录（各一个 txt 文件加一个空子目录）
    for name in ["alpha", "beta"] {
        let dir = format!("./{name}");
        provider.add_dir(&dir);
        provider.add_file(&dir, "data.txt", 100);
        provider.add_dir(&format!("{dir}/inner"));
    }

    let mut estimator = Estimator::new(provider, seeded_options());
    let outcome = estimator.run().await;

    let alpha = &outcome.root.subdirectories["alpha"];
    let beta = &outcome.root.subdirectories["beta"];
    assert_eq!(alpha.method, EstimationMethod::Sampled);
    assert_eq!(beta.method, EstimationMethod::PatternMatch);
    assert_eq!(beta.similar_to.as_deref(), Some("./alpha"));
    // 跳过的目录贡献为零，也不再递归其子目录
    assert_eq!(beta.estimated_size, 0);
    assert!(beta.subdirectories.is_empty());
    assert_eq!(estimator.provider().calls_for("./beta/inner"), 0);
    assert_eq!(outcome.counters.pattern_matches_skipped, 1);
    assert_eq!(outcome.root.estimated_size, 100, "总量只含首个目录");
}

#[tokio::test]
async fn test_netcdf_directories_never_skipped() {
    let mut provider = MemoryProvider::new();
    for name in ["alpha", "beta"] {
        let dir = format!("./{name}");
        provider.add_dir(&dir);
        provider.add_file(&dir, "profile.nc", 1000);
    }

    let mut estimator = Estimator::new(provider, seeded_options());
    let outcome = estimator.run().await;

    // 结构相同但含特权格式，两个目录都完整抽样
    let alpha = &outcome.root.subdirectories["alpha"];
    let beta = &outcome.root.subdirectories["beta"];
    assert_eq!(alpha.method, EstimationMethod::Sampled);
    assert_eq!(beta.method, EstimationMethod::Sampled);
    assert_eq!(outcome.root.estimated_size, 2000);
    assert_eq!(outcome.counters.pattern_matches_skipped, 0);
    // 根目录加两个特权目录，指纹全部登记
    assert_eq!(outcome.unique_patterns, 3);
}

#[tokio::test]
async fn test_sampling_budget_and_extrapolation_bounds() {
    let mut provider = MemoryProvider::new();
    provider.add_dir("./bulk");
    for i in 0..100 {
        provider.add_file("./bulk", &format!("file_{i:03}.dat"), 1000 + i as u64);
    }

    let mut estimator = Estimator::new(provider, seeded_options());
    let outcome = estimator.run().await;

    let bulk = &outcome.root.subdirectories["bulk"];
    assert_eq!(bulk.files_sampled, 3, "抽样数受预算约束");
    assert_eq!(bulk.file_count, 100);
    // 外推值落在最小/最大单文件大小给出的界内
    assert!(bulk.estimated_size >= 1000 * 100);
    assert!(bulk.estimated_size <= 1099 * 100);
    assert_eq!(outcome.counters.files_sampled_total, 3);
}

#[tokio::test]
async fn test_same_seed_reproduces_estimate() {
    let build = || {
        let mut provider = MemoryProvider::new();
        provider.add_dir("./bulk");
        for i in 0..200 {
            provider.add_file("./bulk", &format!("f{i}.dat"), (i * 37 + 11) as u64);
        }
        provider
    };

    let mut first = Estimator::new(build(), seeded_options());
    let mut second = Estimator::new(build(), seeded_options());
    let outcome_a = first.run().await;
    let outcome_b = second.run().await;

    assert_eq!(outcome_a.root.estimated_size, outcome_b.root.estimated_size);
}

#[tokio::test]
async fn test_depth_limit_prunes_below_cutoff() {
    let mut provider = MemoryProvider::new();
    // 根目录多放一个文件，与 level1 的结构指纹区分开
    provider.add_file(".", "top.txt", 10);
    provider.add_file(".", "notes.md", 5);
    provider.add_dir("./level1");
    provider.add_file("./level1", "mid.txt", 20);
    provider.add_dir("./level1/level2");
    provider.add_file("./level1/level2", "deep.txt", 40);

    let options = EstimateOptions {
        max_depth: 2,
        ..seeded_options()
    };
    let mut estimator = Estimator::new(provider, options);
    let outcome = estimator.run().await;

    // 第三层被截断，其文件不计入总量
    assert_eq!(outcome.root.estimated_size, 35);
    let level2 = &outcome.root.subdirectories["level1"].subdirectories["level2"];
    assert_eq!(level2.method, EstimationMethod::DepthLimit);
    assert_eq!(level2.estimated_size, 0);
    assert_eq!(estimator.provider().calls_for("./level1/level2"), 0);
}

#[tokio::test]
async fn test_denied_directory_does_not_stop_the_run() {
    let mut provider = MemoryProvider::new();
    provider.add_dir("./open");
    provider.add_file("./open", "a.txt", 100);
    provider.add_dir("./secret");
    provider.add_file("./secret", "hidden.txt", 999);
    provider.deny("./secret");

    let mut estimator = Estimator::new(provider, seeded_options());
    let outcome = estimator.run().await;

    let secret = &outcome.root.subdirectories["secret"];
    assert_eq!(secret.method, EstimationMethod::Inaccessible);
    assert!(!secret.accessible);
    assert_eq!(secret.estimated_size, 0);
    // 其余目录照常估算
    assert_eq!(outcome.root.estimated_size, 100);
    assert_eq!(outcome.inaccessible_paths, vec!["./secret".to_string()]);
}

#[tokio::test]
async fn test_numbered_siblings_reuse_representative() {
    let mut provider = MemoryProvider::new();
    provider.add_dir("./dac");
    for float_id in ["5900001", "5900002", "5900003"] {
        let dir = format!("./dac/{float_id}");
        provider.add_dir(&dir);
        provider.add_file(&dir, &format!("R{float_id}_001.nc"), 100_000);
        provider.add_file(&dir, &format!("R{float_id}_002.nc"), 200_000);
    }

    let mut estimator = Estimator::new(provider, seeded_options());
    let outcome = estimator.run().await;

    let dac = &outcome.root.subdirectories["dac"];
    let rep = &dac.subdirectories["5900001"];
    let clone_a = &dac.subdirectories["5900002"];
    let clone_b = &dac.subdirectories["5900003"];

    assert_eq!(rep.method, EstimationMethod::Sampled);
    assert_eq!(clone_a.method, EstimationMethod::PatternReuse);
    assert_eq!(clone_b.method, EstimationMethod::PatternReuse);
    assert_eq!(clone_a.similar_to.as_deref(), Some("5900001"));
    assert_eq!(clone_a.estimated_size, rep.estimated_size);

    // 组内只有代表被真实列取
    assert_eq!(estimator.provider().calls_for("./dac/5900001"), 1);
    assert_eq!(estimator.provider().calls_for("./dac/5900002"), 0);
    assert_eq!(estimator.provider().calls_for("./dac/5900003"), 0);

    // 复用目录的统计按三份计入父目录
    assert_eq!(dac.estimated_size, 300_000 * 3);
    assert_eq!(dac.file_count, 6);
    // 抽样计数不因复用膨胀
    assert_eq!(outcome.counters.files_sampled_total, 2);
}

#[tokio::test]
async fn test_metadata_collected_from_listings() {
    let mut provider = MemoryProvider::new();
    provider.add_dir("./dac");
    provider.add_file("./dac", "temp_salinity_20200115_prof.nc", 1000);
    provider.add_file("./dac", "argo_delayed_2023-06-30.nc", 2000);

    let mut estimator = Estimator::new(provider, seeded_options());
    let outcome = estimator.run().await;

    let min = outcome.temporal.min_date.unwrap();
    let max = outcome.temporal.max_date.unwrap();
    assert_eq!(min.to_string(), "2020-01-15");
    assert_eq!(max.to_string(), "2023-06-30");
    assert!(outcome.temporal.patterns_matched.contains("YYYYMMDD"));
    assert!(outcome.temporal.patterns_matched.contains("YYYY-MM-DD"));

    assert!(outcome.features.parameters.contains("temp"));
    assert!(outcome.features.parameters.contains("salinity"));
    assert!(outcome.features.platforms.contains("argo"));
    assert!(outcome.features.data_types.contains("delayed"));
}

#[tokio::test]
async fn test_cancellation_keeps_partial_results() {
    // 目录名不含数字，不会被当作同构兄弟合并
    let names = [
        "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india",
        "juliet", "kilo", "lima",
    ];
    let mut provider = MemoryProvider::new();
    for (i, name) in names.iter().enumerate() {
        let dir = format!("./{name}");
        provider.add_dir(&dir);
        // 扩展名各不相同，避免指纹去重干扰列取计数
        provider.add_file(&dir, &format!("{name}.e{i:02}"), (i + 1) as u64 * 10);
    }

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    let mut estimator = Estimator::new(provider, seeded_options())
        .with_cancel(cancel)
        .with_progress(move |update| {
            // 第三次真实列取后请求中断
            if update.counters.directories_scanned >= 3 {
                watcher.cancel();
            }
        });
    let outcome = estimator.run().await;

    assert!(outcome.interrupted);
    // 根目录保留了已完成的部分
    assert_eq!(outcome.root.method, EstimationMethod::Sampled);
    assert!(!outcome.root.subdirectories.is_empty());
    // 中断后剩余目录不再列取
    let listed = estimator.provider().listing_calls().len();
    assert!(listed >= 3, "至少完成三次列取, 实际 {listed}");
    assert!(listed < 1 + names.len(), "中断后仍在列取, 实际 {listed}");
}

#[tokio::test]
async fn test_quick_scan_performs_single_listing() {
    let provider = argo_like_fixture();
    let mut estimator = Estimator::new(provider, seeded_options());
    let overview = estimator.quick_overview().await;

    assert!(overview.accessible);
    assert_eq!(overview.directories, vec!["dac", "geo"]);
    assert_eq!(overview.files.len(), 1);
    assert_eq!(estimator.provider().listing_calls(), ["."]);
}

#[tokio::test]
async fn test_local_provider_end_to_end() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("dac/aoml")).unwrap();
    fs::write(root.join("index.txt"), vec![0u8; 512]).unwrap();
    fs::write(root.join("dac/aoml/R5900001_001.nc"), vec![0u8; 4096]).unwrap();
    fs::write(root.join("dac/aoml/R5900001_002.nc"), vec![0u8; 8192]).unwrap();

    let provider = LocalProvider::new(root);
    let mut estimator = Estimator::new(provider, seeded_options());
    estimator.connect().await.unwrap();
    let outcome = estimator.run().await;
    estimator.disconnect().await;

    assert_eq!(outcome.root.estimated_size, 512 + 4096 + 8192);
    assert_eq!(outcome.root.file_count, 3);
    assert_eq!(outcome.root.dir_count, 2);
    assert!(outcome.inaccessible_paths.is_empty());
}
