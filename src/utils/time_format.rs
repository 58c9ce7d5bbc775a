use chrono::{DateTime, Local};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 格式化时间为友好显示格式
pub fn format_time(time: SystemTime) -> String {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => {
            if let Some(datetime) = DateTime::from_timestamp(duration.as_secs() as i64, 0) {
                let local_time = datetime.with_timezone(&Local);
                local_time.format("%Y-%m-%d %H:%M:%S").to_string()
            } else {
                "未知时间".to_string()
            }
        }
        Err(_) => "未知时间".to_string(),
    }
}

/// 格式化耗时为友好显示格式 (例如: "2m 30s")
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 60.0 {
        format!("{:.1}s", total_secs)
    } else {
        let minutes = (total_secs / 60.0) as u64;
        let seconds = (total_secs % 60.0) as u64;
        format!("{}m {}s", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        let time = SystemTime::now();
        let formatted = format_time(time);
        assert!(formatted.contains("-"));
        assert!(formatted.contains(":"));
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_millis(500)), "0.5s");
        assert_eq!(format_duration(Duration::from_secs(42)), "42.0s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(150)), "2m 30s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "60m 0s");
    }
}
