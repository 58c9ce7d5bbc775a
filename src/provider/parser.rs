use crate::models::{Entry, EntryKind};

/// 解析一行 Unix 风格的 LIST 输出
///
/// 典型格式:
/// `drwxr-xr-x   2 ftp   ftp       4096 Jan 15  2020 dac`
/// `-rw-r--r--   1 ftp   ftp    1234567 Mar  3 12:45 D20230401_prof.nc`
///
/// 无法解析的行返回 None，由调用方跳过，不视为目录级错误。
pub fn parse_list_line(line: &str) -> Option<Entry> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 9 {
        return None;
    }

    let permissions = parts[0].to_string();
    // 名称可能含空格，取第 9 个字段起的全部内容
    let name = parts[8..].join(" ");
    if name == "." || name == ".." {
        return None;
    }

    if permissions.starts_with('d') {
        return Some(Entry {
            name,
            kind: EntryKind::Directory,
            size: 0,
            permissions,
        });
    }

    // 软链接等其他条目当作文件处理，大小字段解析失败则跳过整行
    let size = parts[4].parse::<u64>().ok()?;
    Some(Entry {
        name,
        kind: EntryKind::File,
        size,
        permissions,
    })
}

/// 解析整份 LIST 输出，静默跳过所有无法解析的行
pub fn parse_listing(lines: &[String]) -> Vec<Entry> {
    lines.iter().filter_map(|line| parse_list_line(line)).collect()
}
