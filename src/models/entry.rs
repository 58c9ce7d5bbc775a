use serde::{Deserialize, Serialize};

/// 远程目录条目的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

/// 远程目录中的一个条目
///
/// 由 ListingProvider 产出，创建之后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// 条目名称（不含路径）
    pub name: String,
    /// 条目类型
    pub kind: EntryKind,
    /// 文件大小（字节，目录固定为 0）
    pub size: u64,
    /// 原始权限字符串，如 "drwxr-xr-x"
    pub permissions: String,
}

impl Entry {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            permissions: "-rw-r--r--".to_string(),
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
            permissions: "drwxr-xr-x".to_string(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// 小写扩展名（含点）；没有扩展名时返回空字符串
    ///
    /// 隐藏文件（如 ".netrc"）视为没有扩展名。
    pub fn extension(&self) -> String {
        match self.name.rfind('.') {
            Some(pos) if pos > 0 => self.name[pos..].to_lowercase(),
            _ => String::new(),
        }
    }
}
