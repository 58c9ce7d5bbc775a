use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// 目录列取失败的分类
///
/// 只有连接失败是致命错误；其余错误都限定在单个目录上，
/// 调用方把对应目录标记为不可访问后继续运行。
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 无法建立到数据源的连接
    #[error("无法连接到 {target}: {reason}")]
    ConnectionFailed { target: String, reason: String },

    /// 目录存在但拒绝访问
    #[error("目录拒绝访问: {path}")]
    PermissionDenied { path: String },

    /// 列取过程中的其他错误（超时、传输中断等）
    #[error("列取 {path} 失败: {reason}")]
    Listing { path: String, reason: String },
}

impl ProviderError {
    /// 是否为致命错误（整次运行应当中止）
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::ConnectionFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_failure_is_fatal() {
        let conn = ProviderError::ConnectionFailed {
            target: "ftp.example.org".to_string(),
            reason: "连接被拒绝".to_string(),
        };
        let denied = ProviderError::PermissionDenied {
            path: "./secret".to_string(),
        };
        let listing = ProviderError::Listing {
            path: "./data".to_string(),
            reason: "传输中断".to_string(),
        };

        assert!(conn.is_fatal());
        assert!(!denied.is_fatal());
        assert!(!listing.is_fatal());
    }

    #[test]
    fn test_error_messages_carry_path() {
        let denied = ProviderError::PermissionDenied {
            path: "./secret".to_string(),
        };
        assert!(denied.to_string().contains("./secret"));
    }
}
