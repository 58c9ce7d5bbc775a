pub mod error;
pub mod ftp;
pub mod local;
pub mod memory;
pub mod parser;

pub use error::{ProviderError, ProviderResult};
pub use ftp::FtpProvider;
pub use local::LocalProvider;
pub use memory::MemoryProvider;

use std::future::Future;

use crate::models::Entry;

/// 估算器内部使用的根目录路径
pub const ROOT_PATH: &str = ".";

/// 以根目录 "." 为基准拼接下一级路径
pub fn join_path(base: &str, name: &str) -> String {
    if base == ROOT_PATH {
        format!("./{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// 目录列取服务的抽象
///
/// 估算器只通过这个接口接触外部世界，FTP、本地文件系统
/// 和内存测试树都实现同一套契约。
pub trait ListingProvider: Send {
    /// 建立连接，失败视为致命错误
    fn connect(&mut self) -> impl Future<Output = ProviderResult<()>> + Send;

    /// 列取一个目录，路径相对于根，如 "./dac/aoml"
    fn list(&mut self, path: &str) -> impl Future<Output = ProviderResult<Vec<Entry>>> + Send;

    /// 断开连接，所有退出路径上都会被调用
    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;

    /// 目标的人类可读描述，用于日志与报告
    fn describe(&self) -> String;
}
