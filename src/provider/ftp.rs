use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::models::Entry;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::parser::parse_listing;
use crate::provider::{ListingProvider, ROOT_PATH};

/// 控制连接上的一条服务器应答
#[derive(Debug)]
struct Reply {
    code: u16,
    text: String,
}

/// FTP 会话内部错误，在 Provider 边界上再做分类
#[derive(Debug)]
enum FtpError {
    Io(std::io::Error),
    Reply(Reply),
}

impl From<std::io::Error> for FtpError {
    fn from(err: std::io::Error) -> Self {
        FtpError::Io(err)
    }
}

impl std::fmt::Display for FtpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FtpError::Io(err) => write!(f, "{err}"),
            FtpError::Reply(reply) => write!(f, "服务器应答 {} {}", reply.code, reply.text),
        }
    }
}

/// 已建立的控制连接
struct Control {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Control {
    /// 读取一条应答，多行应答读到 "NNN " 开头的结束行为止
    async fn read_reply(&mut self) -> Result<Reply, FtpError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(FtpError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "控制连接已关闭",
            )));
        }
        let code = line
            .get(0..3)
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| {
                FtpError::Io(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("无法解析的应答: {}", line.trim_end()),
                ))
            })?;

        let mut text = line.trim_end().to_string();
        if line.as_bytes().get(3) == Some(&b'-') {
            let terminator = format!("{code} ");
            loop {
                let mut next = String::new();
                if self.reader.read_line(&mut next).await? == 0 {
                    return Err(FtpError::Io(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "控制连接已关闭",
                    )));
                }
                text.push('\n');
                text.push_str(next.trim_end());
                if next.starts_with(&terminator) {
                    break;
                }
            }
        }
        Ok(Reply { code, text })
    }

    async fn command(&mut self, cmd: &str) -> Result<Reply, FtpError> {
        self.writer.write_all(format!("{cmd}\r\n").as_bytes()).await?;
        self.writer.flush().await?;
        self.read_reply().await
    }

    /// 发送命令并要求成功应答（4xx/5xx 视为错误）
    async fn expect(&mut self, cmd: &str) -> Result<Reply, FtpError> {
        let reply = self.command(cmd).await?;
        if reply.code >= 400 {
            return Err(FtpError::Reply(reply));
        }
        Ok(reply)
    }

    /// 进入被动模式并取回数据连接地址
    async fn passive_addr(&mut self) -> Result<(String, u16), FtpError> {
        let reply = self.expect("PASV").await?;
        parse_pasv(&reply.text).ok_or_else(|| {
            FtpError::Io(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("无法解析 PASV 应答: {}", reply.text),
            ))
        })
    }

    /// 通过被动模式数据连接取回当前目录的 LIST 输出
    async fn fetch_list_lines(&mut self, connect_timeout: Duration) -> Result<Vec<String>, FtpError> {
        let (ip, port) = self.passive_addr().await?;
        let mut data = match timeout(connect_timeout, TcpStream::connect((ip.as_str(), port))).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return Err(FtpError::Io(err)),
            Err(_) => {
                return Err(FtpError::Io(std::io::Error::new(
                    ErrorKind::TimedOut,
                    "数据连接超时",
                )))
            }
        };

        let preliminary = self.command("LIST").await?;
        if preliminary.code >= 400 {
            return Err(FtpError::Reply(preliminary));
        }

        let mut raw = Vec::new();
        data.read_to_end(&mut raw).await?;
        drop(data);

        let done = self.read_reply().await?;
        if done.code >= 400 {
            return Err(FtpError::Reply(done));
        }

        let text = String::from_utf8_lossy(&raw);
        Ok(text
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect())
    }
}

/// 从 "227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)" 中解析数据连接地址
fn parse_pasv(text: &str) -> Option<(String, u16)> {
    let start = text.find('(')? + 1;
    let end = start + text[start..].find(')')?;
    let nums: Vec<u32> = text[start..end]
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .ok()?;
    if nums.len() != 6 || nums.iter().any(|n| *n > 255) {
        return None;
    }
    let ip = format!("{}.{}.{}.{}", nums[0], nums[1], nums[2], nums[3]);
    let port = (nums[4] * 256 + nums[5]) as u16;
    Some((ip, port))
}

/// 从 257 应答中取出带引号的当前目录
fn parse_pwd(text: &str) -> Option<String> {
    let start = text.find('"')? + 1;
    let end = start + text[start..].find('"')?;
    Some(text[start..end].to_string())
}

/// 匿名 FTP 数据源
///
/// 只实现估算所需的最小协议子集：登录、CWD/PWD、被动模式
/// 与 LIST。每次列取先进入目标目录，完成后回到镜像根。
pub struct FtpProvider {
    host: String,
    port: u16,
    root_path: String,
    user: String,
    password: String,
    connect_timeout: Duration,
    conn: Option<Control>,
    root_abs: String,
}

impl FtpProvider {
    pub fn new(host: impl Into<String>, root_path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 21,
            root_path: root_path.into(),
            user: "anonymous".to_string(),
            password: "anonymous@".to_string(),
            connect_timeout: Duration::from_secs(60),
            conn: None,
            root_abs: "/".to_string(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn with_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    async fn open_session(&mut self) -> Result<(), FtpError> {
        let stream = match timeout(
            self.connect_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return Err(FtpError::Io(err)),
            Err(_) => {
                return Err(FtpError::Io(std::io::Error::new(
                    ErrorKind::TimedOut,
                    "连接超时",
                )))
            }
        };

        let (read_half, write_half) = stream.into_split();
        let mut control = Control {
            reader: BufReader::new(read_half),
            writer: write_half,
        };

        let greeting = control.read_reply().await?;
        if greeting.code != 220 {
            return Err(FtpError::Reply(greeting));
        }

        let user_reply = control.expect(&format!("USER {}", self.user)).await?;
        if user_reply.code == 331 {
            control.expect(&format!("PASS {}", self.password)).await?;
        }
        // 列目录统一用 ASCII 模式
        control.expect("TYPE A").await?;

        if !self.root_path.is_empty() {
            control.expect(&format!("CWD {}", self.root_path)).await?;
        }
        // 记下根目录的绝对路径，递归返回时恢复工作目录用
        let pwd = control.expect("PWD").await?;
        self.root_abs = parse_pwd(&pwd.text).unwrap_or_else(|| "/".to_string());

        self.conn = Some(control);
        Ok(())
    }

    fn classify_listing(path: &str, err: FtpError) -> ProviderError {
        match err {
            FtpError::Reply(reply) if reply.code >= 500 => ProviderError::PermissionDenied {
                path: path.to_string(),
            },
            other => ProviderError::Listing {
                path: path.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl ListingProvider for FtpProvider {
    async fn connect(&mut self) -> ProviderResult<()> {
        match self.open_session().await {
            Ok(()) => {
                tracing::info!("已连接到 {}:{}，镜像根 {}", self.host, self.port, self.root_abs);
                Ok(())
            }
            Err(err) => {
                self.conn = None;
                Err(ProviderError::ConnectionFailed {
                    target: self.describe(),
                    reason: err.to_string(),
                })
            }
        }
    }

    async fn list(&mut self, path: &str) -> ProviderResult<Vec<Entry>> {
        let root_abs = self.root_abs.clone();
        let connect_timeout = self.connect_timeout;
        let control = match self.conn.as_mut() {
            Some(control) => control,
            None => {
                return Err(ProviderError::Listing {
                    path: path.to_string(),
                    reason: "尚未连接".to_string(),
                })
            }
        };

        if path != ROOT_PATH {
            if let Err(err) = control.expect(&format!("CWD {path}")).await {
                return Err(Self::classify_listing(path, err));
            }
        }

        let lines = control.fetch_list_lines(connect_timeout).await;

        // 无论列取成败都回到镜像根，保持后续调用的路径基准
        if path != ROOT_PATH {
            if let Err(err) = control.expect(&format!("CWD {root_abs}")).await {
                self.conn = None;
                return Err(ProviderError::Listing {
                    path: path.to_string(),
                    reason: format!("恢复工作目录失败: {err}"),
                });
            }
        }

        let lines = lines.map_err(|err| Self::classify_listing(path, err))?;
        Ok(parse_listing(&lines))
    }

    async fn disconnect(&mut self) {
        if let Some(mut control) = self.conn.take() {
            // 尽力发送 QUIT，失败直接丢弃连接
            let _ = control.command("QUIT").await;
            tracing::info!("已断开 FTP 连接");
        }
    }

    fn describe(&self) -> String {
        if self.root_path.is_empty() {
            self.host.clone()
        } else {
            format!("{}/{}", self.host, self.root_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_pasv_reply() {
        let (ip, port) = parse_pasv("227 Entering Passive Mode (192,168,1,10,19,137)").unwrap();
        assert_eq!(ip, "192.168.1.10");
        assert_eq!(port, 19 * 256 + 137);
    }

    #[test]
    fn test_parse_pasv_rejects_garbage() {
        assert!(parse_pasv("227 no address here").is_none());
        assert!(parse_pasv("227 (1,2,3)").is_none());
        assert!(parse_pasv("227 (999,0,0,1,1,1)").is_none());
    }

    #[test]
    fn test_parse_pwd_reply() {
        assert_eq!(
            parse_pwd("257 \"/ifremer/argo\" is the current directory").as_deref(),
            Some("/ifremer/argo")
        );
        assert!(parse_pwd("257 no quotes").is_none());
    }

    /// 极简 FTP 服务器：按命令逐条应答，LIST 通过被动数据连接
    /// 返回固定的目录列表
    async fn fake_ftp_server(listener: TcpListener, listing: &'static [&'static str]) {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        writer.write_all(b"220 fake server ready\r\n").await.unwrap();

        let mut data_listener: Option<TcpListener> = None;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await.unwrap() == 0 {
                break;
            }
            let line = line.trim_end();
            let reply: String = if line.starts_with("USER") {
                "331 need password\r\n".to_string()
            } else if line.starts_with("PASS") {
                "230 logged in\r\n".to_string()
            } else if line.starts_with("TYPE") {
                "200 type set\r\n".to_string()
            } else if line.starts_with("CWD") {
                if line.contains("denied") {
                    "550 permission denied\r\n".to_string()
                } else {
                    "250 ok\r\n".to_string()
                }
            } else if line.starts_with("PWD") {
                "257 \"/data\" is current\r\n".to_string()
            } else if line.starts_with("PASV") {
                let dl = TcpListener::bind("127.0.0.1:0").await.unwrap();
                let port = dl.local_addr().unwrap().port();
                data_listener = Some(dl);
                format!(
                    "227 Entering Passive Mode (127,0,0,1,{},{})\r\n",
                    port / 256,
                    port % 256
                )
            } else if line.starts_with("LIST") {
                writer.write_all(b"150 opening data connection\r\n").await.unwrap();
                let dl = data_listener.take().unwrap();
                let (mut data, _) = dl.accept().await.unwrap();
                for row in listing {
                    data.write_all(row.as_bytes()).await.unwrap();
                    data.write_all(b"\r\n").await.unwrap();
                }
                drop(data);
                "226 transfer complete\r\n".to_string()
            } else if line.starts_with("QUIT") {
                writer.write_all(b"221 bye\r\n").await.unwrap();
                break;
            } else {
                "502 not implemented\r\n".to_string()
            };
            writer.write_all(reply.as_bytes()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_through_fake_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        static LISTING: &[&str] = &[
            "drwxr-xr-x   2 ftp ftp     4096 Jan 15  2020 dac",
            "-rw-r--r--   1 ftp ftp     2048 Mar  3 12:45 index.txt",
        ];
        let server = tokio::spawn(fake_ftp_server(listener, LISTING));

        let mut provider = FtpProvider::new("127.0.0.1", "data")
            .with_port(port)
            .with_timeout(Duration::from_secs(5));
        provider.connect().await.unwrap();

        let entries = provider.list(ROOT_PATH).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "dac");
        assert!(entries[0].is_dir());
        assert_eq!(entries[1].size, 2048);

        provider.disconnect().await;
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_denied_directory_maps_to_permission_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        static LISTING: &[&str] = &[];
        let server = tokio::spawn(fake_ftp_server(listener, LISTING));

        let mut provider = FtpProvider::new("127.0.0.1", "data")
            .with_port(port)
            .with_timeout(Duration::from_secs(5));
        provider.connect().await.unwrap();

        let err = provider.list("./denied").await.unwrap_err();
        assert!(matches!(err, ProviderError::PermissionDenied { .. }));
        assert!(!err.is_fatal());

        provider.disconnect().await;
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_failure_is_fatal() {
        // 先占住端口再立即释放，得到一个大概率无人监听的端口
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut provider = FtpProvider::new("127.0.0.1", "data")
            .with_port(port)
            .with_timeout(Duration::from_secs(2));
        let err = provider.connect().await.unwrap_err();
        assert!(err.is_fatal());
    }
}
