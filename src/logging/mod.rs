use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 默认日志级别（`RUST_LOG` 优先）
    pub level: LevelFilter,
    /// 追加写入的日志文件
    pub file_output: Option<PathBuf>,
    /// 是否显示目标模块
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_output: None,
            show_target: true,
        }
    }
}

impl LoggingConfig {
    /// 服务器运行配置
    pub fn server(verbose: bool, log_file: Option<&str>) -> Self {
        Self {
            level: if verbose { LevelFilter::Debug } else { LevelFilter::Info },
            file_output: log_file.map(PathBuf::from),
            show_target: true,
        }
    }

    /// 测试环境配置
    #[cfg(test)]
    pub fn testing() -> Self {
        Self {
            level: LevelFilter::Error,
            file_output: None,
            show_target: false,
        }
    }
}

/// Writes every log line to stderr and to the log file.
///
/// stdout is reserved for the MCP protocol stream, so nothing here may touch it.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// 初始化日志系统
///
/// Repeated calls are ignored, which keeps tests that share a process quiet.
pub fn init_logging(config: LoggingConfig) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));
    let show_target = config.show_target;
    builder.format(move |buf, record| {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        if show_target {
            writeln!(buf, "{} - {} - {} - {}", timestamp, record.target(), record.level(), record.args())
        } else {
            writeln!(buf, "{} - {} - {}", timestamp, record.level(), record.args())
        }
    });

    let mut file_error = None;
    match &config.file_output {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(TeeWriter { file })));
            }
            Err(e) => {
                file_error = Some(format!("{}: {}", path.display(), e));
                builder.target(Target::Stderr);
            }
        },
        None => {
            builder.target(Target::Stderr);
        }
    }

    if builder.try_init().is_err() {
        return;
    }

    if let Some(err) = file_error {
        log::warn!("⚠️ 无法打开日志文件，仅输出到 stderr: {}", err);
    }
    log::debug!("日志系统初始化完成: level={}", config.level);
}

/// 操作性能计时器
pub struct OperationTimer {
    start: Instant,
    operation: String,
}

impl OperationTimer {
    /// 创建新的计时器
    pub fn new(operation: &str) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
        }
    }

    /// 完成计时并记录日志
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        log::debug!("⏱️ {} 完成，耗时 {:?}", self.operation, duration);
        duration
    }

    /// 获取当前经过时间
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
