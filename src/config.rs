use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs;
use std::time::Duration;

/// 挂载到根目录下的静态文件目录
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FolderConfig {
    pub name: String,
    pub path: String,
}

/// 挂载到根目录下的 JSON 数据表
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub name: String,
    pub file: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default = "default_worker_threads")]
    worker_threads: usize,
    #[serde(default = "default_cache_size")]
    cache_size: usize,
    #[serde(default = "default_cache_threshold")]
    cache_threshold: u64,
    #[serde(default = "default_read_timeout_secs")]
    read_timeout_secs: u64,
    #[serde(default = "default_max_line_length")]
    max_line_length: usize,
    #[serde(default = "default_max_header_count")]
    max_header_count: usize,
    #[serde(default = "default_max_body_size")]
    max_body_size: usize,
    #[serde(default)]
    folders: Vec<FolderConfig>,
    #[serde(default)]
    tables: Vec<TableConfig>,
}

fn default_port() -> u16 {
    8888
}

fn default_local() -> bool {
    true
}

fn default_worker_threads() -> usize {
    4
}

fn default_cache_size() -> usize {
    5
}

fn default_cache_threshold() -> u64 {
    1048576 // 1MB
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_max_line_length() -> usize {
    8192
}

fn default_max_header_count() -> usize {
    100
}

fn default_max_body_size() -> usize {
    1048576 // 1MB
}

/// 单个连接在读取请求时受到的限制
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// 读取整个请求（请求行、标头与报文体）的期限
    pub read_timeout: Duration,
    /// 请求行与单个标头行的最大字节数
    pub max_line_length: usize,
    pub max_header_count: usize,
    pub max_body_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(default_read_timeout_secs()),
            max_line_length: default_max_line_length(),
            max_header_count: default_max_header_count(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: default_port(),
            local: default_local(),
            worker_threads: default_worker_threads(),
            cache_size: default_cache_size(),
            cache_threshold: default_cache_threshold(),
            read_timeout_secs: default_read_timeout_secs(),
            max_line_length: default_max_line_length(),
            max_header_count: default_max_header_count(),
            max_body_size: default_max_body_size(),
            folders: vec![],
            tables: vec![],
        }
    }

    /// 从 TOML 文本构建配置，并修正不合理的取值。
    pub fn from_toml_str(text: &str) -> Self {
        let mut raw_config = match toml::from_str::<Config>(text) {
            Ok(t) => t,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置：{}", e);
                Config::new()
            }
        };
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.cache_size == 0 {
            warn!("cache_size被设置为0，但目前尚不支持禁用缓存，因此该值将被改为5。");
            raw_config.cache_size = 5;
        }
        if raw_config.read_timeout_secs == 0 {
            warn!("read_timeout_secs被设置为0，将使用默认值{}秒。", default_read_timeout_secs());
            raw_config.read_timeout_secs = default_read_timeout_secs();
        }
        raw_config
    }

    pub fn from_toml(filename: &str) -> Self {
        match fs::read_to_string(filename) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) => {
                warn!("无法读取配置文件{}：{}，使用默认配置", filename, e);
                Self::from_toml_str("")
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    pub fn cache_threshold(&self) -> u64 {
        self.cache_threshold
    }

    pub fn folders(&self) -> &[FolderConfig] {
        &self.folders
    }

    pub fn tables(&self) -> &[TableConfig] {
        &self.tables
    }

    pub fn limits(&self) -> Limits {
        Limits {
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            max_line_length: self.max_line_length,
            max_header_count: self.max_header_count,
            max_body_size: self.max_body_size,
        }
    }
}
