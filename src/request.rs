// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 负责从字节流中顺序读取并解析一个请求，不回溯：
//! 1. 读取方法令牌（直到空格），与方法表做大小写敏感的完整匹配。
//! 2. 读取请求目标（直到空格），交给 URI 模块拆分路径与查询。
//! 3. 读取版本行；与 `HTTP/1.1` 不一致时只记录警告。
//! 4. 逐行读取标头直到空行。每行必须包含紧跟空格的冒号。
//!    标头按原样（大小写敏感）存入映射，重复键时后写入者覆盖先写入者，不做合并。
//! 5. 存在 `Content-Length` 时精确读取相应字节作为报文体；
//!    否则若存在 `Transfer-Encoding` 则失败（不支持分块传输）；两者都没有时报文体为空。

use std::collections::HashMap;

use log::{debug, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::{
    config::Limits,
    exception::Exception,
    param::{HttpRequestMethod, HTTP_VERSION},
    uri::{self, UriPath, UriQuery},
};

/// 一个完整解析后的 HTTP 请求。构造后不可变。
#[derive(Debug, Clone)]
pub struct Request {
    method: HttpRequestMethod,
    path: UriPath,
    query: UriQuery,
    version: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

/// 读取直到 `delim`（不含）。遇到 EOF 时返回 `None`，超过 `limit` 字节时失败。
async fn read_token<R>(reader: &mut R, delim: u8, limit: usize) -> Result<Option<Vec<u8>>, Exception>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    (&mut *reader)
        .take(limit as u64 + 1)
        .read_until(delim, &mut buf)
        .await?;
    if buf.last() == Some(&delim) {
        buf.pop();
        return Ok(Some(buf));
    }
    if buf.len() > limit {
        return Err(Exception::LineTooLong(limit));
    }
    Ok(None)
}

fn into_string(bytes: Vec<u8>) -> Result<String, Exception> {
    String::from_utf8(bytes).map_err(|_| Exception::RequestIsNotUtf8)
}

/// 读取一行：CR 之前的内容，CR 之后必须紧跟 LF。
async fn read_line<R>(reader: &mut R, limit: usize) -> Result<String, Exception>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_token(reader, b'\r', limit)
        .await?
        .ok_or(Exception::UnexpectedEof)?;
    if reader.read_u8().await? != b'\n' {
        return Err(Exception::MissingLineFeed);
    }
    into_string(line)
}

/// 读取方法令牌。连接在发送任何字节之前关闭时返回 `None`。
pub(crate) async fn read_method<R>(
    reader: &mut R,
    limit: usize,
) -> Result<Option<HttpRequestMethod>, Exception>
where
    R: AsyncBufRead + Unpin,
{
    if reader.fill_buf().await?.is_empty() {
        return Ok(None);
    }
    let token = read_token(reader, b' ', limit)
        .await?
        .ok_or(Exception::UnexpectedEof)?;
    let token = into_string(token)?;
    HttpRequestMethod::from_token(&token)
        .map(Some)
        .ok_or(Exception::InvalidRequestMethod(token))
}

/// 把一行标头拆成键和值。
fn split_header(line: &str) -> Result<(String, String), Exception> {
    let colon = line.find(':').ok_or(Exception::MissingHeaderColon)?;
    let value = line[colon + 1..]
        .strip_prefix(' ')
        .ok_or(Exception::MissingHeaderSpace)?;
    if colon == 0 {
        return Err(Exception::EmptyHeaderName);
    }
    Ok((line[..colon].to_string(), value.to_string()))
}

fn parse_content_length(value: &str, limit: usize) -> Result<usize, Exception> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Exception::InvalidContentLength(value.to_string()));
    }
    let length = value
        .parse::<usize>()
        .map_err(|_| Exception::BodyTooLarge(limit))?;
    if length > limit {
        return Err(Exception::BodyTooLarge(limit));
    }
    Ok(length)
}

impl Request {
    /// 从字节流中读取一个请求。
    ///
    /// 客户端在发送任何数据前关闭连接时返回 `Ok(None)`。
    pub async fn read_from<R>(reader: &mut R, limits: &Limits, id: u128) -> Result<Option<Self>, Exception>
    where
        R: AsyncBufRead + Unpin,
    {
        let method = match read_method(reader, limits.max_line_length).await? {
            Some(method) => method,
            None => return Ok(None),
        };

        let target = read_token(reader, b' ', limits.max_line_length)
            .await?
            .ok_or(Exception::UnexpectedEof)?;
        let (path, query) = uri::parse_target(&into_string(target)?)?;

        let version = read_line(reader, limits.max_line_length).await?;
        if version != HTTP_VERSION {
            warn!("[ID{}]非标准的HTTP协议版本：{}", id, version);
        }
        debug!("[ID{}]{} {}", id, method, uri::display_path(&path));

        let mut headers = HashMap::new();
        let mut header_lines = 0;
        loop {
            let line = read_line(reader, limits.max_line_length).await?;
            if line.is_empty() {
                break;
            }
            // 按行计数，重复的键同样占用名额
            if header_lines >= limits.max_header_count {
                return Err(Exception::TooManyHeaders(limits.max_header_count));
            }
            header_lines += 1;
            let (key, value) = split_header(&line)?;
            headers.insert(key, value);
        }

        let mut body = Vec::new();
        match headers.get("Content-Length") {
            Some(value) => {
                let length = parse_content_length(value, limits.max_body_size)?;
                body.resize(length, 0);
                reader.read_exact(&mut body).await?;
                debug!("[ID{}]读取了{}字节的报文体", id, length);
            }
            None if headers.contains_key("Transfer-Encoding") => {
                return Err(Exception::ChunkedTransferUnsupported);
            }
            None => {}
        }

        Ok(Some(Self {
            method,
            path,
            query,
            version,
            headers,
            body,
        }))
    }

    /// 直接由方法和请求目标构造请求，不带标头与报文体。
    pub fn from_target(method: HttpRequestMethod, target: &str) -> Result<Self, Exception> {
        let (path, query) = uri::parse_target(target)?;
        Ok(Self {
            method,
            path,
            query,
            version: HTTP_VERSION.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        })
    }

    /// 附加报文体，并相应设置 `Content-Length`。
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }
}

// --- Getter 访问器实现 ---

impl Request {
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 解码后的路径段
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// 查询参数中第一个匹配 `key` 的值
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// 按原样（大小写敏感）查找标头
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
