//! 响应模型与序列化
//!
//! 处理器只修改状态、内容类型、自定义标头和报文体，连接层负责在最后序列化一次。

use crate::param::*;

use bytes::{BufMut, BytesMut};
use chrono::prelude::*;
use log::debug;

use std::{fmt, path::Path};

#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    content_type: ContentType,
    charset: Charset,
    headers: Vec<(String, String)>,
    body: BytesMut,
}

impl Response {
    /// 新建的响应默认为 404，处理器必须显式设置成功状态。
    pub fn new() -> Self {
        Self {
            status: Status::NotFound,
            content_type: ContentType::TextPlain,
            charset: Charset::Utf8,
            headers: Vec::new(),
            body: BytesMut::new(),
        }
    }

    pub fn with_status(status: Status) -> Self {
        let mut response = Self::new();
        response.set_status(status);
        response
    }

    /// 输入格式错误时的响应，报文体携带错误描述。
    pub fn bad_request(reason: &impl fmt::Display) -> Self {
        let mut response = Self::with_status(Status::BadRequest);
        response.push_str(&format!("Invalid request: {}\n", reason));
        response
    }

    pub fn set_status(&mut self, status: Status) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_content_type(&mut self, content_type: ContentType) -> &mut Self {
        self.content_type = content_type;
        self
    }

    /// 追加一个自定义标头，按插入顺序输出。
    pub fn set_header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.body.put_slice(bytes);
        self
    }

    pub fn push_str(&mut self, text: &str) -> &mut Self {
        self.push_bytes(text.as_bytes())
    }

    /// 以文件内容填充响应：200，内容类型由后缀推断。
    pub fn set_file(&mut self, path: &Path, content: &[u8]) -> &mut Self {
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(ContentType::TextPlain, ContentType::from_extension);
        debug!("文件{}的内容类型：{}", path.display(), content_type.as_str());
        self.set_status(Status::Ok)
            .set_content_type(content_type)
            .push_bytes(content)
    }

    /// 按当前时间序列化。
    pub fn as_bytes(&self) -> Vec<u8> {
        self.serialize_at(&Utc::now())
    }

    pub fn serialize_at(&self, date: &DateTime<Utc>) -> Vec<u8> {
        let mut head = String::with_capacity(256);
        head.push_str(&[HTTP_VERSION, " ", &self.status.to_string(), CRLF].concat());
        head.push_str(&["Date: ", &format_date(date), CRLF].concat());
        head.push_str(&["Connection: close", CRLF].concat());
        head.push_str(&["Server: ", SERVER_NAME, CRLF].concat());
        for (key, value) in &self.headers {
            head.push_str(&[key.as_str(), ": ", value.as_str(), CRLF].concat());
        }
        if !self.body.is_empty() {
            head.push_str(&["Content-Language: ", CONTENT_LANGUAGE, CRLF].concat());
            head.push_str(
                &[
                    "Content-Type: ",
                    self.content_type.as_str(),
                    "; charset=",
                    self.charset.as_str(),
                    CRLF,
                ]
                .concat(),
            );
            head.push_str(&["Content-Length: ", &self.body.len().to_string(), CRLF].concat());
        }
        head.push_str(CRLF);

        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

/// 让处理器可以直接用 `write!` 向报文体写入文本。
impl fmt::Write for Response {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl Response {
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// RFC 1123 格式的 UTC 时间戳
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
