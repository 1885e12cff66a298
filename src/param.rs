// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了 `rested` 遵循的 HTTP 协议相关常量和强类型枚举：
//! - 请求方法表（大小写敏感的完整令牌匹配）。
//! - 状态码及其原因短语（Reason Phrase）。
//! - 内容类型与字符集，以及按文件后缀推断内容类型的映射表。

use lazy_static::lazy_static;
use std::{collections::HashMap, fmt};

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = concat!("rested/", env!("CARGO_PKG_VERSION"));

/// 服务器唯一支持的协议版本
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 响应体的语言，写入 `Content-Language`
pub const CONTENT_LANGUAGE: &str = "en";

/// 静态目录下的默认首页文件名
pub const HTML_INDEX: &str = "index.html";

/// 标准 HTTP 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRequestMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
}

impl HttpRequestMethod {
    /// 将请求行中的方法令牌映射为枚举。只接受完全匹配的大写令牌。
    pub fn from_token(token: &str) -> Option<Self> {
        use HttpRequestMethod::*;
        match token {
            "GET" => Some(Get),
            "HEAD" => Some(Head),
            "POST" => Some(Post),
            "PUT" => Some(Put),
            "DELETE" => Some(Delete),
            "CONNECT" => Some(Connect),
            "OPTIONS" => Some(Options),
            "TRACE" => Some(Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use HttpRequestMethod::*;
        match self {
            Get => "GET",
            Head => "HEAD",
            Post => "POST",
            Put => "PUT",
            Delete => "DELETE",
            Connect => "CONNECT",
            Options => "OPTIONS",
            Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 服务器会产生的响应状态。
///
/// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Found,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    RequestTimeout,
    InternalError,
    NotImplemented,
    VersionNotSupported,
}

impl Status {
    pub fn code(&self) -> u16 {
        use Status::*;
        match self {
            Ok => 200,
            Found => 302,
            BadRequest => 400,
            Unauthorized => 401,
            Forbidden => 403,
            NotFound => 404,
            MethodNotAllowed => 405,
            RequestTimeout => 408,
            InternalError => 500,
            NotImplemented => 501,
            VersionNotSupported => 505,
        }
    }

    pub fn reason(&self) -> &'static str {
        use Status::*;
        match self {
            Ok => "OK",
            Found => "Found",
            BadRequest => "Bad Request",
            Unauthorized => "Unauthorized",
            Forbidden => "Forbidden",
            NotFound => "Not Found",
            MethodNotAllowed => "Method Not Allowed",
            RequestTimeout => "Request Timeout",
            InternalError => "Internal Server Error",
            NotImplemented => "Not Implemented",
            VersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// 响应体的内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    TextPlain,
    TextHtml,
    TextCss,
    AppJson,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::TextPlain => "text/plain",
            ContentType::TextHtml => "text/html",
            ContentType::TextCss => "text/css",
            ContentType::AppJson => "application/json",
        }
    }

    /// 根据文件后缀（不含点）推断内容类型，未知后缀回退到 `text/plain`。
    pub fn from_extension(extension: &str) -> Self {
        EXTENSION_TYPES
            .get(extension)
            .copied()
            .unwrap_or(ContentType::TextPlain)
    }
}

/// 响应体的字符集
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
}

impl Charset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
        }
    }
}

lazy_static! {
    /// 文件后缀名到内容类型的映射表。
    ///
    /// `js` 映射到 `application/json` 是沿用下来的行为，客户端脚本依赖它。
    pub static ref EXTENSION_TYPES: HashMap<&'static str, ContentType> = {
        let mut map = HashMap::new();
        map.insert("html", ContentType::TextHtml);
        map.insert("css", ContentType::TextCss);
        map.insert("js", ContentType::AppJson);
        map
    };
}
