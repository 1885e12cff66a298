// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在请求处理生命周期中可能产生的各类错误。
//!
//! ## 错误分类
//! - **Malformed-Input**：URI、请求行、标头、报文体长度以及 JSON 请求体的格式错误，
//!   包括明确不支持的特性（分块传输、`\u` 转义）。连接层将其转化为 `400 Bad Request`，
//!   并把 `Display` 文本写入响应体。
//! - **Handler-Failure**：处理器内部的失败。连接层将其转化为 `500 Internal Server Error`，
//!   响应体为空，细节只写入日志。
//!
//! 路由未命中（404）不是错误，只是响应状态。

use std::{fmt, io};

use crate::json;

/// 服务器处理请求过程中发生的异常类型。
#[derive(Debug, Clone, PartialEq)]
pub enum Exception {
    /// `%` 之后缺少十六进制数字。
    MissingHexDigit,
    /// `%` 之后的字符不是十六进制数字。
    InvalidHexDigit,
    /// 在转义序列之外出现了保留字符。
    ReservedCharacter(char),
    /// 解码后的路径段或查询值不是合法的 UTF-8。
    DecodedTextIsNotUtf8,
    /// 查询键包含字母数字以外的字符。
    QueryKeyNotAlphanumeric,
    /// 查询值中出现了未转义的 `/`。
    SlashInQueryValue,
    /// 查询值中出现了未转义的 `&`。
    AmpersandInQueryValue,
    /// 请求行或标头不是合法的 UTF-8。
    RequestIsNotUtf8,
    /// 请求方法不在方法表中。
    InvalidRequestMethod(String),
    /// 单行长度超过限制。
    LineTooLong(usize),
    /// CR 之后没有紧跟 LF。
    MissingLineFeed,
    /// 标头行中没有冒号。
    MissingHeaderColon,
    /// 标头行的冒号之后没有空格。
    MissingHeaderSpace,
    /// 标头名为空。
    EmptyHeaderName,
    /// 标头行数超过限制。
    TooManyHeaders(usize),
    /// `Content-Length` 不是十进制非负整数。
    InvalidContentLength(String),
    /// 报文体超过限制。
    BodyTooLarge(usize),
    /// 分块传输编码不受支持。
    ChunkedTransferUnsupported,
    /// 报文在结束之前断开。
    UnexpectedEof,
    /// 请求体中的 JSON 无法解析。
    Json(json::Error),
    /// 数组或对象无法存入单个列。
    UnstorableValue,
    /// 外部协作者报告的失败。
    HandlerFailed(String),
    /// 读写套接字时发生的 I/O 错误。
    Io(io::ErrorKind),
}

use Exception::*;

impl Exception {
    /// 该错误是否属于客户端输入格式错误（对应 400）。
    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, UnstorableValue | HandlerFailed(_) | Io(_))
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingHexDigit => write!(f, "Missing hex digit after %"),
            InvalidHexDigit => write!(f, "Invalid digit character after %"),
            ReservedCharacter(ch) => write!(f, "Encountered reserved character {:?}", ch),
            DecodedTextIsNotUtf8 => write!(f, "Percent-decoded text is not valid UTF-8"),
            QueryKeyNotAlphanumeric => write!(f, "Query key was not purely alphanumeric"),
            SlashInQueryValue => write!(f, "Slash in query value"),
            AmpersandInQueryValue => write!(f, "Ampersand in query value"),
            RequestIsNotUtf8 => write!(f, "Request head can't be parsed in UTF-8"),
            InvalidRequestMethod(token) => write!(f, "Invalid request method: '{}'", token),
            LineTooLong(limit) => write!(f, "Line exceeds {} bytes", limit),
            MissingLineFeed => write!(f, "Missing LF after CR in header"),
            MissingHeaderColon => write!(f, "Missing colon in header field"),
            MissingHeaderSpace => write!(f, "Missing space after colon in header field"),
            EmptyHeaderName => write!(f, "Empty header field name"),
            TooManyHeaders(limit) => write!(f, "More than {} header fields", limit),
            InvalidContentLength(value) => write!(f, "Invalid Content-Length: '{}'", value),
            BodyTooLarge(limit) => write!(f, "Body exceeds {} bytes", limit),
            ChunkedTransferUnsupported => write!(f, "Chunked transfer not supported"),
            UnexpectedEof => write!(f, "Unexpected end of request"),
            Json(e) => write!(f, "Invalid JSON body: {}", e),
            UnstorableValue => write!(f, "Cannot store json arrays or objects"),
            HandlerFailed(detail) => write!(f, "Handler failed: {}", detail),
            Io(kind) => write!(f, "I/O error: {}", kind),
        }
    }
}

impl std::error::Error for Exception {}

impl From<json::Error> for Exception {
    fn from(e: json::Error) -> Self {
        Json(e)
    }
}

impl From<io::Error> for Exception {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => UnexpectedEof,
            kind => Io(kind),
        }
    }
}
