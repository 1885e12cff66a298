// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # URI 解析模块
//!
//! 将请求行中的原始目标（request target）拆分为规范化的路径段序列和解码后的查询参数列表。
//!
//! - 百分号解码只接受 `%XX` 以及非保留字符集 `[A-Za-z0-9-._~,]`，其它任何原始字节都会被拒绝。
//! - 路径段 `.` 被丢弃；`..` 会与前一个段一同折叠，若前面没有段则按字面保留。
//! - 查询键必须是纯字母数字；查询值不得包含原始的 `/` 或 `&`。

use crate::exception::Exception;

/// 解码后的路径段序列，不含空段
pub type UriPath = Vec<String>;

/// 解码后的查询参数，保留顺序与重复键
pub type UriQuery = Vec<(String, String)>;

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b',')
}

/// 取出 `text` 中第一个 `delim` 之前的部分，并把 `text` 推进到分隔符之后。
fn pop<'a>(text: &mut &'a str, delim: char) -> &'a str {
    match text.split_once(delim) {
        Some((head, rest)) => {
            *text = rest;
            head
        }
        None => std::mem::take(text),
    }
}

fn pop_hex_digit(bytes: &mut std::slice::Iter<'_, u8>) -> Result<u8, Exception> {
    let byte = bytes.next().ok_or(Exception::MissingHexDigit)?;
    (*byte as char)
        .to_digit(16)
        .map(|d| d as u8)
        .ok_or(Exception::InvalidHexDigit)
}

/// 对一段文本做百分号解码。
pub fn unescape(escaped: &str) -> Result<String, Exception> {
    let mut result = Vec::with_capacity(escaped.len());
    let mut bytes = escaped.as_bytes().iter();
    while let Some(&byte) = bytes.next() {
        if byte == b'%' {
            let high = pop_hex_digit(&mut bytes)?;
            let low = pop_hex_digit(&mut bytes)?;
            result.push((high << 4) | low);
        } else if is_unreserved(byte) {
            result.push(byte);
        } else {
            // 非 ASCII 字节在这里也会被拒绝，取首字符用于错误信息
            let ch = escaped[escaped.len() - bytes.as_slice().len() - 1..]
                .chars()
                .next()
                .unwrap_or(byte as char);
            return Err(Exception::ReservedCharacter(ch));
        }
    }
    String::from_utf8(result).map_err(|_| Exception::DecodedTextIsNotUtf8)
}

/// 解析路径部分（`?` 之前）。
pub fn parse_path(mut text: &str) -> Result<UriPath, Exception> {
    let mut result = UriPath::new();
    loop {
        text = text.trim_start_matches('/');
        if text.is_empty() {
            break;
        }
        let segment = unescape(pop(&mut text, '/'))?;
        if segment == "." {
            continue;
        }
        if segment == ".." && !result.is_empty() {
            result.pop();
            continue;
        }
        result.push(segment);
    }
    Ok(result)
}

/// 解析查询字符串部分（`?` 之后，不含 `?`）。
pub fn parse_query(mut text: &str) -> Result<UriQuery, Exception> {
    let mut result = UriQuery::new();
    while !text.is_empty() {
        let mut value = pop(&mut text, '&');
        let key = pop(&mut value, '=');
        if !key.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Exception::QueryKeyNotAlphanumeric);
        }
        for ch in value.chars() {
            match ch {
                '/' => return Err(Exception::SlashInQueryValue),
                '&' => return Err(Exception::AmpersandInQueryValue),
                _ => {}
            }
        }
        result.push((key.to_string(), unescape(value)?));
    }
    Ok(result)
}

/// 在第一个 `?` 处拆分请求目标，分别解析路径与查询。
pub fn parse_target(target: &str) -> Result<(UriPath, UriQuery), Exception> {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    Ok((parse_path(path)?, parse_query(query)?))
}

/// 将路径段重新拼接成以 `/` 开头的展示形式。
pub fn display_path(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}
