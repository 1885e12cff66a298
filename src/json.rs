// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # JSON 编解码模块
//!
//! 单遍递归下降解析器，只需一个字符的前瞻。根据下一个非空白字符选择模式：
//! 字面量（`null`/`true`/`false`）、数字、字符串、数组、对象。
//!
//! 对象保留插入顺序且允许重复键，解析时不做去重，以保证往返一致。
//!
//! 序列化器只转义 `\` 和 `"`，而解析器接受完整的转义集合（`\u` 除外）。
//! 两者的不对称是有意的：输出保持最简，输入保持宽容。

use std::fmt;

/// JSON 数组
pub type Array = Vec<Value>;

/// JSON 对象：有序的键值对列表，允许重复键
pub type Object = Vec<(String, Value)>;

/// JSON 值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Object),
}

impl Value {
    /// 按键查找对象中第一个匹配的值。
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Value::Array(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidValue,
    InvalidLiteral,
    LeadingZero,
    MissingDigits,
    EmptyFraction,
    EmptyExponent,
    UnexpectedInNumber,
    InvalidStringStart,
    InvalidEscape,
    UnicodeEscapeUnimplemented,
    UnterminatedString,
    InvalidArrayTermination,
    InvalidAfterArrayItem,
    UnterminatedArray,
    InvalidObjectTermination,
    InvalidAfterPropertyName,
    InvalidAfterObjectValue,
    UnterminatedObject,
    TrailingCharacters,
    NestingTooDeep,
}

/// 解析错误，附带出错位置（字节偏移）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    offset: usize,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ErrorKind::*;
        let message = match self.kind {
            InvalidValue => "Not a valid value",
            InvalidLiteral => "Invalid literal",
            LeadingZero => "Unexpected character while parsing number with initial zero",
            MissingDigits => "Number has no digits",
            EmptyFraction => "Number ended with period",
            EmptyExponent => "Number ended with exponent",
            UnexpectedInNumber => "Unexpected character while parsing number",
            InvalidStringStart => "Invalid start of string",
            InvalidEscape => "Invalid escape character",
            UnicodeEscapeUnimplemented => "Unicode codepoints in strings not implemented",
            UnterminatedString => "Unexpected end of data while parsing string",
            InvalidArrayTermination => "Invalid termination of array",
            InvalidAfterArrayItem => "Invalid character after array item",
            UnterminatedArray => "Unexpected end of data while parsing array",
            InvalidObjectTermination => "Invalid termination of object",
            InvalidAfterPropertyName => "Unexpected character after property name",
            InvalidAfterObjectValue => "Invalid character after object value",
            UnterminatedObject => "Unexpected end of data while parsing object",
            TrailingCharacters => "Unexpected characters after value",
            NestingTooDeep => "Arrays and objects nested too deeply",
        };
        write!(f, "{} at offset {}", message, self.offset)
    }
}

impl std::error::Error for Error {}

/// 数组与对象的最大嵌套层数
pub const MAX_DEPTH: usize = 128;

/// 解析一段完整的 JSON 文本。值之后只允许出现空白。
pub fn parse(text: &str) -> Result<Value, Error> {
    let mut parser = Parser {
        src: text.as_bytes(),
        pos: 0,
        depth: 0,
    };
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos != parser.src.len() {
        return Err(parser.error(ErrorKind::TrailingCharacters));
    }
    Ok(value)
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// 字面量和数字之后允许出现的字符；`None` 表示输入结束
fn is_token_stop(next: Option<u8>) -> bool {
    match next {
        None => true,
        Some(byte) => is_whitespace(byte) || matches!(byte, b',' | b']' | b'}'),
    }
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, kind: ErrorKind) -> Error {
        Error {
            kind,
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, is_whitespace) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Value, Error> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'n') => self.expect_literal("null").map(|_| Value::Null),
            Some(b't') => self.expect_literal("true").map(|_| Value::Bool(true)),
            Some(b'f') => self.expect_literal("false").map(|_| Value::Bool(false)),
            Some(b'-' | b'0'..=b'9') => self.parse_number().map(Value::Number),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b'[') => self.nested(Self::parse_array).map(Value::Array),
            Some(b'{') => self.nested(Self::parse_object).map(Value::Object),
            _ => Err(self.error(ErrorKind::InvalidValue)),
        }
    }

    /// 递归进入数组或对象，层数超过 `MAX_DEPTH` 时失败
    fn nested<T>(&mut self, parse: fn(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(ErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn expect_literal(&mut self, literal: &str) -> Result<(), Error> {
        if !self.src[self.pos..].starts_with(literal.as_bytes()) {
            return Err(self.error(ErrorKind::InvalidLiteral));
        }
        self.pos += literal.len();
        // 防止 `nullx` 这类以字面量开头的残缺令牌
        if !is_token_stop(self.peek()) {
            return Err(self.error(ErrorKind::InvalidLiteral));
        }
        Ok(())
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().map_or(false, |b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// 先按语法校验数字，再交给标准库把已校验的片段转换为 `f64`。
    fn parse_number(&mut self) -> Result<f64, Error> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if self.peek().map_or(false, |b| b.is_ascii_digit()) {
                    return Err(self.error(ErrorKind::LeadingZero));
                }
            }
            Some(b'1'..=b'9') => {
                self.skip_digits();
            }
            _ => return Err(self.error(ErrorKind::MissingDigits)),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if self.skip_digits() == 0 {
                return Err(self.error(ErrorKind::EmptyFraction));
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                return Err(self.error(ErrorKind::EmptyExponent));
            }
        }
        if !is_token_stop(self.peek()) {
            return Err(self.error(ErrorKind::UnexpectedInNumber));
        }
        // 片段只含 ASCII 数字、符号、小数点和指数符号
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .ok_or(Error {
                kind: ErrorKind::UnexpectedInNumber,
                offset: start,
            })
    }

    fn parse_string(&mut self) -> Result<String, Error> {
        self.skip_whitespace();
        if self.peek() != Some(b'"') {
            return Err(self.error(ErrorKind::InvalidStringStart));
        }
        self.pos += 1;
        let mut result = Vec::new();
        while let Some(byte) = self.peek() {
            self.pos += 1;
            match byte {
                b'"' => {
                    // 输入是合法 UTF-8，且只在 ASCII 边界处切分
                    return Ok(String::from_utf8_lossy(&result).into_owned());
                }
                b'\\' => {
                    let escaped = match self.peek() {
                        Some(b'"') => b'"',
                        Some(b'\\') => b'\\',
                        Some(b'/') => b'/',
                        Some(b'b') => 0x08,
                        Some(b'f') => 0x0c,
                        Some(b'n') => b'\n',
                        Some(b'r') => b'\r',
                        Some(b't') => b'\t',
                        Some(b'u') => return Err(self.error(ErrorKind::UnicodeEscapeUnimplemented)),
                        Some(_) => return Err(self.error(ErrorKind::InvalidEscape)),
                        None => break,
                    };
                    result.push(escaped);
                    self.pos += 1;
                }
                other => result.push(other),
            }
        }
        Err(self.error(ErrorKind::UnterminatedString))
    }

    fn parse_array(&mut self) -> Result<Array, Error> {
        // 调用方已确认当前字符是 `[`
        self.pos += 1;
        let mut array = Array::new();
        self.skip_whitespace();
        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                return Ok(array);
            }
            Some(b'}' | b',') => return Err(self.error(ErrorKind::InvalidArrayTermination)),
            None => return Err(self.error(ErrorKind::UnterminatedArray)),
            _ => {}
        }
        loop {
            array.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(array);
                }
                Some(b',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b']' | b'}' | b',') => {
                            return Err(self.error(ErrorKind::InvalidArrayTermination))
                        }
                        None => return Err(self.error(ErrorKind::UnterminatedArray)),
                        _ => {}
                    }
                }
                Some(_) => return Err(self.error(ErrorKind::InvalidAfterArrayItem)),
                None => return Err(self.error(ErrorKind::UnterminatedArray)),
            }
        }
    }

    fn parse_object(&mut self) -> Result<Object, Error> {
        self.pos += 1;
        let mut object = Object::new();
        self.skip_whitespace();
        match self.peek() {
            Some(b'}') => {
                self.pos += 1;
                return Ok(object);
            }
            Some(b']' | b',') => return Err(self.error(ErrorKind::InvalidObjectTermination)),
            None => return Err(self.error(ErrorKind::UnterminatedObject)),
            _ => {}
        }
        loop {
            let key = self.parse_string()?;
            self.skip_whitespace();
            match self.peek() {
                Some(b':') => self.pos += 1,
                None => return Err(self.error(ErrorKind::UnterminatedObject)),
                Some(_) => return Err(self.error(ErrorKind::InvalidAfterPropertyName)),
            }
            let value = self.parse_value()?;
            object.push((key, value));
            self.skip_whitespace();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(object);
                }
                Some(b',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    match self.peek() {
                        Some(b'}' | b']' | b',') => {
                            return Err(self.error(ErrorKind::InvalidObjectTermination))
                        }
                        None => return Err(self.error(ErrorKind::UnterminatedObject)),
                        _ => {}
                    }
                }
                Some(_) => return Err(self.error(ErrorKind::InvalidAfterObjectValue)),
                None => return Err(self.error(ErrorKind::UnterminatedObject)),
            }
        }
    }
}

/// 序列化字符串：加引号，只转义 `\` 和 `"`。
pub fn stringify_str(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}

/// 序列化数字：定点表示，去掉尾随的零和小数点（`3.0` → `3`）。
///
/// 非有限值无法用 JSON 表达，输出 `null`。
pub fn stringify_number(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_string();
    }
    let mut result = value.to_string();
    if result.contains('.') {
        while result.ends_with('0') {
            result.pop();
        }
        if result.ends_with('.') {
            result.pop();
        }
    }
    result
}

/// 按 `[ e, e ]` 的格式拼接，空集合输出 `[ ]`。
fn delimit<I>(open: char, close: char, items: I) -> String
where
    I: Iterator<Item = String>,
{
    let mut result = String::new();
    result.push(open);
    let mut delim = " ";
    for item in items {
        result.push_str(delim);
        result.push_str(&item);
        delim = ", ";
    }
    result.push(' ');
    result.push(close);
    result
}

/// 将 JSON 值序列化为文本。
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Number(n) => stringify_number(*n),
        Value::String(s) => stringify_str(s),
        Value::Array(items) => delimit('[', ']', items.iter().map(stringify)),
        Value::Object(pairs) => delimit(
            '{',
            '}',
            pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", stringify_str(k), stringify(v))),
        ),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kind_of(text: &str) -> ErrorKind {
        parse(text).unwrap_err().kind()
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("null").unwrap(), Value::Null);
        assert_eq!(parse(" true ").unwrap(), Value::Bool(true));
        assert_eq!(parse("\tfalse\n").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_partial_literals_rejected() {
        assert_eq!(kind_of("nul"), ErrorKind::InvalidLiteral);
        assert_eq!(kind_of("nullx"), ErrorKind::InvalidLiteral);
        assert_eq!(kind_of("trueish"), ErrorKind::InvalidLiteral);
        assert_eq!(kind_of("fals"), ErrorKind::InvalidLiteral);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("0").unwrap(), Value::Number(0.0));
        assert_eq!(parse("-0.5").unwrap(), Value::Number(-0.5));
        assert_eq!(parse("1.5e2").unwrap(), Value::Number(150.0));
        assert_eq!(parse("1.5E+2").unwrap(), Value::Number(150.0));
        assert_eq!(parse("25e-1").unwrap(), Value::Number(2.5));
        assert_eq!(parse("0e3").unwrap(), Value::Number(0.0));
        assert_eq!(parse("123456").unwrap(), Value::Number(123456.0));
    }

    #[test]
    fn test_number_errors() {
        assert_eq!(kind_of("01"), ErrorKind::LeadingZero);
        assert_eq!(kind_of("-01"), ErrorKind::LeadingZero);
        assert_eq!(kind_of("1."), ErrorKind::EmptyFraction);
        assert_eq!(kind_of("1.e5"), ErrorKind::EmptyFraction);
        assert_eq!(kind_of("1e"), ErrorKind::EmptyExponent);
        assert_eq!(kind_of("1e+"), ErrorKind::EmptyExponent);
        assert_eq!(kind_of("-"), ErrorKind::MissingDigits);
        assert_eq!(kind_of("-x"), ErrorKind::MissingDigits);
        assert_eq!(kind_of("12a"), ErrorKind::UnexpectedInNumber);
        assert_eq!(kind_of("1.5.2"), ErrorKind::UnexpectedInNumber);
    }

    #[test]
    fn test_strings() {
        assert_eq!(parse(r#""abc""#).unwrap(), Value::from("abc"));
        assert_eq!(parse(r#""""#).unwrap(), Value::from(""));
        assert_eq!(
            parse(r#""a\"b\\c\/d\b\f\n\r\t""#).unwrap(),
            Value::from("a\"b\\c/d\u{8}\u{c}\n\r\t")
        );
        assert_eq!(parse(r#""héllo""#).unwrap(), Value::from("héllo"));
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(kind_of(r#""\u0041""#), ErrorKind::UnicodeEscapeUnimplemented);
        assert_eq!(kind_of(r#""\x""#), ErrorKind::InvalidEscape);
        assert_eq!(kind_of(r#""abc"#), ErrorKind::UnterminatedString);
        assert_eq!(kind_of(r#""abc\"#), ErrorKind::UnterminatedString);
    }

    #[test]
    fn test_arrays() {
        assert_eq!(parse("[]").unwrap(), Value::Array(vec![]));
        assert_eq!(parse("[ ]").unwrap(), Value::Array(vec![]));
        assert_eq!(
            parse("[1, [true], \"x\"]").unwrap(),
            Value::Array(vec![
                Value::Number(1.0),
                Value::Array(vec![Value::Bool(true)]),
                Value::from("x"),
            ])
        );
    }

    #[test]
    fn test_array_errors() {
        assert_eq!(kind_of("[1,]"), ErrorKind::InvalidArrayTermination);
        assert_eq!(kind_of("[,1]"), ErrorKind::InvalidArrayTermination);
        assert_eq!(kind_of("[}"), ErrorKind::InvalidArrayTermination);
        assert_eq!(kind_of("[1}"), ErrorKind::InvalidAfterArrayItem);
        assert_eq!(kind_of("[1 2]"), ErrorKind::InvalidAfterArrayItem);
        assert_eq!(kind_of("[1"), ErrorKind::UnterminatedArray);
        assert_eq!(kind_of("["), ErrorKind::UnterminatedArray);
    }

    #[test]
    fn test_nesting_limit() {
        let deepest = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse(&deepest).is_ok());

        let too_deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        let err = parse(&too_deep).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NestingTooDeep);
        assert_eq!(err.offset(), MAX_DEPTH);

        // 1 MiB 的左括号必须以错误返回，不能耗尽线程栈
        assert_eq!(kind_of(&"[".repeat(1 << 20)), ErrorKind::NestingTooDeep);
        assert_eq!(kind_of(&r#"{"a":"#.repeat(1 << 16)), ErrorKind::NestingTooDeep);
    }

    #[test]
    fn test_objects_keep_order_and_duplicates() {
        let value = parse(r#"{"b": 1, "a": 2, "b": 3}"#).unwrap();
        assert_eq!(
            value,
            Value::Object(vec![
                ("b".to_string(), Value::Number(1.0)),
                ("a".to_string(), Value::Number(2.0)),
                ("b".to_string(), Value::Number(3.0)),
            ])
        );
        assert_eq!(value.get("b"), Some(&Value::Number(1.0)));
        assert_eq!(stringify(&value), r#"{ "b": 1, "a": 2, "b": 3 }"#);
    }

    #[test]
    fn test_object_errors() {
        assert_eq!(kind_of(r#"{"a":1,}"#), ErrorKind::InvalidObjectTermination);
        assert_eq!(kind_of(r#"{,}"#), ErrorKind::InvalidObjectTermination);
        assert_eq!(kind_of(r#"{"a":1]"#), ErrorKind::InvalidAfterObjectValue);
        assert_eq!(kind_of(r#"{a:1}"#), ErrorKind::InvalidStringStart);
        assert_eq!(kind_of(r#"{1:1}"#), ErrorKind::InvalidStringStart);
        assert_eq!(kind_of(r#"{"a" 1}"#), ErrorKind::InvalidAfterPropertyName);
        assert_eq!(kind_of(r#"{"a":1"#), ErrorKind::UnterminatedObject);
        assert_eq!(kind_of(r#"{"a":}"#), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_top_level_errors() {
        assert_eq!(kind_of(""), ErrorKind::InvalidValue);
        assert_eq!(kind_of("   "), ErrorKind::InvalidValue);
        assert_eq!(kind_of("1 2"), ErrorKind::TrailingCharacters);
        assert_eq!(kind_of("{} x"), ErrorKind::TrailingCharacters);
    }

    #[test]
    fn test_error_offset() {
        let err = parse("[1, 2,]").unwrap_err();
        assert_eq!(err.offset(), 6);
        assert!(err.to_string().contains("offset 6"));
    }

    #[test]
    fn test_stringify_scalars() {
        assert_eq!(stringify(&Value::Null), "null");
        assert_eq!(stringify(&Value::Bool(true)), "true");
        assert_eq!(stringify(&Value::Number(3.0)), "3");
        assert_eq!(stringify(&Value::Number(-0.5)), "-0.5");
        assert_eq!(stringify(&Value::Number(150.0)), "150");
        assert_eq!(stringify(&Value::Number(f64::NAN)), "null");
        assert_eq!(stringify(&Value::from("a\"b\\c")), r#""a\"b\\c""#);
        assert_eq!(stringify(&Value::from("line\n")), "\"line\n\"");
    }

    #[test]
    fn test_stringify_collections() {
        assert_eq!(stringify(&Value::Array(vec![])), "[ ]");
        assert_eq!(stringify(&Value::Object(vec![])), "{ }");
        let value = Value::Array(vec![
            Value::Number(1.0),
            Value::Object(vec![("k".to_string(), Value::from("v"))]),
        ]);
        assert_eq!(stringify(&value), r#"[ 1, { "k": "v" } ]"#);
        assert_eq!(value.to_string(), stringify(&value));
    }

    #[test]
    fn test_escape_asymmetry_round_trip() {
        // `\/` 被解析但序列化时不再转义
        let value = parse(r#""a\/b""#).unwrap();
        assert_eq!(stringify(&value), r#""a/b""#);
    }

    /// 与 serde_json 对照：同一份无重复键、无 `\u` 的文本应得到相同的值
    #[test]
    fn test_agrees_with_serde_json() {
        fn convert(value: &serde_json::Value) -> Value {
            match value {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::Bool(*b),
                serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap()),
                serde_json::Value::String(s) => Value::String(s.clone()),
                serde_json::Value::Array(items) => Value::Array(items.iter().map(convert).collect()),
                serde_json::Value::Object(map) => Value::Object(
                    map.iter().map(|(k, v)| (k.clone(), convert(v))).collect(),
                ),
            }
        }
        fn sorted(value: Value) -> Value {
            match value {
                Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
                Value::Object(mut pairs) => {
                    pairs.sort_by(|a, b| a.0.cmp(&b.0));
                    Value::Object(pairs.into_iter().map(|(k, v)| (k, sorted(v))).collect())
                }
                other => other,
            }
        }
        let docs = [
            r#"{"name": "Oslo", "id": 7, "tags": ["a", "b"], "open": true, "note": null}"#,
            r#"[0, -0.5, 1.5e2, 2E-3, 12345678901234]"#,
            r#"{"nested": {"deep": [{"x": "y\n\t\"z\""}]}}"#,
            r#"  [ ]  "#,
        ];
        for doc in docs {
            let ours = sorted(parse(doc).unwrap());
            let theirs = sorted(convert(&serde_json::from_str(doc).unwrap()));
            assert_eq!(ours, theirs, "mismatch for {}", doc);
        }
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<f64>()
                .prop_filter("finite", |n| n.is_finite())
                .prop_map(Value::Number),
            "[^\\\\\"]{0,12}".prop_map(Value::String),
            "[a-z\\\\\" ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..6).prop_map(|pairs| {
                    let mut seen = std::collections::HashSet::new();
                    Value::Object(
                        pairs
                            .into_iter()
                            .filter(|(k, _)| seen.insert(k.clone()))
                            .collect(),
                    )
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn serialized_text_round_trips(value in arb_value()) {
            let text = stringify(&value);
            let reparsed = parse(&text).unwrap();
            prop_assert_eq!(stringify(&reparsed), text);
            prop_assert_eq!(reparsed, value);
        }
    }
}
