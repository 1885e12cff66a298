//! JSON 数据表终端处理器
//!
//! 表的内容在启动时从 JSON 文件载入内存，文件内容必须是对象数组。
//! 表名之下的路径语法为 `[/<id>][/<columns>]`：`id` 全部由数字组成，
//! `columns` 由字母和逗号组成。
//!
//! - GET：返回匹配行组成的 JSON 数组，按 id 和每个查询参数过滤，再按列投影。
//! - PUT：把请求体中的标量写入指定行的单个列，修改只保存在内存中。
//! - 其他方法：405。

use std::{fs, path::Path, sync::RwLock};

use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;

use crate::{
    exception::Exception,
    json::{self, Value},
    param::{ContentType, HttpRequestMethod, Status},
    request::Request,
    response::Response,
    router::{Cursor, Terminal},
};

lazy_static! {
    static ref ID_SEGMENT: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref COLUMNS_SEGMENT: Regex = Regex::new(r"^[A-Za-z,]*$").unwrap();
}

/// 表名之下解析出的选择条件
#[derive(Debug, Default, PartialEq)]
struct Selector<'a> {
    id: Option<u64>,
    columns: Option<&'a str>,
}

impl<'a> Selector<'a> {
    /// 不符合路径语法时返回 `None`
    fn parse(mut cursor: Cursor<'a>) -> Option<Self> {
        let mut selector = Selector::default();
        if let Some(segment) = cursor.peek() {
            if ID_SEGMENT.is_match(segment) {
                selector.id = Some(segment.parse().ok()?);
                cursor.next();
            }
        }
        if let Some(segment) = cursor.next() {
            if !COLUMNS_SEGMENT.is_match(segment) {
                return None;
            }
            selector.columns = Some(segment);
        }
        cursor.is_exhausted().then_some(selector)
    }

    fn column_names(&self) -> Vec<&'a str> {
        self.columns
            .map(|c| c.split(',').filter(|name| !name.is_empty()).collect())
            .unwrap_or_default()
    }
}

/// 查询比较时列的文本形式：字符串取原文，其余取序列化结果
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => json::stringify(other),
    }
}

fn row_id(row: &Value) -> Option<f64> {
    row.get("id").and_then(Value::as_f64)
}

pub struct Table {
    name: String,
    rows: RwLock<Vec<Value>>,
}

impl Table {
    pub fn new(name: &str, rows: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            rows: RwLock::new(rows),
        }
    }

    /// 从 JSON 文本构建，文本必须是对象数组
    pub fn from_json(name: &str, text: &str) -> Result<Self, Exception> {
        let rows = match json::parse(text)? {
            Value::Array(rows) => rows,
            _ => {
                return Err(Exception::HandlerFailed(format!(
                    "table {} is not a json array",
                    name
                )))
            }
        };
        if let Some(row) = rows.iter().find(|row| !matches!(row, Value::Object(_))) {
            return Err(Exception::HandlerFailed(format!(
                "table {} contains a non-object row: {}",
                name, row
            )));
        }
        info!("数据表{}载入了{}行", name, rows.len());
        Ok(Self::new(name, rows))
    }

    pub fn from_file(name: &str, path: &Path) -> Result<Self, Exception> {
        let text = fs::read_to_string(path).map_err(|e| {
            Exception::HandlerFailed(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(name, &text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn select(&self, request: &Request, selector: &Selector<'_>) -> Value {
        let rows = match self.rows.read() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        let columns = selector.column_names();
        let result = rows
            .iter()
            .filter(|row| selector.id.map_or(true, |id| row_id(row) == Some(id as f64)))
            .filter(|row| {
                request
                    .query()
                    .iter()
                    .all(|(key, value)| row.get(key).map(text_of).as_deref() == Some(value.as_str()))
            })
            .map(|row| match (row, columns.is_empty()) {
                (Value::Object(pairs), false) => Value::Object(
                    columns
                        .iter()
                        .filter_map(|name| {
                            pairs
                                .iter()
                                .find(|(k, _)| k == name)
                                .map(|(k, v)| (k.clone(), v.clone()))
                        })
                        .collect(),
                ),
                (row, _) => row.clone(),
            })
            .collect();
        Value::Array(result)
    }

    fn update(&self, request: &Request, selector: &Selector<'_>, response: &mut Response) -> Result<(), Exception> {
        let (Some(id), Some(_)) = (selector.id, selector.columns) else {
            response.set_status(Status::MethodNotAllowed);
            return Ok(());
        };
        if !request.query().is_empty() {
            response.set_status(Status::MethodNotAllowed);
            return Ok(());
        }

        let text = std::str::from_utf8(request.body()).map_err(|_| Exception::RequestIsNotUtf8)?;
        let body = json::parse(text)?;
        let columns = selector.column_names();
        debug!("写入{}到{}的列{:?}", body, self.name, columns);

        if columns.len() != 1 || matches!(body, Value::Array(_)) {
            response.set_status(Status::NotImplemented);
            return Ok(());
        }
        let value = match body {
            Value::Object(_) => return Err(Exception::UnstorableValue),
            Value::Bool(b) => Value::Number(if b { 1.0 } else { 0.0 }),
            scalar => scalar,
        };

        let mut rows = match self.rows.write() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(Value::Object(pairs)) = rows.iter_mut().find(|row| row_id(row) == Some(id as f64)) else {
            warn!("数据表{}中不存在id为{}的行", self.name, id);
            response.set_status(Status::NotFound);
            return Ok(());
        };
        let column = columns[0];
        match pairs.iter_mut().find(|(k, _)| k == column) {
            Some((_, old)) => *old = value,
            None => pairs.push((column.to_string(), value)),
        }
        response.set_status(Status::Ok);
        Ok(())
    }
}

impl Terminal for Table {
    fn handle(&self, request: &Request, cursor: Cursor<'_>, response: &mut Response) -> Result<(), Exception> {
        debug!(
            "{} table {}: {}",
            request.method(),
            self.name,
            cursor.remaining().join("/")
        );
        response.set_status(Status::NotFound);
        let Some(selector) = Selector::parse(cursor) else {
            return Ok(());
        };

        match request.method() {
            HttpRequestMethod::Get => {
                let result = self.select(request, &selector);
                response
                    .set_status(Status::Ok)
                    .set_content_type(ContentType::AppJson)
                    .push_str(&json::stringify(&result));
                Ok(())
            }
            HttpRequestMethod::Put => self.update(request, &selector, response),
            _ => {
                response.set_status(Status::MethodNotAllowed);
                Ok(())
            }
        }
    }
}
