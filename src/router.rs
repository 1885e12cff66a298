// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由树模块
//!
//! 路由树在启动时构建一次，之后只读，由连接层通过 `Arc` 共享。
//! 每个节点是以下三种之一：
//! - `Virtual`：虚拟目录，把下一个路径段映射到子节点；
//! - `Folder`：静态文件根目录，剩余路径段解析为文件系统路径；
//! - `Terminal`：终端处理器，自行解释剩余路径段。
//!
//! 路径段游标只能前进，已被某一层消费的段不会被回退。

use std::collections::BTreeMap;

use log::debug;

use crate::{
    exception::Exception,
    folder::Folder,
    param::{ContentType, HttpRequestMethod, Status},
    request::Request,
    response::Response,
    util::HtmlBuilder,
};

/// 终端处理器
///
/// 接收不可变的请求、指向第一个未消费路径段的游标，以及待填充的响应。
/// 处理器必须自行设置状态；找不到资源时保持默认的 404 即可。
pub trait Terminal: Send + Sync {
    fn handle(
        &self,
        request: &Request,
        cursor: Cursor<'_>,
        response: &mut Response,
    ) -> Result<(), Exception>;
}

/// 路径段游标
#[derive(Debug)]
pub struct Cursor<'a> {
    segments: &'a [String],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(segments: &'a [String]) -> Self {
        Self {
            segments,
            position: 0,
        }
    }

    /// 当前段，不前进
    pub fn peek(&self) -> Option<&'a str> {
        self.segments.get(self.position).map(String::as_str)
    }

    /// 尚未消费的段
    pub fn remaining(&self) -> &'a [String] {
        &self.segments[self.position..]
    }

    /// 已消费的段
    pub fn consumed(&self) -> &'a [String] {
        &self.segments[..self.position]
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.segments.len()
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.peek()?;
        self.position += 1;
        Some(segment)
    }
}

/// 路由树节点
pub enum Location {
    Virtual(VirtualFolder),
    Folder(Folder),
    Terminal(Box<dyn Terminal>),
}

impl Location {
    pub fn handle(
        &self,
        request: &Request,
        cursor: Cursor<'_>,
        response: &mut Response,
    ) -> Result<(), Exception> {
        match self {
            Location::Virtual(folder) => folder.handle(request, cursor, response),
            Location::Folder(folder) => folder.handle(request, cursor, response),
            Location::Terminal(terminal) => terminal.handle(request, cursor, response),
        }
    }
}

impl From<VirtualFolder> for Location {
    fn from(folder: VirtualFolder) -> Self {
        Location::Virtual(folder)
    }
}

impl From<Folder> for Location {
    fn from(folder: Folder) -> Self {
        Location::Folder(folder)
    }
}

/// 从根节点开始分派一个请求
pub fn dispatch(root: &Location, request: &Request, response: &mut Response) -> Result<(), Exception> {
    root.handle(request, Cursor::new(request.path()), response)
}

/// 虚拟目录：名称到子节点的有序映射
#[derive(Default)]
pub struct VirtualFolder {
    children: BTreeMap<String, Location>,
}

impl VirtualFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册子节点，同名时替换旧节点
    pub fn add_location(&mut self, name: &str, location: impl Into<Location>) -> &mut Self {
        self.children.insert(name.to_string(), location.into());
        self
    }

    pub fn add_terminal(&mut self, name: &str, terminal: impl Terminal + 'static) -> &mut Self {
        self.add_location(name, Location::Terminal(Box::new(terminal)))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn handle(
        &self,
        request: &Request,
        mut cursor: Cursor<'_>,
        response: &mut Response,
    ) -> Result<(), Exception> {
        let Some(segment) = cursor.next() else {
            return self.list(request, cursor.consumed(), response);
        };
        match self.children.get(segment) {
            Some(child) => child.handle(request, cursor, response),
            None => {
                debug!("虚拟目录中不存在{}", segment);
                response
                    .set_status(Status::NotFound)
                    .push_str("404 / file not found");
                Ok(())
            }
        }
    }

    fn list(&self, request: &Request, path: &[String], response: &mut Response) -> Result<(), Exception> {
        if request.method() != HttpRequestMethod::Get {
            response.set_status(Status::MethodNotAllowed);
            return Ok(());
        }
        let html = HtmlBuilder::from_listing(path, self.children.keys().map(String::as_str)).build();
        response
            .set_status(Status::Ok)
            .set_content_type(ContentType::TextHtml)
            .push_str(&html);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// 记录调用时游标状态的处理器
    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<(Vec<String>, Vec<String>)>>>,
    }

    impl Terminal for Recorder {
        fn handle(&self, _: &Request, cursor: Cursor<'_>, response: &mut Response) -> Result<(), Exception> {
            self.calls
                .lock()
                .unwrap()
                .push((cursor.consumed().to_vec(), cursor.remaining().to_vec()));
            response.set_status(Status::Ok);
            Ok(())
        }
    }

    fn tree(recorder: &Recorder) -> Location {
        let mut api = VirtualFolder::new();
        api.add_terminal("characters", recorder.clone());
        let mut root = VirtualFolder::new();
        root.add_terminal("places", recorder.clone())
            .add_location("api", api);
        root.into()
    }

    fn run(root: &Location, method: HttpRequestMethod, target: &str) -> Response {
        let request = Request::from_target(method, target).unwrap();
        let mut response = Response::new();
        dispatch(root, &request, &mut response).unwrap();
        response
    }

    #[test]
    fn test_cursor_moves_forward_only() {
        let segments = vec!["a".to_string(), "b".to_string()];
        let mut cursor = Cursor::new(&segments);
        assert_eq!(cursor.peek(), Some("a"));
        assert_eq!(cursor.next(), Some("a"));
        assert_eq!(cursor.consumed(), ["a"]);
        assert_eq!(cursor.remaining(), ["b"]);
        assert_eq!(cursor.next(), Some("b"));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_terminal_receives_cursor_at_next_segment() {
        let recorder = Recorder::default();
        let root = tree(&recorder);
        let response = run(&root, HttpRequestMethod::Get, "/places/7");
        assert_eq!(response.status(), Status::Ok);
        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls[0].0, ["places"]);
        assert_eq!(calls[0].1, ["7"]);
    }

    #[test]
    fn test_nested_virtual_folder() {
        let recorder = Recorder::default();
        let root = tree(&recorder);
        run(&root, HttpRequestMethod::Put, "/api/characters/3/name");
        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls[0].0, ["api", "characters"]);
        assert_eq!(calls[0].1, ["3", "name"]);
    }

    #[test]
    fn test_missing_segment_is_404() {
        let recorder = Recorder::default();
        let root = tree(&recorder);
        let response = run(&root, HttpRequestMethod::Get, "/missing");
        assert_eq!(response.status(), Status::NotFound);
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_root_listing_on_get() {
        let root = tree(&Recorder::default());
        let response = run(&root, HttpRequestMethod::Get, "/");
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), ContentType::TextHtml);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("Directory /"));
        assert!(body.find("'/api'").unwrap() < body.find("'/places'").unwrap());
    }

    #[test]
    fn test_nested_listing_uses_consumed_path() {
        let root = tree(&Recorder::default());
        let response = run(&root, HttpRequestMethod::Get, "/api");
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("Directory /api"));
        assert!(body.contains("href='/api/characters'"));
    }

    #[test]
    fn test_listing_rejects_other_methods() {
        let root = tree(&Recorder::default());
        for method in [HttpRequestMethod::Post, HttpRequestMethod::Head, HttpRequestMethod::Delete] {
            let response = run(&root, method, "/");
            assert_eq!(response.status(), Status::MethodNotAllowed);
            assert!(response.body().is_empty());
        }
    }

    #[test]
    fn test_add_location_replaces() {
        let mut folder = VirtualFolder::new();
        folder.add_terminal("x", Recorder::default());
        folder.add_terminal("x", Recorder::default());
        assert_eq!(folder.len(), 1);
    }
}
