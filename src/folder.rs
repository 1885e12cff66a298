//! 静态文件目录节点
//!
//! 剩余路径段拼接到根目录之下：目录中存在 `index.html` 时重定向到它，
//! 普通文件按后缀推断内容类型后返回，其余情况保持 404。

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use bytes::Bytes;
use log::{debug, warn};

use crate::{
    cache::FileCache,
    exception::Exception,
    param::{HttpRequestMethod, Status, HTML_INDEX},
    request::Request,
    response::Response,
    router::Cursor,
    uri::display_path,
};

pub struct Folder {
    root: PathBuf,
    cache: Mutex<FileCache>,
}

/// 不能被拼接进文件系统路径的路径段
fn is_forbidden_segment(segment: &str) -> bool {
    segment == ".." || segment.contains(['/', '\\', '\0'])
}

impl Folder {
    pub fn new(root: impl Into<PathBuf>, cache_size: usize, cache_threshold: u64) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(FileCache::new(cache_size, cache_threshold)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock_cache(&self) -> MutexGuard<'_, FileCache> {
        match self.cache.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                warn!("缓存锁被污染，恢复并继续");
                poisoned.into_inner()
            }
        }
    }

    /// 读取文件内容。锁只在查找和写入缓存时持有，磁盘读取在锁外进行。
    fn read_file(&self, path: &Path) -> Result<Bytes, Exception> {
        let metadata = fs::metadata(path)?;
        let modified_time = metadata.modified()?;
        if let Some(content) = self.lock_cache().find(path, modified_time) {
            debug!("缓存命中：{}", path.display());
            return Ok(content);
        }
        let content = Bytes::from(fs::read(path)?);
        let mut cache = self.lock_cache();
        if cache.should_cache(metadata.len()) {
            cache.push(path, content.clone(), modified_time);
        }
        Ok(content)
    }

    pub fn handle(
        &self,
        request: &Request,
        cursor: Cursor<'_>,
        response: &mut Response,
    ) -> Result<(), Exception> {
        if request.method() != HttpRequestMethod::Get {
            response.set_status(Status::MethodNotAllowed);
            return Ok(());
        }

        let mut path = self.root.clone();
        for segment in cursor {
            if is_forbidden_segment(segment) {
                warn!("拒绝越出根目录的路径段：{:?}", segment);
                response.set_status(Status::Forbidden);
                return Ok(());
            }
            path.push(segment);
        }

        if path.is_dir() {
            if path.join(HTML_INDEX).is_file() {
                let url = display_path(request.path());
                let location = [url.trim_end_matches('/'), "/", HTML_INDEX].concat();
                debug!("目录{}存在首页，重定向到{}", path.display(), location);
                response
                    .set_status(Status::Found)
                    .set_header("Location", &location);
            }
        } else if path.is_file() {
            let content = self.read_file(&path)?;
            response.set_file(&path, &content);
        } else {
            debug!("文件不存在：{}", path.display());
        }
        Ok(())
    }
}
