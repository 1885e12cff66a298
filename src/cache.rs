use std::{
    fs,
    io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::SystemTime,
};

use bytes::Bytes;
use log::debug;
use lru::LruCache;

#[derive(Clone)]
struct CacheEntry {
    content: Bytes,
    modified_time: SystemTime,
}

/// 静态文件内容的 LRU 缓存，以修改时间判断条目是否仍然有效
pub struct FileCache {
    cache: LruCache<PathBuf, CacheEntry>,
    threshold: u64,
}

impl FileCache {
    /// 容量为 0 时按 1 处理
    pub fn new(capacity: usize, threshold: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            threshold,
        }
    }

    pub fn push(&mut self, path: &Path, content: Bytes, modified_time: SystemTime) {
        let entry = CacheEntry {
            content,
            modified_time,
        };
        self.cache.put(path.to_path_buf(), entry);
    }

    // 只有修改时间一致的条目才算命中
    pub fn find(&mut self, path: &Path, modified_time: SystemTime) -> Option<Bytes> {
        self.cache
            .get(path)
            .filter(|entry| entry.modified_time == modified_time)
            .map(|entry| entry.content.clone())
    }

    pub fn should_cache(&self, file_size: u64) -> bool {
        file_size <= self.threshold
    }

    /// 读取文件内容，优先使用缓存。超过阈值的文件直接读取，不进入缓存。
    pub fn load(&mut self, path: &Path) -> io::Result<Bytes> {
        let metadata = fs::metadata(path)?;
        let modified_time = metadata.modified()?;
        if let Some(content) = self.find(path, modified_time) {
            debug!("缓存命中：{}", path.display());
            return Ok(content);
        }
        let content = Bytes::from(fs::read(path)?);
        if self.should_cache(metadata.len()) {
            self.push(path, content.clone(), modified_time);
        } else {
            debug!("文件过大({} bytes)，跳过缓存：{}", metadata.len(), path.display());
        }
        Ok(content)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cache_creation() {
        let cache = FileCache::new(10, 1024);
        assert_eq!(cache.capacity(), 10);
        assert!(cache.is_empty());
        assert_eq!(FileCache::new(0, 1024).capacity(), 1);
    }

    #[test]
    fn test_cache_modified_time_invalidation() {
        let mut cache = FileCache::new(3, 1024);
        let time1 = SystemTime::now();
        let time2 = time1 + Duration::from_secs(10);
        let path = Path::new("file1.txt");

        cache.push(path, Bytes::from("test content"), time1);
        assert!(cache.find(path, time2).is_none());
        assert_eq!(cache.find(path, time1), Some(Bytes::from("test content")));
    }

    #[test]
    fn test_cache_lru_eviction() {
        let mut cache = FileCache::new(2, 1024);
        let time = SystemTime::now();

        cache.push(Path::new("file1.txt"), Bytes::from("content1"), time);
        cache.push(Path::new("file2.txt"), Bytes::from("content2"), time);
        cache.find(Path::new("file1.txt"), time);
        cache.push(Path::new("file3.txt"), Bytes::from("content3"), time);

        assert_eq!(cache.len(), 2);
        assert!(cache.find(Path::new("file2.txt"), time).is_none());
        assert!(cache.find(Path::new("file1.txt"), time).is_some());
        assert!(cache.find(Path::new("file3.txt"), time).is_some());
    }

    #[test]
    fn test_load_reads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello").unwrap();

        let mut cache = FileCache::new(4, 1024);
        assert_eq!(cache.load(&path).unwrap(), Bytes::from("hello"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.load(&path).unwrap(), Bytes::from("hello"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_load_skips_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, vec![b'x'; 64]).unwrap();

        let mut cache = FileCache::new(4, 16);
        assert_eq!(cache.load(&path).unwrap().len(), 64);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let mut cache = FileCache::new(4, 16);
        let e = cache.load(Path::new("/nonexistent/file")).unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::NotFound);
    }
}
