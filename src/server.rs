// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 连接引擎
//!
//! 每个连接只处理一个请求：读取 → 分派 → 响应 → 关闭，不支持长连接。
//!
//! - 接收循环与所有连接任务运行在固定数量工作线程的 Tokio 运行时上。
//! - 输入格式错误转为 `400`，响应体携带错误描述；处理器失败或 panic 转为 `500`，
//!   响应体为空，细节只写入日志。
//! - 读取整个请求受 `read_timeout` 限制，超时返回 `408`。
//! - 停机信号到来后停止接收新连接，等待所有正在处理的连接完成。

use std::{
    future::Future,
    net::{Ipv4Addr, SocketAddrV4},
    panic::{self, AssertUnwindSafe},
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use tokio::{
    io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpListener,
    runtime::Builder,
    task::JoinSet,
    time::timeout,
};

use crate::{
    config::{Config, Limits},
    folder::Folder,
    param::Status,
    request::Request,
    response::Response,
    router::{self, Location, VirtualFolder},
    table::Table,
    uri::display_path,
};

/// 丢弃剩余请求数据的最长时间
const LINGER_TIMEOUT: Duration = Duration::from_secs(1);

/// 按配置构建路由树。无法载入的数据表记录错误后跳过。
pub fn build_root(config: &Config) -> Location {
    let mut root = VirtualFolder::new();
    for folder in config.folders() {
        info!("挂载静态目录/{} -> {}", folder.name, folder.path);
        root.add_location(
            &folder.name,
            Folder::new(&folder.path, config.cache_size(), config.cache_threshold()),
        );
    }
    for table in config.tables() {
        match Table::from_file(&table.name, Path::new(&table.file)) {
            Ok(t) => {
                info!("挂载数据表/{} -> {}", table.name, table.file);
                root.add_terminal(&table.name, t);
            }
            Err(e) => error!("无法载入数据表{}：{}", table.name, e),
        }
    }
    root.into()
}

/// 构建运行时并阻塞运行服务器，直到 `shutdown` 完成。
pub fn run<F>(config: &Config, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let worker_threads = config.worker_threads();
    let runtime = Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;
    info!("运行时已启动，工作线程数：{}", worker_threads);

    let root = Arc::new(build_root(config));
    let limits = config.limits();
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    let socket = SocketAddrV4::new(address, config.port());

    runtime.block_on(async move {
        let listener = TcpListener::bind(socket).await?;
        info!("服务端在{}上监听Socket连接", socket);
        serve(listener, root, limits, shutdown).await
    })
}

/// 接收循环。`shutdown` 完成后不再接收新连接，并等待已接收的连接处理完毕。
pub async fn serve<F>(
    listener: TcpListener,
    root: Arc<Location>,
    limits: Limits,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut tasks = JoinSet::new();
    let mut id: u128 = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("接收到停机信号，停止接收新连接");
                break;
            }
            accepted = listener.accept() => {
                let (stream, addr) = match accepted {
                    Ok(a) => a,
                    Err(e) => {
                        error!("接受连接时遇到错误：{}", e);
                        continue;
                    }
                };
                debug!("[ID{}]TCP连接已建立：{}", id, addr);
                let root = Arc::clone(&root);
                tasks.spawn(async move {
                    handle_connection(stream, id, &root, &limits).await;
                });
                id += 1;
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    error!("连接任务异常结束：{}", e);
                }
            }
        }
    }

    drop(listener);
    info!("等待{}个连接处理完成", tasks.len());
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("连接任务异常结束：{}", e);
        }
    }
    info!("服务器已停止");
    Ok(())
}

/// 处理单个连接上的一个请求，然后关闭连接。
pub async fn handle_connection<S>(stream: S, id: u128, root: &Location, limits: &Limits)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let start_time = Instant::now();
    let mut reader = BufReader::new(stream);

    let (response, unread) = match timeout(limits.read_timeout, Request::read_from(&mut reader, limits, id)).await {
        Err(_) => {
            warn!("[ID{}]读取请求超时", id);
            (Response::with_status(Status::RequestTimeout), true)
        }
        Ok(Ok(None)) => {
            debug!("[ID{}]客户端未发送任何数据即关闭连接", id);
            return;
        }
        Ok(Ok(Some(request))) => (respond(&request, id, root), false),
        Ok(Err(e)) if e.is_malformed_input() => {
            warn!("[ID{}]请求格式错误：{}", id, e);
            (Response::bad_request(&e), true)
        }
        Ok(Err(e)) => {
            error!("[ID{}]读取请求时遇到错误：{}", id, e);
            return;
        }
    };
    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    let bytes = response.as_bytes();
    if let Err(e) = reader.get_mut().write_all(&bytes).await {
        error!("[ID{}]发送响应失败：{}", id, e);
        return;
    }
    if let Err(e) = reader.get_mut().shutdown().await {
        debug!("[ID{}]关闭连接时遇到错误：{}", id, e);
        return;
    }
    if unread {
        // 排空未读数据，连接以 FIN 而非 RST 结束
        let mut rest = (&mut reader).take(limits.max_body_size as u64);
        let _ = timeout(LINGER_TIMEOUT, io::copy(&mut rest, &mut io::sink())).await;
    }
}

/// 分派请求。处理器的失败和 panic 都在这里被拦截。
fn respond(request: &Request, id: u128, root: &Location) -> Response {
    let mut response = Response::new();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        router::dispatch(root, request, &mut response)
    }));
    let response = match result {
        Ok(Ok(())) => response,
        Ok(Err(e)) if e.is_malformed_input() => {
            warn!("[ID{}]请求体格式错误：{}", id, e);
            Response::bad_request(&e)
        }
        Ok(Err(e)) => {
            error!("[ID{}]处理请求时发生错误：{}", id, e);
            Response::with_status(Status::InternalError)
        }
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            error!("[ID{}]处理器panic：{}", id, detail);
            Response::with_status(Status::InternalError)
        }
    };
    info!(
        "[ID{}] {}, {}, {}, {}",
        id,
        request.version(),
        display_path(request.path()),
        request.method(),
        response.status(),
    );
    response
}
