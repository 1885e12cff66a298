// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # rested 服务器入口
//!
//! 初始化日志、载入配置，然后在固定数量工作线程的运行时上启动连接引擎，
//! 直到收到 Ctrl-C。

use log::{error, info, warn, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};

use rested::{server, Config};

const LOG_CONFIG: &str = "config/log4rs.yaml";
const SERVER_CONFIG: &str = "config/development.toml";

/// 优先使用 YAML 日志配置，失败时退回到 info 级别的控制台输出。
fn init_logging() {
    let yaml_error = match log4rs::init_file(LOG_CONFIG, Default::default()) {
        Ok(()) => return,
        Err(e) => e,
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();
    let built = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    match built {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("无法初始化日志系统：{}", e);
                return;
            }
            warn!("无法载入{}：{}，使用控制台日志", LOG_CONFIG, yaml_error);
        }
        Err(e) => eprintln!("无法构建日志配置：{}", e),
    }
}

fn main() {
    init_logging();

    let config = Config::from_toml(SERVER_CONFIG);
    info!("配置文件已载入");

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("收到Ctrl-C，开始停机"),
            Err(e) => {
                // 无法监听信号时服务器只能由外部终止
                error!("无法监听停机信号：{}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    if let Err(e) = server::run(&config, shutdown) {
        error!("服务器异常退出：{}", e);
        std::process::exit(1);
    }
}
