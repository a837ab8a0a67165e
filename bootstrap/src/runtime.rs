//! 进程级初始化与退出

use portal_config::AppConfig;
use portal_telemetry::{LogFormat, init_tracing};
use tracing::{error, info};

/// 按配置安装日志
pub fn init_runtime(config: &AppConfig) {
    let json = config
        .telemetry
        .json_logs
        .unwrap_or_else(|| config.is_production());
    let format = if json { LogFormat::Json } else { LogFormat::Pretty };
    init_tracing(&config.telemetry.log_level, format);

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        log_format = ?format,
        "Runtime initialized"
    );
}

/// Ctrl+C 或 SIGTERM 到达时返回
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!("Interrupted, draining connections"),
        () = terminate => info!("Terminated, draining connections"),
    }
}
