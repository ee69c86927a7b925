//! `procbar serve`: the procmon endpoint itself.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::procmon::{ProcmonReport, PROCMON_PATH};
use crate::system_stats::SystemSampler;

pub fn router(sampler: Arc<SystemSampler>, local_only: bool) -> Router {
    let app = Router::new()
        .route(PROCMON_PATH, get(procmon_handler))
        .route("/health", get(health_handler))
        .with_state(sampler);

    if local_only {
        app.layer(middleware::from_fn(restrict_to_local_clients))
    } else {
        app
    }
}

pub async fn run_server(config: &ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::new(config.bind, config.port);
    let listener = TcpListener::bind(addr).await?;
    info!(
        "procmon server listening on {} (local_only={})",
        listener.local_addr()?,
        config.local_only
    );

    let app = router(Arc::new(SystemSampler::new()), config.local_only);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutting down procmon server");
    })
    .await?;

    Ok(())
}

async fn procmon_handler(State(sampler): State<Arc<SystemSampler>>) -> Json<ProcmonReport> {
    Json(sampler.sample().await)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn restrict_to_local_clients(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    if is_local_ip(addr.ip()) {
        next.run(req).await
    } else {
        debug!("rejecting non-local client {}", addr);
        (StatusCode::FORBIDDEN, "Access restricted to local network").into_response()
    }
}

/// Loopback and RFC 1918 private ranges. IPv6 only counts loopback and
/// IPv4-mapped local addresses.
pub fn is_local_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            a == 10
                || (a == 192 && b == 168)
                || (a == 172 && (16..=31).contains(&b))
                || v4.is_loopback()
        }
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_local_ip(IpAddr::V4(v4)),
            None => v6.is_loopback(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procmon::{endpoint_url, ProcmonClient};
    use std::time::Duration;

    async fn spawn(local_only: bool) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(Arc::new(SystemSampler::new()), local_only);
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_is_local_ip() {
        let local = [
            "127.0.0.1",
            "10.1.2.3",
            "192.168.0.10",
            "172.16.0.1",
            "172.31.255.255",
            "::1",
            "::ffff:192.168.1.1",
        ];
        for ip in local {
            assert!(is_local_ip(ip.parse().unwrap()), "{} should be local", ip);
        }

        let remote = ["8.8.8.8", "172.32.0.1", "172.15.0.1", "192.169.0.1", "2001:db8::1"];
        for ip in remote {
            assert!(!is_local_ip(ip.parse().unwrap()), "{} should be remote", ip);
        }
    }

    #[tokio::test]
    async fn test_procmon_endpoint_serves_report() {
        let base = spawn(true).await;

        let response = reqwest::get(endpoint_url(&base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["cpu_usage"].is_array());
        assert!(body["ram_usage"].is_number());
        assert!(body["swap_usage"].is_number());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let base = spawn(false).await;
        let body = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_client_reads_own_server() {
        let base = spawn(true).await;
        let client = ProcmonClient::new(&base, Duration::from_secs(2)).unwrap();

        let report = client.fetch().await.unwrap();
        assert!(!report.cpu_usage.is_empty());
        assert!(report.swap_usage.is_some());
    }
}
