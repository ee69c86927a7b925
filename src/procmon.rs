//! Client side of the procmon endpoint.
//!
//! [`refresh`] is the whole status refresh: one `GET /procmon`, format,
//! then write all five slots. It never logs and never retries; callers
//! own that policy.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::RefreshFailure;
use crate::status::{StatusFields, StatusLines};

pub const PROCMON_PATH: &str = "/procmon";

/// Body of `GET /procmon`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcmonReport {
    /// One percentage per core, in core order.
    pub cpu_usage: Vec<f64>,
    pub ram_usage: f64,
    /// Sent by the server but not shown on the bar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_usage: Option<f64>,
}

/// Resolve a configured base URL to the procmon endpoint.
///
/// `http://host:8080`, `http://host:8080/` and `http://host:8080/procmon`
/// all resolve to the same endpoint.
pub fn endpoint_url(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with(PROCMON_PATH) {
        base.to_string()
    } else {
        format!("{}{}", base, PROCMON_PATH)
    }
}

#[derive(Clone, Debug)]
pub struct ProcmonClient {
    http: Client,
    endpoint: String,
}

impl ProcmonClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint_url(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch(&self) -> Result<ProcmonReport, RefreshFailure> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(RefreshFailure::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshFailure::Status(status));
        }

        let body = response.bytes().await.map_err(RefreshFailure::Request)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Fetch one report and write it into `fields`.
///
/// The lines are fully formatted before the first slot is written, so on
/// any error every slot keeps its previous text.
pub async fn refresh(
    client: &ProcmonClient,
    fields: &StatusFields,
) -> Result<StatusLines, RefreshFailure> {
    let report = client.fetch().await?;
    let lines = StatusLines::from_report(&report)?;
    fields.apply(&lines);
    Ok(lines)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub(crate) async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub(crate) fn json_router(body: &'static str) -> Router {
        Router::new().route(
            PROCMON_PATH,
            get(move || async move {
                ([(axum::http::header::CONTENT_TYPE, "application/json")], body)
            }),
        )
    }

    fn client(base: &str) -> ProcmonClient {
        ProcmonClient::new(base, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_endpoint_url_variants() {
        assert_eq!(endpoint_url("http://host:8080"), "http://host:8080/procmon");
        assert_eq!(endpoint_url("http://host:8080/"), "http://host:8080/procmon");
        assert_eq!(
            endpoint_url("http://host:8080/procmon"),
            "http://host:8080/procmon"
        );
        assert_eq!(
            endpoint_url(" http://host/api/ "),
            "http://host/api/procmon"
        );
    }

    #[test]
    fn test_report_parses_server_payload() {
        let report: ProcmonReport = serde_json::from_str(
            r#"{"cpu_usage":[1.5,2.25,3,4],"ram_usage":40.0,"swap_usage":0.0}"#,
        )
        .unwrap();
        assert_eq!(report.cpu_usage, vec![1.5, 2.25, 3.0, 4.0]);
        assert_eq!(report.ram_usage, 40.0);
        assert_eq!(report.swap_usage, Some(0.0));
    }

    #[test]
    fn test_report_swap_optional() {
        let report: ProcmonReport =
            serde_json::from_str(r#"{"cpu_usage":[],"ram_usage":1}"#).unwrap();
        assert_eq!(report.swap_usage, None);
    }

    #[tokio::test]
    async fn test_refresh_writes_all_fields() {
        let base = serve(json_router(
            r#"{"cpu_usage":[12.345,50,0,99.999],"ram_usage":33.3,"swap_usage":0}"#,
        ))
        .await;
        let fields = StatusFields::with_placeholders();

        let lines = refresh(&client(&base), &fields).await.unwrap();

        assert_eq!(
            fields.texts(),
            vec![
                "CPU 0: 12.35%",
                "CPU 1: 50.00%",
                "CPU 2: 0.00%",
                "CPU 3: 100.00%",
                "RAM Usage: 33.30%",
            ]
        );
        assert_eq!(lines.ram, "RAM Usage: 33.30%");
    }

    #[tokio::test]
    async fn test_refresh_error_status_leaves_fields() {
        let router = Router::new().route(
            PROCMON_PATH,
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;
        let fields = StatusFields::with_placeholders();
        let before = fields.texts();

        let err = refresh(&client(&base), &fields).await.unwrap_err();

        assert!(matches!(
            err,
            RefreshFailure::Status(s) if s == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert_eq!(fields.texts(), before);
    }

    #[tokio::test]
    async fn test_refresh_short_cpu_list_leaves_fields() {
        let base = serve(json_router(r#"{"cpu_usage":[10,20],"ram_usage":5}"#)).await;
        let fields = StatusFields::with_placeholders();
        let before = fields.texts();

        let err = refresh(&client(&base), &fields).await.unwrap_err();

        assert!(matches!(err, RefreshFailure::MissingCpu { found: 2 }));
        assert_eq!(fields.texts(), before);
    }

    #[tokio::test]
    async fn test_refresh_bad_json_leaves_fields() {
        let base = serve(json_router(r#"{"cpu_usage":"lots"}"#)).await;
        let fields = StatusFields::with_placeholders();
        let before = fields.texts();

        let err = refresh(&client(&base), &fields).await.unwrap_err();

        assert!(matches!(err, RefreshFailure::Decode(_)));
        assert_eq!(fields.texts(), before);
    }

    #[tokio::test]
    async fn test_refresh_unreachable() {
        // Bind then drop to get a port nobody is listening on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fields = StatusFields::with_placeholders();
        let err = refresh(&client(&format!("http://{}", addr)), &fields)
            .await
            .unwrap_err();

        assert!(matches!(err, RefreshFailure::Request(_)));
        assert_eq!(fields.texts()[0], "CPU 0: --");
    }

    #[tokio::test]
    async fn test_refresh_keeps_last_good_values() {
        let good = serve(json_router(r#"{"cpu_usage":[1,2,3,4],"ram_usage":5}"#)).await;
        let bad = serve(json_router(r#"{"cpu_usage":[1],"ram_usage":5}"#)).await;
        let fields = StatusFields::with_placeholders();

        refresh(&client(&good), &fields).await.unwrap();
        let after_good = fields.texts();
        assert!(refresh(&client(&bad), &fields).await.is_err());

        assert_eq!(fields.texts(), after_good);
        assert_eq!(after_good[4], "RAM Usage: 5.00%");
    }
}
