/// 求解器 API 客户端
///
/// 封装与求解器后端（OR / 量子）的 HTTP 交互
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{City, DemandMap};
use futures::future::BoxFuture;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// 求解请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverRequest {
    pub depots: u32,
    pub capacity: u32,
    pub fleet: u32,
    pub cities: Vec<City>,
    pub demands: DemandMap,
}

/// 未解析的后端响应
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP 状态码是否为 2xx
    pub status_ok: bool,
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_ok: true,
            status: 200,
            body: body.into(),
        }
    }
}

/// 求解器后端
///
/// 返回装箱的 future，便于以 trait object 注入
pub trait SolverBackend: Send + Sync {
    fn post<'a>(&'a self, endpoint: &'a str, request: &'a SolverRequest) -> BoxFuture<'a, AppResult<RawResponse>>;
}

impl<T: SolverBackend + ?Sized> SolverBackend for std::sync::Arc<T> {
    fn post<'a>(&'a self, endpoint: &'a str, request: &'a SolverRequest) -> BoxFuture<'a, AppResult<RawResponse>> {
        (**self).post(endpoint, request)
    }
}

/// 后端响应，所有字段都可缺失
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SolverResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_summary")]
    pub summary: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_paths")]
    pub paths: Vec<String>,
    #[serde(default, rename = "solverStdout")]
    pub solver_stdout: Option<String>,
    #[serde(default, rename = "solverStderr")]
    pub solver_stderr: Option<String>,
}

impl SolverResponse {
    /// 非空的后端消息
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn lenient_summary<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), value_to_text(v))).collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_paths<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().map(value_to_text).collect(),
        _ => Vec::new(),
    })
}

/// 解析响应体；不是 JSON 时把原文同时当作 message 和 solverStdout
pub fn decode_response(raw: &RawResponse) -> SolverResponse {
    match serde_json::from_str::<SolverResponse>(&raw.body) {
        Ok(response) => response,
        Err(e) => {
            debug!("响应不是 JSON ({}), 按纯文本处理", e);
            SolverResponse {
                ok: raw.status_ok,
                message: Some(raw.body.clone()),
                solver_stdout: Some(raw.body.clone()),
                ..Default::default()
            }
        }
    }
}

/// 基于 reqwest 的求解器客户端
pub struct SolverClient {
    base_url: String,
    client: reqwest::Client,
}

impl SolverClient {
    /// 创建新的求解器客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Api(ApiError::ClientBuildFailed { source: Box::new(e) }))?;

        Ok(Self {
            base_url: config.solver_api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn send(&self, endpoint: &str, request: &SolverRequest) -> AppResult<RawResponse> {
        let url = self.url(endpoint);
        debug!("POST {} ({} 个城市)", url, request.cities.len());

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::Api(ApiError::BodyReadFailed {
                endpoint: url.clone(),
                source: Box::new(e),
            })
        })?;

        debug!("POST {} -> {} ({} 字节)", url, status, body.len());

        Ok(RawResponse {
            status_ok: status.is_success(),
            status: status.as_u16(),
            body,
        })
    }
}

impl SolverBackend for SolverClient {
    fn post<'a>(&'a self, endpoint: &'a str, request: &'a SolverRequest) -> BoxFuture<'a, AppResult<RawResponse>> {
        Box::pin(self.send(endpoint, request))
    }
}
