//! JSON-over-HTTP backend
//!
//! Speaks the service's JSON 1.1 wire shape: every call is a `POST` to the
//! endpoint root with the action named in `X-Amz-Target`.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::ids::{StreamArn, StreamName};
use crate::traits::DeliveryStreamBackend;
use crate::types::{CreatedStream, StreamDescription, StreamStatus};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_HEADER: &str = "X-Amz-Target";
const TARGET_PREFIX: &str = "Firehose_20150804";

/// Service actions used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    CreateDeliveryStream,
    DeleteDeliveryStream,
    DescribeDeliveryStream,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::CreateDeliveryStream => "CreateDeliveryStream",
            Action::DeleteDeliveryStream => "DeleteDeliveryStream",
            Action::DescribeDeliveryStream => "DescribeDeliveryStream",
        }
    }

    fn target(self) -> String {
        format!("{TARGET_PREFIX}.{}", self.as_str())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateResponse {
    #[serde(rename = "DeliveryStreamARN")]
    delivery_stream_arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeResponse {
    delivery_stream_description: DescriptionBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescriptionBody {
    delivery_stream_name: String,
    #[serde(rename = "DeliveryStreamARN", default)]
    delivery_stream_arn: Option<String>,
    delivery_stream_status: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

/// Backend that calls the delivery-stream service over HTTP.
pub struct HttpBackend {
    config: BackendConfig,
    display_name: String,
    client: Client,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("config", &self.config.redacted())
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl HttpBackend {
    /// Create a new HTTP backend with the given configuration.
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        config.validate()?;

        let display_name = format!("HTTP: {}", config.endpoint);
        let client = Self::build_client(&config)?;

        Ok(Self {
            config,
            display_name,
            client,
        })
    }

    fn build_client(config: &BackendConfig) -> BackendResult<Client> {
        Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| BackendError::InvalidConfiguration {
                message: format!("Failed to build HTTP client: {e}"),
            })
    }

    /// Send one action and return the decoded success body.
    ///
    /// Non-2xx responses are mapped to typed errors. There is no retry here:
    /// retry policy belongs to the reconciliation chain.
    async fn call(&self, action: Action, name: &StreamName, body: &Value) -> BackendResult<Value> {
        let mut request = self
            .client
            .post(self.config.endpoint.trim_end_matches('/').to_string() + "/")
            .header(header::CONTENT_TYPE, CONTENT_TYPE)
            .header(TARGET_HEADER, action.target())
            .json(body);

        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        debug!(action = action.as_str(), stream = %name, "Sending backend request");

        let response = request.send().await.map_err(|e| {
            BackendError::network_with_source(format!("{} request failed", action.as_str()), e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            BackendError::network_with_source(format!("{} response unreadable", action.as_str()), e)
        })?;

        if !status.is_success() {
            let err = Self::handle_response_error(status, &text, name);
            warn!(
                action = action.as_str(),
                stream = %name,
                status = status.as_u16(),
                error_code = err.error_code(),
                "Backend request failed"
            );
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        serde_json::from_str(&text).map_err(|e| {
            BackendError::serialization(format!("invalid {} response: {e}", action.as_str()))
        })
    }

    /// Map an error response to a typed error.
    fn handle_response_error(status: StatusCode, body: &str, name: &StreamName) -> BackendError {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let (error_type, message) = match parsed {
            Some(ErrorBody {
                error_type,
                message,
            }) => (error_type, message.unwrap_or_else(|| body.to_string())),
            None => (None, body.to_string()),
        };

        match error_type {
            Some(raw) => {
                // "com.amazonaws.firehose#ResourceNotFoundException" -> "ResourceNotFoundException"
                let short = raw.rsplit('#').next().unwrap_or(raw.as_str());
                BackendError::from_service_type(short, message, name.as_str(), status.as_u16())
            }
            None if status == StatusCode::NOT_FOUND => BackendError::not_found(name.as_str()),
            None if status == StatusCode::SERVICE_UNAVAILABLE => {
                BackendError::ServiceUnavailable { message }
            }
            None if status.is_server_error() => BackendError::Service {
                status: status.as_u16(),
                message,
            },
            None => BackendError::Unrecognized {
                error_type: format!("HTTP {}", status.as_u16()),
                message,
            },
        }
    }
}

#[async_trait]
impl DeliveryStreamBackend for HttpBackend {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    #[instrument(skip(self, configuration), fields(stream = %name))]
    async fn create_stream(
        &self,
        name: &StreamName,
        configuration: &Value,
    ) -> BackendResult<CreatedStream> {
        let mut body = match configuration {
            Value::Object(map) => map.clone(),
            Value::Null => serde_json::Map::new(),
            _ => {
                return Err(BackendError::invalid_argument(
                    "stream configuration must be a JSON object",
                ))
            }
        };
        body.insert(
            "DeliveryStreamName".to_string(),
            Value::String(name.as_str().to_string()),
        );

        let response = self
            .call(Action::CreateDeliveryStream, name, &Value::Object(body))
            .await?;

        let created: CreateResponse = serde_json::from_value(response).map_err(|e| {
            BackendError::serialization(format!("create response missing ARN: {e}"))
        })?;

        info!(stream = %name, arn = %created.delivery_stream_arn, "Delivery stream create submitted");

        Ok(CreatedStream {
            arn: StreamArn::new(created.delivery_stream_arn),
        })
    }

    #[instrument(skip(self), fields(stream = %name))]
    async fn delete_stream(&self, name: &StreamName, force_delete: bool) -> BackendResult<()> {
        let body = json!({
            "DeliveryStreamName": name.as_str(),
            "AllowForceDelete": force_delete,
        });

        self.call(Action::DeleteDeliveryStream, name, &body).await?;

        info!(stream = %name, force_delete, "Delivery stream delete submitted");

        Ok(())
    }

    #[instrument(skip(self), fields(stream = %name))]
    async fn describe_stream(&self, name: &StreamName) -> BackendResult<StreamDescription> {
        let body = json!({ "DeliveryStreamName": name.as_str() });

        let response = self
            .call(Action::DescribeDeliveryStream, name, &body)
            .await?;

        let described: DescribeResponse = serde_json::from_value(response).map_err(|e| {
            BackendError::serialization(format!("invalid describe response: {e}"))
        })?;
        let body = described.delivery_stream_description;

        let reported_name = StreamName::parse(body.delivery_stream_name).map_err(|e| {
            BackendError::serialization(format!("describe returned an invalid stream name: {e}"))
        })?;

        let mut description =
            StreamDescription::new(reported_name, StreamStatus::new(body.delivery_stream_status));
        if let Some(arn) = body.delivery_stream_arn {
            description = description.with_arn(StreamArn::new(arn));
        }

        debug!(stream = %name, status = %description.status, "Described delivery stream");

        Ok(description)
    }
}
