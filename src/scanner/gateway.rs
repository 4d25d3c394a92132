use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::OllascanError;
use crate::models::CommandResult;

/// Administrative operations Ollama exposes on an unauthenticated API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayCommand {
    /// List installed models (`GET /api/tags`).
    List,
    /// Server version (`GET /api/version`).
    Version,
    /// Currently loaded models (`GET /api/ps`).
    Ps,
    /// Model details (`POST /api/show`).
    Show,
    /// Download a model (`POST /api/pull`).
    Pull,
    /// Delete a model (`DELETE /api/delete`).
    Rm,
    /// One non-streaming chat exchange (`POST /api/chat`).
    Chat,
}

impl GatewayCommand {
    /// Commands that act on a named model.
    fn requires_model(self) -> bool {
        matches!(self, Self::Show | Self::Pull | Self::Rm | Self::Chat)
    }
}

impl FromStr for GatewayCommand {
    type Err = OllascanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "version" => Ok(Self::Version),
            "ps" => Ok(Self::Ps),
            "show" => Ok(Self::Show),
            "pull" => Ok(Self::Pull),
            "rm" => Ok(Self::Rm),
            "chat" => Ok(Self::Chat),
            other => Err(OllascanError::Config(format!("Unknown command: {other}"))),
        }
    }
}

/// Issues post-discovery commands against a target already confirmed
/// reachable. All transport faults are folded into the returned
/// `CommandResult`; `execute` never fails outright.
pub struct CommandGateway {
    client: Client,
}

/// Model pulls and chat completions run far longer than probe requests.
const EXTENDED_TIMEOUT: Duration = Duration::from_secs(300);

impl CommandGateway {
    pub fn new(timeout_secs: u64) -> Result<Self, OllascanError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self { client })
    }

    pub async fn execute(
        &self,
        host: &str,
        port: u16,
        command: GatewayCommand,
        model: Option<&str>,
        prompt: Option<&str>,
    ) -> CommandResult {
        // Parameter validation happens before any network traffic.
        if command.requires_model() && model.is_none() {
            return CommandResult::err("invalid command or missing parameter");
        }
        if command == GatewayCommand::Chat && prompt.is_none() {
            return CommandResult::err("invalid command or missing parameter");
        }

        let base = format!("http://{host}:{port}");
        let name = model.unwrap_or_default();
        debug!(%base, ?command, "Executing gateway command");

        let outcome = match command {
            GatewayCommand::List => self.get_models(&format!("{base}/api/tags")).await,
            GatewayCommand::Ps => self.get_models(&format!("{base}/api/ps")).await,
            GatewayCommand::Version => self.get_json(&format!("{base}/api/version")).await,
            GatewayCommand::Show => {
                let request = self
                    .client
                    .post(format!("{base}/api/show"))
                    .json(&json!({"name": name}));
                self.send_json(request).await
            }
            GatewayCommand::Pull => {
                let request = self
                    .client
                    .post(format!("{base}/api/pull"))
                    .json(&json!({"name": name}))
                    .timeout(EXTENDED_TIMEOUT);
                self.send_expecting(request, json!("model pull request sent")).await
            }
            GatewayCommand::Rm => {
                let request = self
                    .client
                    .delete(format!("{base}/api/delete"))
                    .json(&json!({"name": name}));
                self.send_expecting(request, json!("model deleted")).await
            }
            GatewayCommand::Chat => self.chat(&base, name, prompt.unwrap_or_default()).await,
        };

        match outcome {
            Ok(result) => result,
            Err(e) => CommandResult::err(e.to_string()),
        }
    }

    async fn get_json(&self, url: &str) -> Result<CommandResult, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(status_error(&response));
        }
        Ok(CommandResult::ok(response.json::<Value>().await?))
    }

    /// GET an endpoint whose payload of interest is the `models` array.
    async fn get_models(&self, url: &str) -> Result<CommandResult, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Ok(status_error(&response));
        }
        let body = response.json::<Value>().await?;
        let models = body.get("models").cloned().unwrap_or_else(|| json!([]));
        Ok(CommandResult::ok(models))
    }

    /// Send a request whose response body is uninteresting; on success the
    /// caller-supplied acknowledgement becomes the payload.
    async fn send_expecting(
        &self,
        request: reqwest::RequestBuilder,
        acknowledgement: Value,
    ) -> Result<CommandResult, reqwest::Error> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Ok(status_error(&response));
        }
        Ok(CommandResult::ok(acknowledgement))
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<CommandResult, reqwest::Error> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Ok(status_error(&response));
        }
        Ok(CommandResult::ok(response.json::<Value>().await?))
    }

    /// One blocking request/response exchange; multi-turn history is the
    /// caller's responsibility to resend.
    async fn chat(
        &self,
        base: &str,
        model: &str,
        prompt: &str,
    ) -> Result<CommandResult, reqwest::Error> {
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{base}/api/chat"))
            .json(&body)
            .timeout(EXTENDED_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(status_error(&response));
        }

        let body = response.json::<Value>().await?;
        let reply = body
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(CommandResult::ok(json!(reply)))
    }
}

fn status_error(response: &reqwest::Response) -> CommandResult {
    CommandResult::err(format!("status {}", response.status().as_u16()))
}
