use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};

use gitbeaker::config::Config;
use gitbeaker::{
    BaseService, DryRunHandler, HandlerRequester, Method, ProfileMode, RequestParams,
    ServiceOptions, Sudo, Token,
};

use crate::output;

const REDACTED: &str = "***";
const SECRET_HEADERS: [&str; 6] = [
    "authorization",
    "job-token",
    "private-token",
    "x-csrf-token",
    "cookie",
    "x-profile-token",
];

#[derive(Parser)]
#[command(name = "gitbeaker")]
#[command(author, version, about = "GitLab API request inspector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./gitbeaker.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved service context
    Context {
        #[command(flatten)]
        service: ServiceArgs,

        /// Print credentials instead of masking them
        #[arg(long, default_value_t = false)]
        show_secrets: bool,
    },
    /// Prepare a request without sending it
    Request {
        /// get, post, put, delete or stream
        method: Method,

        /// Endpoint relative to the service url (e.g. "projects/1/issues")
        endpoint: String,

        #[command(flatten)]
        service: ServiceArgs,

        /// Query parameter as key=value, repeatable
        #[arg(short, long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Per-request sudo
        #[arg(long)]
        as_user: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileModeArg {
    Execution,
    Memory,
}

impl From<ProfileModeArg> for ProfileMode {
    fn from(value: ProfileModeArg) -> Self {
        match value {
            ProfileModeArg::Execution => ProfileMode::Execution,
            ProfileModeArg::Memory => ProfileMode::Memory,
        }
    }
}

/// Command line overrides for configuration file values.
#[derive(Args)]
struct ServiceArgs {
    #[arg(long, env = "GITLAB_HOST")]
    host: Option<String>,

    #[arg(short, long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "GITLAB_OAUTH_TOKEN", hide_env_values = true)]
    oauth_token: Option<String>,

    #[arg(long, env = "CI_JOB_TOKEN", hide_env_values = true)]
    job_token: Option<String>,

    /// Path appended to the API base url
    #[arg(short, long)]
    url: Option<String>,

    #[arg(long)]
    api_version: Option<u32>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// User id or username to impersonate
    #[arg(long)]
    sudo: Option<String>,

    #[arg(long)]
    profile_token: Option<String>,

    #[arg(long, value_enum)]
    profile_mode: Option<ProfileModeArg>,

    #[arg(long, default_value_t = false)]
    camelize: bool,

    /// Accept invalid TLS certificates
    #[arg(long, default_value_t = false)]
    insecure: bool,
}

impl ServiceArgs {
    fn apply(&self, mut options: ServiceOptions) -> ServiceOptions {
        if let Some(host) = &self.host {
            options.host = host.clone();
        }
        if let Some(token) = &self.token {
            options.token = Some(Token::from(token.as_str()));
        }
        if let Some(token) = &self.oauth_token {
            options.oauth_token = Some(Token::from(token.as_str()));
        }
        if let Some(token) = &self.job_token {
            options.job_token = Some(Token::from(token.as_str()));
        }
        if let Some(url) = &self.url {
            options.url = url.clone();
        }
        if let Some(version) = self.api_version {
            options.version = version;
        }
        if let Some(timeout) = self.timeout {
            options.request_timeout = timeout;
        }
        if let Some(sudo) = &self.sudo {
            options.sudo = Some(parse_sudo(sudo));
        }
        if let Some(token) = &self.profile_token {
            options.profile_token = Some(token.clone());
        }
        if let Some(mode) = self.profile_mode {
            options.profile_mode = mode.into();
        }
        if self.camelize {
            options.camelize = true;
        }
        if self.insecure {
            options.reject_unauthorized = false;
        }
        options
    }
}

#[derive(Serialize)]
struct ContextReport<'a> {
    auth_mode: &'a str,
    #[serde(flatten)]
    service: Value,
}

impl Cli {
    fn build_service(&self, args: &ServiceArgs) -> Result<BaseService> {
        let config = Config::load(self.config.as_deref())?;
        let options = args
            .apply(config.gitlab)
            .with_requester(Arc::new(HandlerRequester::new(DryRunHandler)));

        let service = BaseService::new(options)?;
        output::print_service_summary(&service);
        Ok(service)
    }

    fn emit(&self, value: &impl Serialize) -> Result<()> {
        let json_output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Output written to: {}", output_path.display());
        } else {
            println!("{json_output}");
        }

        Ok(())
    }

    fn execute_context(&self, args: &ServiceArgs, show_secrets: bool) -> Result<()> {
        let service = self.build_service(args)?;

        let mut value = serde_json::to_value(&service)?;
        if !show_secrets {
            redact(&mut value);
        }

        self.emit(&ContextReport {
            auth_mode: service.auth_mode().kind(),
            service: value,
        })
    }

    async fn execute_request(
        &self,
        method: Method,
        endpoint: &str,
        args: &ServiceArgs,
        query: &[String],
        body: Option<&str>,
        as_user: Option<&str>,
    ) -> Result<()> {
        let service = self.build_service(args)?;

        let mut params = RequestParams::default();
        if !query.is_empty() {
            params = params.with_query(parse_query(query)?);
        }
        if let Some(body) = body {
            let body: Value = serde_json::from_str(body).context("Request body is not valid JSON")?;
            params = params.with_body(body);
        }
        if let Some(user) = as_user {
            params = params.with_sudo(parse_sudo(user));
        }

        let response = service
            .requester()
            .request(&service, method, endpoint, params)
            .await?;

        self.emit(&service.process_response_body(response.body))
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Context {
                service,
                show_secrets,
            } => self.execute_context(service, *show_secrets),
            Commands::Request {
                method,
                endpoint,
                service,
                query,
                body,
                as_user,
            } => {
                self.execute_request(
                    *method,
                    endpoint,
                    service,
                    query,
                    body.as_deref(),
                    as_user.as_deref(),
                )
                .await
            }
        }
    }
}

fn parse_sudo(value: &str) -> Sudo {
    value
        .parse::<u64>()
        .map_or_else(|_| Sudo::from(value), Sudo::Id)
}

/// Turns `key=value` pairs into a query object; repeated keys become arrays.
fn parse_query(pairs: &[String]) -> Result<Value> {
    let mut query = Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Query parameter '{pair}' is not in KEY=VALUE form"))?;
        let value = Value::String(value.to_string());

        match query.get_mut(key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                query.insert(key.to_string(), value);
            }
        }
    }
    Ok(Value::Object(query))
}

fn redact(service: &mut Value) {
    if let Some(Value::Object(headers)) = service.get_mut("headers") {
        for (name, value) in headers.iter_mut() {
            if SECRET_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                *value = Value::String(REDACTED.to_string());
            }
        }
    }
    if let Some(Value::Object(body)) = service.get_mut("additional_body") {
        for value in body.values_mut() {
            *value = Value::String(REDACTED.to_string());
        }
    }
}
