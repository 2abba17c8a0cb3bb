//! This module provides a client to connect to the task board HTTP API

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::category::{Category, CategoryId};
use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::session::AuthToken;
use crate::task::{Task, TaskDraft, TaskId, calendar_day};
use crate::traits::{Authenticator, TaskServer};


#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct NewCategory<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTask<'a> {
    #[serde(flatten)]
    draft: &'a TaskDraft,
    is_completed: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Completion {
    is_completed: bool,
}

#[derive(Deserialize)]
struct EmailCheck {
    exists: bool,
}

#[derive(Deserialize)]
struct LoginReply {
    token: AuthToken,
}

#[derive(Deserialize)]
struct ErrorReply {
    message: Option<String>,
}


/// A data source that fetches its data from the task board server
#[derive(Debug)]
pub struct Client {
    resource: Resource,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(url: S) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;

        Ok(Self {
            resource: Resource::new(url, None),
            http: reqwest::Client::new(),
        })
    }

    /// Create a client for the URL set in [`crate::config::API_URL`]
    pub fn from_config() -> Result<Self> {
        Self::new(crate::config::api_url())
    }

    pub fn url(&self) -> &Url {
        self.resource.url()
    }

    fn resource(&self, path: &str, token: Option<&AuthToken>) -> Resource {
        match token {
            Some(token) => self.resource.authenticated(token).combine(path),
            None => self.resource.combine(path),
        }
    }

    /// Send a request, and return the body of a successful reply
    async fn request<B: Serialize>(&self, method: Method, resource: &Resource, body: Option<&B>) -> Result<String> {
        log::debug!("{} {}", method, resource.url().path());

        let mut request = self.http.request(method.clone(), resource.url().clone());
        if let Some(token) = resource.token() {
            request = request.bearer_auth(token.as_str());
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_string(body)?);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(err) => {
                log::error!("Unable to reach {}: {}", resource.url(), err);
                return Err(err.into());
            }
        };

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() == false {
            let message = serde_json::from_str::<ErrorReply>(&text)
                .ok()
                .and_then(|reply| reply.message);
            log::warn!("{} {} was rejected with HTTP status {}: {}", method, resource.url().path(), status, text);
            return Err(Error::server(status.as_u16(), message));
        }

        Ok(text)
    }

    async fn request_json<B, R>(&self, method: Method, resource: &Resource, body: Option<&B>) -> Result<R>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let text = self.request(method, resource, body).await?;
        let parsed = serde_json::from_str(&text).map_err(|err| {
            log::error!("Unexpected reply from {}: {} ({})", resource.url().path(), text, err);
            err
        })?;
        Ok(parsed)
    }
}

const NO_BODY: Option<&()> = None;

#[async_trait]
impl Authenticator for Client {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let resource = add_path_segment(self.resource("/api/user/check/", None), email);
        let check: EmailCheck = self.request_json(Method::GET, &resource, NO_BODY).await?;
        Ok(check.exists)
    }

    async fn signup(&self, email: &str, password: &str) -> Result<()> {
        let resource = self.resource("/api/user/signup", None);
        self.request(Method::POST, &resource, Some(&Credentials { email, password })).await?;
        log::info!("Account created for {}", email);
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthToken> {
        let resource = self.resource("/api/user/login", None);
        let reply: LoginReply = self.request_json(Method::POST, &resource, Some(&Credentials { email, password })).await?;
        log::info!("Logged in as {}", email);
        Ok(reply.token)
    }
}

#[async_trait]
impl TaskServer for Client {
    async fn get_categories(&self, token: &AuthToken) -> Result<Vec<Category>> {
        let resource = self.resource("/api/categories", Some(token));
        self.request_json(Method::GET, &resource, NO_BODY).await
    }

    async fn add_category(&self, token: &AuthToken, name: &str) -> Result<Category> {
        let resource = self.resource("/api/categories", Some(token));
        self.request_json(Method::POST, &resource, Some(&NewCategory { name })).await
    }

    async fn delete_category(&self, token: &AuthToken, id: &CategoryId) -> Result<()> {
        let resource = add_path_segment(self.resource("/api/categories/", Some(token)), id.as_str());
        self.request(Method::DELETE, &resource, NO_BODY).await?;
        Ok(())
    }

    async fn get_tasks(&self, token: &AuthToken, date: NaiveDate) -> Result<Vec<Task>> {
        let day = date.format(calendar_day::FORMAT).to_string();
        let resource = add_path_segment(self.resource("/api/card/", Some(token)), &day);
        self.request_json(Method::GET, &resource, NO_BODY).await
    }

    async fn create_task(&self, token: &AuthToken, draft: &TaskDraft) -> Result<Task> {
        let resource = self.resource("/api/card", Some(token));
        let body = NewTask { draft, is_completed: false };
        self.request_json(Method::POST, &resource, Some(&body)).await
    }

    async fn update_task(&self, token: &AuthToken, id: &TaskId, draft: &TaskDraft) -> Result<Task> {
        let resource = add_path_segment(self.resource("/api/card/", Some(token)), id.as_str());
        self.request_json(Method::PUT, &resource, Some(draft)).await
    }

    async fn delete_task(&self, token: &AuthToken, id: &TaskId) -> Result<()> {
        let resource = add_path_segment(self.resource("/api/card/", Some(token)), id.as_str());
        self.request(Method::DELETE, &resource, NO_BODY).await?;
        Ok(())
    }

    async fn set_completion(&self, token: &AuthToken, id: &TaskId, completed: bool) -> Result<Task> {
        let path = format!("/api/card/{}/complete", percent_encode_segment(id.as_str()));
        let resource = self.resource(&path, Some(token));
        self.request_json(Method::PATCH, &resource, Some(&Completion { is_completed: completed })).await
    }
}

/// Append a user-provided value as a single, escaped, path segment
fn add_path_segment(resource: Resource, segment: &str) -> Resource {
    let path = format!("{}{}", resource.url().path(), percent_encode_segment(segment));
    resource.combine(&path)
}

fn percent_encode_segment(segment: &str) -> String {
    let mut url = match Url::parse("http://segment.invalid/") {
        Ok(u) => u,
        Err(_) => return segment.to_string(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}
