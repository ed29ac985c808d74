//! GitHub REST publisher.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{error, info};

use super::{ReviewPublisher, SubmissionRef};
use crate::error::PublishError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("ta-assign/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct RequestReviewersBody<'a> {
    reviewers: [&'a str; 1],
}

#[derive(Debug, Serialize)]
struct CreateCommentBody<'a> {
    body: &'a str,
}

/// Publishes through the GitHub REST API with a personal or app token.
#[derive(Debug, Clone)]
pub struct GitHubPublisher {
    client: Client,
    api_url: String,
    token: String,
}

impl GitHubPublisher {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, PublishError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Reads the token from `GITHUB_TOKEN`.
    pub fn from_env(api_url: impl Into<String>) -> Result<Self, PublishError> {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(PublishError::MissingToken)?;
        Self::new(api_url, token)
    }

    fn requested_reviewers_url(&self, submission: &SubmissionRef) -> String {
        format!(
            "{}/repos/{}/pulls/{}/requested_reviewers",
            self.api_url, submission.repo, submission.number
        )
    }

    fn comments_url(&self, submission: &SubmissionRef) -> String {
        format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_url, submission.repo, submission.number
        )
    }

    fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<(), PublishError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(%url, status = status.as_u16(), "GitHub API error: {}", body);
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl ReviewPublisher for GitHubPublisher {
    fn attach_reviewer(
        &self,
        submission: &SubmissionRef,
        reviewer: &str,
    ) -> Result<(), PublishError> {
        let url = self.requested_reviewers_url(submission);
        self.post_json(&url, &RequestReviewersBody { reviewers: [reviewer] })?;
        info!(%submission, reviewer, "reviewer requested");
        Ok(())
    }

    fn notify(
        &self,
        submission: &SubmissionRef,
        _reviewer: &str,
        message: &str,
    ) -> Result<(), PublishError> {
        let url = self.comments_url(submission);
        self.post_json(&url, &CreateCommentBody { body: message })?;
        info!(%submission, "comment posted");
        Ok(())
    }
}
