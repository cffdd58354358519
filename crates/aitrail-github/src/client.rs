use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::comment::CommentApi;
use crate::context::PullRequestContext;
use crate::error::GithubError;
use crate::review::ReviewApi;

const TIMEOUT: Duration = Duration::from_secs(30);
const PER_PAGE: u32 = 100;
const USER_AGENT: &str = concat!("aitrail/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Review {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// A single-line comment attached to a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewComment {
    pub path: String,
    pub line: u32,
    pub body: String,
}

/// REST client bound to one pull request.
pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
    owner: String,
    repo: String,
    number: u64,
}

impl GithubClient {
    pub fn new(ctx: &PullRequestContext, token: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .build()
            .new_agent();
        Self {
            agent,
            api_url: ctx.api_url.clone(),
            token: token.to_string(),
            owner: ctx.owner.clone(),
            repo: ctx.repo.clone(),
            number: ctx.number,
        }
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{}/{tail}", self.api_url, self.owner, self.repo)
    }

    fn authorized<B>(&self, req: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        req.header("Authorization", &format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", USER_AGENT)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GithubError> {
        let mut resp = self.authorized(self.agent.get(url)).call()?;
        let text = resp.body_mut().read_to_string()?;
        Ok(serde_json::from_str(&text)?)
    }

    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<(), GithubError> {
        self.authorized(self.agent.post(url))
            .header("Content-Type", "application/json")
            .send(body.to_string())?;
        Ok(())
    }

    fn patch_json(&self, url: &str, body: &serde_json::Value) -> Result<(), GithubError> {
        self.authorized(self.agent.patch(url))
            .header("Content-Type", "application/json")
            .send(body.to_string())?;
        Ok(())
    }
}

impl CommentApi for GithubClient {
    fn list_comments(&self) -> Result<Vec<IssueComment>, GithubError> {
        let url = self.repo_url(&format!(
            "issues/{}/comments?per_page={PER_PAGE}",
            self.number
        ));
        self.get_json(&url)
    }

    fn create_comment(&self, body: &str) -> Result<(), GithubError> {
        let url = self.repo_url(&format!("issues/{}/comments", self.number));
        self.post_json(&url, &serde_json::json!({ "body": body }))
    }

    fn update_comment(&self, id: u64, body: &str) -> Result<(), GithubError> {
        let url = self.repo_url(&format!("issues/comments/{id}"));
        self.patch_json(&url, &serde_json::json!({ "body": body }))
    }
}

impl ReviewApi for GithubClient {
    fn list_reviews(&self) -> Result<Vec<Review>, GithubError> {
        let url = self.repo_url(&format!(
            "pulls/{}/reviews?per_page={PER_PAGE}",
            self.number
        ));
        self.get_json(&url)
    }

    fn create_review(
        &self,
        commit_id: &str,
        body: &str,
        comments: &[ReviewComment],
    ) -> Result<(), GithubError> {
        let url = self.repo_url(&format!("pulls/{}/reviews", self.number));
        self.post_json(&url, &review_request(commit_id, body, comments))
    }
}

fn review_request(commit_id: &str, body: &str, comments: &[ReviewComment]) -> serde_json::Value {
    serde_json::json!({
        "commit_id": commit_id,
        "body": body,
        "event": "COMMENT",
        "comments": comments,
    })
}
