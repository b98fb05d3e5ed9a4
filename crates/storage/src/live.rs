//! Remote adapters backed by a PostgREST endpoint (Supabase REST API).
//!
//! Tables: `minigame_questions`, `minigame_sessions`, `user_profiles`.
//! Column names follow the JSON wire shape of the core records.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use trivia_core::model::{
    Category, Difficulty, ProfileUpdate, Question, QuestionDraft, SessionRecord, UserId,
    UserProfile,
};

use crate::repository::{MinigameDataSource, StorageError, UserDataSource};

const QUESTIONS_TABLE: &str = "minigame_questions";
const SESSIONS_TABLE: &str = "minigame_sessions";
const PROFILES_TABLE: &str = "user_profiles";

#[derive(Clone, Debug)]
pub struct LiveConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Anonymous (public) API key.
    pub api_key: String,
}

impl LiveConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn validated(self) -> Result<Self, StorageError> {
        if self.base_url.trim().is_empty() {
            return Err(StorageError::NotConfigured("supabase_url"));
        }
        if self.api_key.trim().is_empty() {
            return Err(StorageError::NotConfigured("supabase_key"));
        }
        Ok(self)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url.trim_end_matches('/'))
    }
}

/// Thin PostgREST client shared by both live adapters.
#[derive(Clone)]
struct RestClient {
    client: Client,
    config: LiveConfig,
}

impl RestClient {
    fn new(config: LiveConfig, client: Client) -> Result<Self, StorageError> {
        Ok(Self {
            client,
            config: config.validated()?,
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    fn get(&self, table: &str) -> RequestBuilder {
        self.authed(self.client.get(self.config.table_url(table)))
    }

    fn post(&self, table: &str) -> RequestBuilder {
        self.authed(self.client.post(self.config.table_url(table)))
    }

    fn patch(&self, table: &str) -> RequestBuilder {
        self.authed(self.client.patch(self.config.table_url(table)))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, StorageError> {
        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            log::error!("live: request failed with status {status}");
            return Err(StorageError::Http {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn fetch_rows<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Vec<T>, StorageError> {
        let response = Self::send(builder).await?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Row shape of `minigame_questions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionRow {
    id: String,
    #[serde(rename = "type")]
    category: Category,
    difficulty: Difficulty,
    question: String,
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    osm_tag: Option<String>,
}

impl QuestionRow {
    pub(crate) fn into_question(self) -> Result<Question, StorageError> {
        QuestionDraft {
            id: self.id,
            category: self.category,
            difficulty: self.difficulty,
            prompt: self.question,
            options: self.options,
            correct_answer: self.correct_answer,
            osm_tag: self.osm_tag,
        }
        .validate()
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[derive(Clone)]
pub struct LiveMinigameSource {
    rest: RestClient,
}

impl LiveMinigameSource {
    /// # Errors
    ///
    /// Returns `StorageError::NotConfigured` if the URL or key is blank.
    pub fn new(config: LiveConfig) -> Result<Self, StorageError> {
        Self::with_client(config, Client::new())
    }

    /// Same as `new`, reusing an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotConfigured` if the URL or key is blank.
    pub fn with_client(config: LiveConfig, client: Client) -> Result<Self, StorageError> {
        Ok(Self {
            rest: RestClient::new(config, client)?,
        })
    }
}

#[async_trait]
impl MinigameDataSource for LiveMinigameSource {
    async fn fetch_questions(
        &self,
        category: Category,
        difficulty: Difficulty,
        limit: usize,
    ) -> Result<Vec<Question>, StorageError> {
        let request = self.rest.get(QUESTIONS_TABLE).query(&[
            ("select", "*".to_owned()),
            ("type", eq(category.as_str())),
            ("difficulty", eq(difficulty.as_str())),
            ("limit", limit.to_string()),
        ]);
        let rows: Vec<QuestionRow> = RestClient::fetch_rows(request).await?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_question() {
                Ok(q) => questions.push(q),
                Err(e) => log::warn!("live: skipping malformed question row: {e}"),
            }
        }
        log::debug!(
            "live: fetched {} {category}/{difficulty} questions",
            questions.len()
        );
        Ok(questions)
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let request = self
            .rest
            .post(SESSIONS_TABLE)
            .header("Prefer", "return=minimal")
            .json(&[record]);
        RestClient::send(request).await?;
        log::info!("live: saved session {} for {}", record.id, record.user_id);
        Ok(())
    }

    async fn session_history(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        let request = self.rest.get(SESSIONS_TABLE).query(&[
            ("select", "*".to_owned()),
            ("userId", eq(user_id.as_str())),
            ("order", "completedAt.desc".to_owned()),
            ("limit", limit.to_string()),
        ]);
        RestClient::fetch_rows(request).await
    }
}

#[derive(Clone)]
pub struct LiveUserSource {
    rest: RestClient,
}

impl LiveUserSource {
    /// # Errors
    ///
    /// Returns `StorageError::NotConfigured` if the URL or key is blank.
    pub fn new(config: LiveConfig) -> Result<Self, StorageError> {
        Self::with_client(config, Client::new())
    }

    /// Same as `new`, reusing an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotConfigured` if the URL or key is blank.
    pub fn with_client(config: LiveConfig, client: Client) -> Result<Self, StorageError> {
        Ok(Self {
            rest: RestClient::new(config, client)?,
        })
    }
}

#[async_trait]
impl UserDataSource for LiveUserSource {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StorageError> {
        let request = self.rest.get(PROFILES_TABLE).query(&[
            ("select", "*".to_owned()),
            ("id", eq(user_id.as_str())),
            ("limit", "1".to_owned()),
        ]);
        let rows: Vec<UserProfile> = RestClient::fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<UserProfile, StorageError> {
        if update.is_empty() {
            return self
                .get_profile(user_id)
                .await?
                .ok_or(StorageError::NotFound);
        }
        let request = self
            .rest
            .patch(PROFILES_TABLE)
            .query(&[("id", eq(user_id.as_str()))])
            .header("Prefer", "return=representation")
            .json(&update);
        let rows: Vec<UserProfile> = RestClient::fetch_rows(request).await?;
        rows.into_iter().next().ok_or(StorageError::NotFound)
    }
}
