//! Asynchronous work against the API.
//!
//! Every action follows the same pattern: issue the request, reject
//! `{"error": ...}` envelopes, then commit the decoded payload. On any
//! failure the error is committed with [`Mutation::Error`] and returned.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Mutation, Store};
use crate::client::{self, ApiError, Body};
use crate::models::{DownloadData, NewSnippet, Snippet, SnippetAlteration, Technique};

pub const LANGUAGES: &str = "/snippets/languages";
pub const TECHNIQUES: &str = "/techniques";
pub const ARCHITECTURES: &str = "/snippets/architectures";
pub const TACTICS: &str = "/tactics";
pub const OBFUSCATOR_PROFILES: &str = "/obfuscator/profiles";
pub const SNIPPETS: &str = "/snippets";
pub const CREATE_SNIPPET: &str = "/snippets/create";
pub const BUILD: &str = "/build";
pub const SEARCH: &str = "/search";
pub const STATUS_TECHNIQUE_COUNT: &str = "/status/techniqueCount";
pub const STATUS_TOP_LANGUAGE: &str = "/status/topLanguage";
pub const STATUS_TOP_TECHNIQUE: &str = "/status/topTechnique";
pub const STATUS_VERSION: &str = "/status/version";
pub const STATUS_SNIPPETS: &str = "/status/snippets";

/// Store-level operations a view can dispatch by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RetrieveAll,
    RetrieveLanguages,
    RetrieveTechniques,
    RetrieveArchitectures,
    RetrieveTactics,
    RetrieveObfuscatorProfiles,
    RetrieveSnippets,
    RetrieveStatusTechniqueCount,
    RetrieveStatusTopLanguage,
    RetrieveStatusTopTechnique,
    RetrieveStatusVersion,
    RetrieveStatusSnippets,
    SearchSnippets(String),
    AddNewSnippet(NewSnippet),
    CreateSnippet(SnippetAlteration),
    ReloadCatalog,
}

impl Store {
    pub async fn dispatch(&self, action: Action) -> Result<(), ApiError> {
        debug!(?action, "dispatch");
        match action {
            Action::RetrieveAll => self.retrieve_all().await,
            Action::RetrieveLanguages => self.retrieve_languages().await,
            Action::RetrieveTechniques => self.retrieve_techniques().await,
            Action::RetrieveArchitectures => self.retrieve_architectures().await,
            Action::RetrieveTactics => self.retrieve_tactics().await,
            Action::RetrieveObfuscatorProfiles => self.retrieve_obfuscator_profiles().await,
            Action::RetrieveSnippets => self.retrieve_snippets().await,
            Action::RetrieveStatusTechniqueCount => self.retrieve_status_technique_count().await,
            Action::RetrieveStatusTopLanguage => self.retrieve_status_top_language().await,
            Action::RetrieveStatusTopTechnique => self.retrieve_status_top_technique().await,
            Action::RetrieveStatusVersion => self.retrieve_status_version().await,
            Action::RetrieveStatusSnippets => self.retrieve_status_snippets().await,
            Action::SearchSnippets(keyword) => self.search_snippets(&keyword).await,
            Action::AddNewSnippet(payload) => self.add_new_snippet(&payload).await,
            Action::CreateSnippet(payload) => self.create_snippet(&payload).await,
            Action::ReloadCatalog => self.reload_catalog().await,
        }
    }

    /// Loads everything the catalog views need.
    ///
    /// The eight retrievals run as separate tasks. Returns once all of them
    /// succeeded, or with the first error to arrive. Retrievals still in
    /// flight at that point are left to finish and commit; nothing already
    /// committed is rolled back. Must be called from within a tokio runtime.
    pub async fn retrieve_all(&self) -> Result<(), ApiError> {
        let mut pending: FuturesUnordered<_> = [
            self.spawn(|store| async move { store.retrieve_languages().await }),
            self.spawn(|store| async move { store.retrieve_techniques().await }),
            self.spawn(|store| async move { store.retrieve_architectures().await }),
            self.spawn(|store| async move { store.retrieve_snippets().await }),
            self.spawn(|store| async move { store.retrieve_status_technique_count().await }),
            self.spawn(|store| async move { store.retrieve_status_top_language().await }),
            self.spawn(|store| async move { store.retrieve_status_version().await }),
            self.spawn(|store| async move { store.retrieve_status_snippets().await }),
        ]
        .into_iter()
        .collect();

        while let Some(joined) = pending.next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => return Err(err),
                Err(join_err) => {
                    return Err(self.fail("retrieveAll", ApiError::Task(join_err.to_string())));
                }
            }
        }
        Ok(())
    }

    pub async fn retrieve_languages(&self) -> Result<(), ApiError> {
        self.retrieve(LANGUAGES, Mutation::SetLanguages).await
    }

    pub async fn retrieve_techniques(&self) -> Result<(), ApiError> {
        self.retrieve(TECHNIQUES, Mutation::SetTechniques).await
    }

    pub async fn retrieve_architectures(&self) -> Result<(), ApiError> {
        self.retrieve(ARCHITECTURES, Mutation::SetArchitectures).await
    }

    pub async fn retrieve_tactics(&self) -> Result<(), ApiError> {
        self.retrieve(TACTICS, Mutation::SetTactics).await
    }

    /// Build profiles the server accepts in `POST /build`.
    pub async fn retrieve_obfuscator_profiles(&self) -> Result<(), ApiError> {
        self.retrieve(OBFUSCATOR_PROFILES, Mutation::SetObfuscatorProfiles)
            .await
    }

    pub async fn retrieve_snippets(&self) -> Result<(), ApiError> {
        self.retrieve(SNIPPETS, Mutation::SetSnippets).await
    }

    pub async fn retrieve_status_technique_count(&self) -> Result<(), ApiError> {
        self.retrieve(STATUS_TECHNIQUE_COUNT, Mutation::SetStatusTechniqueCount)
            .await
    }

    pub async fn retrieve_status_top_language(&self) -> Result<(), ApiError> {
        self.retrieve(STATUS_TOP_LANGUAGE, Mutation::SetStatusTopLanguage)
            .await
    }

    pub async fn retrieve_status_top_technique(&self) -> Result<(), ApiError> {
        self.retrieve(STATUS_TOP_TECHNIQUE, Mutation::SetStatusTopTechnique)
            .await
    }

    pub async fn retrieve_status_version(&self) -> Result<(), ApiError> {
        self.retrieve(STATUS_VERSION, Mutation::SetStatusVersion).await
    }

    pub async fn retrieve_status_snippets(&self) -> Result<(), ApiError> {
        self.retrieve(STATUS_SNIPPETS, Mutation::SetStatusSnippets).await
    }

    /// Fetches one snippet without touching the loaded collection.
    pub async fn retrieve_snippet(&self, id: &str) -> Result<Snippet, ApiError> {
        self.fetch(&format!("{SNIPPETS}/{id}")).await
    }

    /// Techniques grouped under one tactic; not stored.
    pub async fn retrieve_tactic(&self, name: &str) -> Result<Vec<Technique>, ApiError> {
        self.fetch(&format!("{TACTICS}/{name}")).await
    }

    /// Server-side keyword search. The keyword travels base64 encoded.
    pub async fn search_snippets(&self, keyword: &str) -> Result<(), ApiError> {
        let path = format!("{SEARCH}?keyword={}", encode_keyword(keyword));
        self.retrieve(&path, Mutation::SetSearchResults).await
    }

    /// Submits a new snippet. Nothing is committed on success; reload the
    /// catalog to see it.
    pub async fn add_new_snippet<P>(&self, payload: &P) -> Result<(), ApiError>
    where
        P: Serialize + ?Sized,
    {
        self.submit(CREATE_SNIPPET, payload).await.map(|_| ())
    }

    /// Requests a generated build and stores the result as download data.
    pub async fn create_snippet<P>(&self, payload: &P) -> Result<(), ApiError>
    where
        P: Serialize + ?Sized,
    {
        let body = self.submit(BUILD, payload).await?;
        self.commit(Mutation::SetDownloadData(download_data(body)));
        Ok(())
    }

    /// Asks the server to re-read its snippet folder.
    pub async fn reload_catalog(&self) -> Result<(), ApiError> {
        match self.transport().put(SNIPPETS).await.and_then(client::check) {
            Ok(_) => Ok(()),
            Err(err) => Err(self.fail(SNIPPETS, err)),
        }
    }

    async fn retrieve<T, F>(&self, path: &str, mutation: F) -> Result<(), ApiError>
    where
        T: DeserializeOwned + Send,
        F: FnOnce(T) -> Mutation + Send,
    {
        let payload = self.fetch(path).await?;
        self.commit(mutation(payload));
        Ok(())
    }

    async fn fetch<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        self.transport()
            .get(path)
            .await
            .and_then(client::decode)
            .map_err(|err| self.fail(path, err))
    }

    /// Serializes `payload` into an owned body before anything is sent, so the
    /// request never shares data with the caller.
    async fn submit<P>(&self, path: &str, payload: &P) -> Result<Body, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(err) => return Err(self.fail(path, err.into())),
        };
        self.transport()
            .post(path, body)
            .await
            .and_then(client::check)
            .map_err(|err| self.fail(path, err))
    }

    fn fail(&self, origin: &str, err: ApiError) -> ApiError {
        warn!(origin, error = %err, "action failed");
        self.commit(Mutation::Error(err.clone()));
        err
    }

    fn spawn<F, Fut>(&self, run: F) -> JoinHandle<Result<(), ApiError>>
    where
        F: FnOnce(Store) -> Fut,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        tokio::spawn(run(self.clone()))
    }
}

/// Base64 as the server decodes it, percent-escaped for the query string.
fn encode_keyword(keyword: &str) -> String {
    urlencoding::encode(&STANDARD.encode(keyword)).into_owned()
}

/// Generated code is text even when it happens to be a JSON scalar; only
/// objects and arrays are kept as records.
fn download_data(body: Body) -> DownloadData {
    match body {
        Body::Empty => DownloadData::default(),
        Body::Text(text) => DownloadData::Text(text),
        Body::Json(serde_json::Value::String(text)) => DownloadData::Text(text),
        Body::Json(value @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => {
            DownloadData::Record(value)
        }
        Body::Json(scalar) => DownloadData::Text(scalar.to_string()),
    }
}
