//! Verification flow
//!
//! Drives `VerificationMachine` against real collaborators: reads the phone
//! number from navigation parameters, obtains the directory (cache first,
//! then fetch), collects the code, awaits the verifier and dispatches on the
//! matched user's role.
//!
//! Every method takes `&mut self`, so the cache read/write, the fetch and the
//! verifier delay run strictly one after another for a given flow. Dropping
//! a pending future discards its result; nothing is sent upstream.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{CacheStore, DirectoryCache, FileStore, MemoryStore};
use crate::client::{ApiClient, DirectoryFetcher};
use crate::config::ClientConfig;
use crate::error::FlowError;
use crate::machine::{
    DirectorySource, VerificationCommand, VerificationEvent, VerificationMachine,
    VerificationState,
};
use crate::otp::{OtpBuffer, OtpVerifier, SimulatedVerifier};
use crate::routes::Destination;
use crate::types::{DirectorySnapshot, User};

/// Query parameter carrying the phone number from the login page
pub const PHONE_NUMBER_PARAM: &str = "phone_number";

/// Incoming navigation (query string) parameters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationParams {
    params: HashMap<String, String>,
}

impl NavigationParams {
    /// Parse `phone_number=...&...`, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            params: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn with_phone_number(phone_number: impl Into<String>) -> Self {
        let mut params = HashMap::new();
        params.insert(PHONE_NUMBER_PARAM.to_string(), phone_number.into());
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.get(PHONE_NUMBER_PARAM)
    }
}

/// Flow wired to the HTTP API, the simulated verifier and a type-erased store
pub type DefaultFlow = VerificationFlow<ApiClient, SimulatedVerifier, Arc<dyn CacheStore>>;

pub struct VerificationFlow<F, V, S> {
    machine: VerificationMachine,
    otp: OtpBuffer,
    cache: DirectoryCache<S>,
    fetcher: F,
    verifier: V,
    redirect: Option<Destination>,
}

impl DefaultFlow {
    /// File-backed cache when `cache_dir` is configured, otherwise the
    /// process-wide memory store.
    pub fn from_config(config: &ClientConfig) -> Self {
        let store: Arc<dyn CacheStore> = match &config.cache_dir {
            Some(dir) => Arc::new(FileStore::new(dir.clone())),
            None => Arc::new(MemoryStore::shared()),
        };

        VerificationFlow::new(
            ApiClient::from_config(config),
            SimulatedVerifier::new(config.otp_delay),
            DirectoryCache::new(store),
        )
    }
}

impl<F, V, S> VerificationFlow<F, V, S>
where
    F: DirectoryFetcher,
    V: OtpVerifier,
    S: CacheStore,
{
    pub fn new(fetcher: F, verifier: V, cache: DirectoryCache<S>) -> Self {
        Self {
            machine: VerificationMachine::new(),
            otp: OtpBuffer::new(),
            cache,
            fetcher,
            verifier,
            redirect: None,
        }
    }

    pub fn state(&self) -> &VerificationState {
        self.machine.state()
    }

    pub fn error(&self) -> Option<&FlowError> {
        self.machine.error()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.machine.is_loading()
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.machine.phone_number()
    }

    /// Directory in hand, empty until loaded
    pub fn users(&self) -> &[User] {
        self.machine
            .directory()
            .map(DirectorySnapshot::users)
            .unwrap_or_default()
    }

    pub fn otp(&self) -> &OtpBuffer {
        &self.otp
    }

    pub fn focus(&self) -> usize {
        self.otp.focus()
    }

    /// Destination once the flow has redirected
    pub fn redirect(&self) -> Option<Destination> {
        self.redirect
    }

    pub fn cache(&self) -> &DirectoryCache<S> {
        &self.cache
    }

    /// Page activation: resolve the phone number and load the directory.
    pub async fn activate(&mut self, params: &NavigationParams) -> &VerificationState {
        let event = VerificationEvent::Activated {
            phone_number: params.phone_number().map(str::to_string),
        };
        self.dispatch(event).await;
        self.state()
    }

    /// Character typed into slot `index`; returns the new focus.
    pub fn input(&mut self, index: usize, value: &str) -> usize {
        let focus = self.otp.input(index, value);
        self.machine.decide(&VerificationEvent::CodeEdited);
        focus
    }

    /// Backspace in slot `index`; returns the new focus.
    pub fn backspace(&mut self, index: usize) -> usize {
        let focus = self.otp.backspace(index);
        self.machine.decide(&VerificationEvent::CodeEdited);
        focus
    }

    /// Submit gesture. Ignored while a verification is in flight or the code
    /// is incomplete. Returns the destination when the flow redirects.
    pub async fn submit(&mut self) -> Option<Destination> {
        let event = VerificationEvent::SubmitPressed {
            code: self.otp.code(),
        };
        self.dispatch(event).await;
        self.redirect
    }

    /// Feed an event to the machine and execute commands until it settles.
    async fn dispatch(&mut self, event: VerificationEvent) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let Some(command) = self.machine.decide(&event) else {
                break;
            };
            next = self.execute(command).await;
        }
    }

    async fn execute(&mut self, command: VerificationCommand) -> Option<VerificationEvent> {
        match command {
            VerificationCommand::LoadDirectory => Some(self.load_directory().await),
            VerificationCommand::Verify { phone_number, code } => {
                let event = match self.verifier.verify(&phone_number, &code).await {
                    Ok(verified) => VerificationEvent::VerificationResolved { verified },
                    Err(e) => VerificationEvent::VerificationErrored {
                        reason: e.to_string(),
                    },
                };
                Some(event)
            }
            VerificationCommand::Redirect(destination) => {
                info!(%destination, "Redirecting to");
                self.redirect = Some(destination);
                None
            }
        }
    }

    async fn load_directory(&self) -> VerificationEvent {
        match self.cache.get().await {
            Ok(Some(snapshot)) => {
                return VerificationEvent::DirectoryLoaded {
                    snapshot,
                    source: DirectorySource::Cache,
                };
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Directory cache unreadable, fetching"),
        }

        match self.fetcher.fetch_all().await {
            Ok(users) => {
                let snapshot = match self.cache.put(users.clone()).await {
                    Ok(snapshot) => {
                        debug!(users = snapshot.len(), "Stored user directory in cache");
                        snapshot
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to cache user directory");
                        DirectorySnapshot::new(users)
                    }
                };
                VerificationEvent::DirectoryLoaded {
                    snapshot,
                    source: DirectorySource::Fetch,
                }
            }
            Err(e) => VerificationEvent::DirectoryFailed {
                reason: e.to_string(),
            },
        }
    }
}
