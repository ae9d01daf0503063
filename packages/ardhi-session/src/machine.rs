//! Verification state machine
//!
//! Pure decision layer for the OTP page: it receives events (facts about what
//! happened), updates its state, and optionally returns a command (intent for
//! IO). `decide` never performs IO; `VerificationFlow` executes commands and
//! feeds the outcomes back as events.
//!
//! ```text
//! Idle → PhoneResolved → DirectoryReady → AwaitingCode → Verifying → Redirecting
//!                                              ↑              ↓
//!                                              └─ CodeEdited ─ Failed
//! ```

use tracing::{debug, info, warn};

use crate::error::FlowError;
use crate::otp::OTP_LENGTH;
use crate::phone;
use crate::routes::Destination;
use crate::types::DirectorySnapshot;

/// Where the snapshot came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectorySource {
    Cache,
    Fetch,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VerificationState {
    Idle,
    PhoneResolved,
    DirectoryReady,
    AwaitingCode,
    Verifying,
    /// Terminal: control passes to the destination view
    Redirecting(Destination),
    Failed(FlowError),
}

/// Facts fed into the machine
#[derive(Clone, Debug)]
pub enum VerificationEvent {
    Activated { phone_number: Option<String> },
    DirectoryLoaded { snapshot: DirectorySnapshot, source: DirectorySource },
    DirectoryFailed { reason: String },
    CodeEdited,
    SubmitPressed { code: String },
    VerificationResolved { verified: bool },
    VerificationErrored { reason: String },
}

/// Intents the flow must carry out
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationCommand {
    LoadDirectory,
    Verify { phone_number: String, code: String },
    Redirect(Destination),
}

pub struct VerificationMachine {
    state: VerificationState,
    phone_number: Option<String>,
    directory: Option<DirectorySnapshot>,
}

impl VerificationMachine {
    pub fn new() -> Self {
        Self {
            state: VerificationState::Idle,
            phone_number: None,
            directory: None,
        }
    }

    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn directory(&self) -> Option<&DirectorySnapshot> {
        self.directory.as_ref()
    }

    /// Submit button disabled while true
    pub fn is_loading(&self) -> bool {
        self.state == VerificationState::Verifying
    }

    /// The single error currently on display, if any
    pub fn error(&self) -> Option<&FlowError> {
        match &self.state {
            VerificationState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn decide(&mut self, event: &VerificationEvent) -> Option<VerificationCommand> {
        if let VerificationState::Redirecting(_) = self.state {
            debug!(?event, "Ignoring event after redirect");
            return None;
        }

        match event {
            VerificationEvent::Activated { phone_number } => {
                if self.state != VerificationState::Idle {
                    return None;
                }
                match phone_number.as_deref().filter(|p| !p.is_empty()) {
                    Some(phone) => {
                        info!(phone_number = phone, "Phone number from query params");
                        self.phone_number = Some(phone.to_string());
                        self.state = VerificationState::PhoneResolved;
                        Some(VerificationCommand::LoadDirectory)
                    }
                    None => {
                        warn!("No phone number in navigation parameters");
                        self.fail(FlowError::MissingPhone)
                    }
                }
            }

            VerificationEvent::DirectoryLoaded { snapshot, source } => {
                if self.state != VerificationState::PhoneResolved {
                    return None;
                }
                debug!(users = snapshot.len(), ?source, "Directory ready");
                self.directory = Some(snapshot.clone());
                self.state = VerificationState::DirectoryReady;
                // Nothing else gates code entry once the directory is in hand
                self.state = VerificationState::AwaitingCode;
                None
            }

            VerificationEvent::DirectoryFailed { reason } => {
                if self.state != VerificationState::PhoneResolved {
                    return None;
                }
                warn!(%reason, "Error fetching users");
                self.fail(FlowError::FetchFailed)
            }

            VerificationEvent::CodeEdited => {
                if self.can_submit() {
                    self.state = VerificationState::AwaitingCode;
                }
                None
            }

            VerificationEvent::SubmitPressed { code } => {
                if !self.can_submit() {
                    debug!(state = ?self.state, "Submit ignored");
                    return None;
                }
                if code.chars().count() != OTP_LENGTH {
                    debug!(len = code.chars().count(), "Submit ignored: code incomplete");
                    return None;
                }
                self.state = VerificationState::Verifying;
                Some(VerificationCommand::Verify {
                    phone_number: self.phone_number.clone().unwrap_or_default(),
                    code: code.clone(),
                })
            }

            VerificationEvent::VerificationResolved { verified } => {
                if self.state != VerificationState::Verifying {
                    return None;
                }
                self.resolve(*verified)
            }

            VerificationEvent::VerificationErrored { reason } => {
                if self.state != VerificationState::Verifying {
                    return None;
                }
                warn!(%reason, "Error during OTP verification");
                self.fail(FlowError::VerificationFailed)
            }
        }
    }

    /// Awaiting a code, or failed in a way the user can fix by resubmitting
    fn can_submit(&self) -> bool {
        match &self.state {
            VerificationState::AwaitingCode => true,
            VerificationState::Failed(err) => err.is_recoverable() && self.directory.is_some(),
            _ => false,
        }
    }

    fn resolve(&mut self, verified: bool) -> Option<VerificationCommand> {
        let users = self.directory.as_ref().map(|d| d.users()).unwrap_or_default();
        if users.is_empty() {
            return self.fail(FlowError::EmptyDirectory);
        }

        let phone_number = match self.phone_number.as_deref() {
            Some(phone) if verified => phone,
            _ => return self.fail(FlowError::InvalidCode),
        };

        let Some(user) = phone::find_user(users, phone_number) else {
            return self.fail(FlowError::UserNotFound);
        };

        match user.role.destination() {
            Some(destination) => {
                info!(user = %user.name, role = %user.role, %destination, "Redirecting");
                self.state = VerificationState::Redirecting(destination);
                Some(VerificationCommand::Redirect(destination))
            }
            None => {
                warn!(role = %user.role, "Unknown user role");
                let role = user.role.to_string();
                self.fail(FlowError::UnknownRole(role))
            }
        }
    }

    fn fail(&mut self, error: FlowError) -> Option<VerificationCommand> {
        self.state = VerificationState::Failed(error);
        None
    }
}

impl Default for VerificationMachine {
    fn default() -> Self {
        Self::new()
    }
}
