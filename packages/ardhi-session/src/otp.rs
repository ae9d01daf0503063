//! One-time-code entry and verification
//!
//! `OtpBuffer` models the six single-character inputs on the verification
//! page, including where keyboard focus goes. `OtpVerifier` is the seam a
//! real issuance/validation service plugs into; `SimulatedVerifier` accepts
//! every code after a fixed delay.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::VerifyError;

pub const OTP_LENGTH: usize = 6;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OtpBuffer {
    slots: [Option<char>; OTP_LENGTH],
    focus: usize,
}

impl OtpBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the slot that currently has focus
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn slot(&self, index: usize) -> Option<char> {
        self.slots.get(index).copied().flatten()
    }

    /// Set slot `index` to the first character of `value` (empty clears it).
    ///
    /// Entering a character advances focus to the next slot if there is one.
    /// Returns the resulting focus.
    pub fn input(&mut self, index: usize, value: &str) -> usize {
        let Some(slot) = self.slots.get_mut(index) else {
            return self.focus;
        };

        *slot = value.chars().next();
        self.focus = index;

        if slot.is_some() && index + 1 < OTP_LENGTH {
            self.focus = index + 1;
        }
        self.focus
    }

    /// Backspace pressed in slot `index`. An empty slot hands focus back to
    /// the previous one.
    pub fn backspace(&mut self, index: usize) -> usize {
        if index >= OTP_LENGTH {
            return self.focus;
        }

        self.focus = index;
        if self.slots[index].is_none() && index > 0 {
            self.focus = index - 1;
        }
        self.focus
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Concatenated entered characters (shorter than six if incomplete)
    pub fn code(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Checks a one-time code for a phone number.
#[async_trait]
pub trait OtpVerifier: Send + Sync {
    async fn verify(&self, phone_number: &str, code: &str) -> Result<bool, VerifyError>;
}

/// Development stand-in: waits `delay`, then approves any code.
#[derive(Clone, Debug)]
pub struct SimulatedVerifier {
    delay: Duration,
}

impl SimulatedVerifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedVerifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl OtpVerifier for SimulatedVerifier {
    async fn verify(&self, phone_number: &str, code: &str) -> Result<bool, VerifyError> {
        info!(phone_number, code_len = code.len(), "Verifying OTP (simulated)");
        tokio::time::sleep(self.delay).await;
        Ok(true)
    }
}
