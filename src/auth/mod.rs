// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Passwordless sign-in: emailed one-time codes exchanged for signed session tokens.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

mod mailer;
mod otp;
mod token;

pub use mailer::{LogMailer, MailError, Mailer};
pub use otp::{
    normalize_email, OtpError, OtpPolicy, OtpStore, DEFAULT_MAX_ATTEMPTS, DEFAULT_OTP_CAPACITY,
    DEFAULT_OTP_TTL,
};
pub use token::{Claims, TokenError, TokenService, DEFAULT_TOKEN_TTL};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Otp(#[from] OtpError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

pub struct AuthService {
    otps: Mutex<OtpStore>,
    tokens: TokenService,
    mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(policy: OtpPolicy, tokens: TokenService, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            otps: Mutex::new(OtpStore::new(policy)),
            tokens,
            mailer,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Issues a code for `email` and hands it to the mailer.
    pub async fn initiate(&self, email: &str, name: &str) -> Result<(), AuthError> {
        let code = self.otps.lock().await.issue(email, Instant::now());
        self.mailer
            .send_code(&normalize_email(email), name, &code)
            .await?;
        Ok(())
    }

    pub async fn verify_code(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let result = self.otps.lock().await.verify(email, code, Instant::now());
        if let Err(err) = &result {
            tracing::debug!(error = %err, "sign-in code rejected");
        }
        Ok(result?)
    }

    /// Drops expired codes; returns how many were removed.
    pub async fn sweep(&self) -> usize {
        self.otps.lock().await.sweep(Instant::now())
    }

    #[cfg(test)]
    async fn pending_codes(&self) -> usize {
        self.otps.lock().await.len()
    }
}
