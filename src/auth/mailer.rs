// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("failed to deliver sign-in code to {recipient}: {reason}")]
pub struct MailError {
    pub recipient: String,
    pub reason: String,
}

/// Delivers sign-in codes.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_code(&self, email: &str, name: &str, code: &str) -> Result<(), MailError>;
}

/// Writes codes to the log instead of sending mail. Suitable for development only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_code(&self, email: &str, name: &str, code: &str) -> Result<(), MailError> {
        tracing::info!(%email, %name, %code, "sign-in code issued");
        Ok(())
    }
}
