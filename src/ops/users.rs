// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Map};

use super::{find_records, insert_record, load_record, OpsError};
use crate::auth::normalize_email;
use crate::model::{now_millis, Record, Stored, User, UserId};
use crate::store::{DocumentStore, Filter};

/// Returns the user registered under `email`, creating it on first sign-in.
pub async fn upsert_user(
    store: &dyn DocumentStore,
    email: &str,
    name: &str,
) -> Result<Stored<User>, OpsError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(OpsError::Invalid("email must not be empty".to_owned()));
    }

    let filter = Filter::new().eq("email", email.as_str());
    if let Some(existing) = find_records::<User>(store, &filter).await?.into_iter().next() {
        return Ok(existing);
    }

    let user = User {
        email,
        name: name.trim().to_owned(),
        timestamp: now_millis(),
    };
    let stored = insert_record(store, user).await?;
    tracing::info!(user_id = %stored.id, "registered user");
    Ok(stored)
}

pub async fn get_user(
    store: &dyn DocumentStore,
    user_id: &UserId,
) -> Result<Stored<User>, OpsError> {
    load_record(store, user_id)
        .await?
        .ok_or_else(|| OpsError::not_found("user", user_id))
}

pub async fn update_profile(
    store: &dyn DocumentStore,
    user_id: &UserId,
    name: &str,
) -> Result<Stored<User>, OpsError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OpsError::Invalid("name must not be empty".to_owned()));
    }

    let mut changes = Map::new();
    changes.insert("name".to_owned(), json!(name));
    let found = store
        .update(User::COLLECTION, &user_id.clone().retag(), changes)
        .await?;
    if !found {
        return Err(OpsError::not_found("user", user_id));
    }
    get_user(store, user_id).await
}
