// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One-time sign-in codes.
//!
//! Entries are keyed by normalized email and indexed by issue order. The TTL is uniform, so issue
//! order is also expiry order: sweeping and eviction only ever look at the front of the queue.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use rand::Rng;

pub const DEFAULT_OTP_TTL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_OTP_CAPACITY: usize = 10_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpPolicy {
    pub ttl: Duration,
    pub capacity: usize,
    pub max_attempts: u32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_OTP_TTL,
            capacity: DEFAULT_OTP_CAPACITY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpError {
    #[error("no pending code for this email")]
    NotFound,
    #[error("code expired")]
    Expired,
    #[error("incorrect code ({remaining} attempts left)")]
    Mismatch { remaining: u32 },
    #[error("too many incorrect attempts")]
    TooManyAttempts,
}

#[derive(Debug)]
struct Entry {
    code: String,
    expires_at: Instant,
    failed_attempts: u32,
    seq: u64,
}

#[derive(Debug)]
pub struct OtpStore {
    policy: OtpPolicy,
    entries: HashMap<String, Entry>,
    // (seq, key); an item is stale once its key was reissued, verified or evicted.
    order: VecDeque<(u64, String)>,
    next_seq: u64,
}

impl OtpStore {
    pub fn new(policy: OtpPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_seq: 0,
        }
    }

    pub fn policy(&self) -> OtpPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Issues a fresh six-digit code for `email`, replacing any pending one.
    pub fn issue(&mut self, email: &str, now: Instant) -> String {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32));
        self.insert(email, code.clone(), now);
        code
    }

    fn insert(&mut self, email: &str, code: String, now: Instant) {
        let key = normalize_email(email);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.policy.capacity {
            self.sweep(now);
            while self.entries.len() >= self.policy.capacity.max(1) {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key.clone(),
            Entry {
                code,
                expires_at: now + self.policy.ttl,
                failed_attempts: 0,
                seq,
            },
        );
        self.order.push_back((seq, key));
        self.compact();
    }

    /// Checks `code` for `email`. A correct code is consumed.
    pub fn verify(&mut self, email: &str, code: &str, now: Instant) -> Result<(), OtpError> {
        let key = normalize_email(email);
        let Some(entry) = self.entries.get_mut(&key) else {
            return Err(OtpError::NotFound);
        };

        if now >= entry.expires_at {
            self.entries.remove(&key);
            return Err(OtpError::Expired);
        }

        if entry.code == code.trim() {
            self.entries.remove(&key);
            return Ok(());
        }

        entry.failed_attempts += 1;
        if entry.failed_attempts >= self.policy.max_attempts {
            self.entries.remove(&key);
            return Err(OtpError::TooManyAttempts);
        }
        Err(OtpError::Mismatch {
            remaining: self.policy.max_attempts - entry.failed_attempts,
        })
    }

    /// Drops expired entries; returns how many were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some((seq, key)) = self.order.front() {
            match self.entries.get(key) {
                Some(entry) if entry.seq == *seq => {
                    if entry.expires_at > now {
                        break;
                    }
                    self.entries.remove(key);
                    removed += 1;
                }
                _ => {}
            }
            self.order.pop_front();
        }
        removed
    }

    fn evict_oldest(&mut self) -> bool {
        while let Some((seq, key)) = self.order.pop_front() {
            if self.entries.get(&key).is_some_and(|entry| entry.seq == seq) {
                self.entries.remove(&key);
                tracing::debug!("evicted pending sign-in code at capacity");
                return true;
            }
        }
        false
    }

    fn compact(&mut self) {
        if self.order.len() <= self.entries.len().saturating_mul(2).max(64) {
            return;
        }
        let entries = &self.entries;
        self.order
            .retain(|(seq, key)| entries.get(key).is_some_and(|entry| entry.seq == *seq));
    }
}

impl Default for OtpStore {
    fn default() -> Self {
        Self::new(OtpPolicy::default())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
