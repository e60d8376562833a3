// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pass-through relay from an upstream generation stream to a downstream transport.
//!
//! The relay is lazy: the upstream is polled only when the relay itself is polled, so at most
//! one fragment is in flight and a consumer that stops polling (or drops the relay) stops the
//! upstream. Fragments are never reordered, merged, dropped or cleaned up.
//!
//! Completion and failure are told apart by the last item: a normal end simply ends the
//! stream, an upstream failure yields one final [`RelayError`] first.

use futures::{Stream, StreamExt};

use crate::provider::ProviderError;

/// How each fragment is written downstream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Fragment bytes exactly as received.
    #[default]
    Raw,
    /// Fragment followed by `\n`.
    NewlinePerFragment,
}

impl Framing {
    fn frame(self, mut fragment: String) -> String {
        if self == Self::NewlinePerFragment {
            fragment.push('\n');
        }
        fragment
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("upstream failed after {forwarded} fragment(s): {source}")]
    Upstream {
        forwarded: usize,
        #[source]
        source: ProviderError,
    },
}

/// Logs cancellation when the relay is dropped before the upstream finished.
struct RelayWatch {
    forwarded: usize,
    finished: bool,
}

impl Drop for RelayWatch {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(forwarded = self.forwarded, "relay cancelled by downstream");
        }
    }
}

/// Forwards `upstream` fragments one at a time, in arrival order.
///
/// The first upstream error is yielded as [`RelayError::Upstream`] and ends the relay; no
/// further fragments are requested after it.
pub fn relay<S>(upstream: S, framing: Framing) -> impl Stream<Item = Result<String, RelayError>>
where
    S: Stream<Item = Result<String, ProviderError>> + Send,
{
    async_stream::stream! {
        let mut upstream = std::pin::pin!(upstream);
        let mut watch = RelayWatch { forwarded: 0, finished: false };

        while let Some(next) = upstream.next().await {
            match next {
                Ok(fragment) => {
                    watch.forwarded += 1;
                    yield Ok(framing.frame(fragment));
                }
                Err(source) => {
                    watch.finished = true;
                    tracing::warn!(
                        forwarded = watch.forwarded,
                        error = %source,
                        "upstream stream failed"
                    );
                    yield Err(RelayError::Upstream { forwarded: watch.forwarded, source });
                    return;
                }
            }
        }

        watch.finished = true;
        tracing::debug!(forwarded = watch.forwarded, "upstream stream completed");
    }
}
