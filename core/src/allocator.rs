//! Bounded acquisition of provider-issued slots.
//!
//! # Design
//! A [`SlotProvider`] hands out whatever slots it currently has, which may be
//! fewer than the caller needs. [`SlotAllocator::allocate`] keeps asking for
//! the shortfall until it holds exactly the requested number or the retry
//! budget runs out. Each step derives a fresh [`SlotRequest`] from the
//! previous one, so the chain is strictly sequential: one provider call is
//! in flight at a time, and at most `max_retries + 1` calls are made.
//!
//! Dropping the future returned by `allocate` drops the provider call in
//! flight and no further call is issued. There is no internal timeout.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AllocationError;

/// Source of opaque slots, queried one batch at a time.
#[async_trait]
pub trait SlotProvider: Send + Sync {
    type Slot: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Request one batch tagged with `extension`. The provider decides how
    /// many slots to return; an empty batch is not an error.
    async fn request(&self, extension: &str) -> Result<Vec<Self::Slot>, Self::Error>;
}

#[async_trait]
impl<'p, P> SlotProvider for &'p P
where
    P: SlotProvider + ?Sized,
{
    type Slot = P::Slot;
    type Error = P::Error;

    async fn request(&self, extension: &str) -> Result<Vec<Self::Slot>, Self::Error> {
        (**self).request(extension).await
    }
}

/// One step of an allocation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRequest {
    pub target_count: usize,
    pub extension: String,
    pub retries_remaining: u32,
}

impl SlotRequest {
    pub fn new(target_count: usize, extension: impl Into<String>, retries_remaining: u32) -> Self {
        Self {
            target_count,
            extension: extension.into(),
            retries_remaining,
        }
    }

    /// The request covering what is still missing after `received` slots
    /// arrived, or `None` when the budget is spent. Callers only ask for a
    /// follow-up when `received < target_count`.
    pub fn shortfall(&self, received: usize) -> Option<SlotRequest> {
        let retries_remaining = self.retries_remaining.checked_sub(1)?;
        Some(SlotRequest {
            target_count: self.target_count.saturating_sub(received),
            extension: self.extension.clone(),
            retries_remaining,
        })
    }
}

/// Collects exactly `target_count` slots from a provider, retrying on
/// shortfall.
#[derive(Debug, Clone)]
pub struct SlotAllocator<P> {
    provider: P,
}

impl<P: SlotProvider> SlotAllocator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Allocate `target_count` slots tagged with `extension`.
    ///
    /// On success the result holds exactly `target_count` slots in the order
    /// their batches arrived. A surplus in the final batch is discarded. A
    /// provider failure aborts the chain with [`AllocationError::Provider`];
    /// running out of retries yields [`AllocationError::InsufficientSlots`].
    /// One provider call is made even when `target_count` is zero.
    pub async fn allocate(
        &self,
        target_count: usize,
        extension: &str,
        max_retries: u32,
    ) -> Result<Vec<P::Slot>, AllocationError<P::Error>> {
        let mut request = SlotRequest::new(target_count, extension, max_retries);
        let mut allocated = Vec::new();
        let mut calls = 0u32;

        loop {
            calls += 1;
            let batch = self
                .provider
                .request(&request.extension)
                .await
                .map_err(AllocationError::Provider)?;
            let received = batch.len();
            debug!(
                call = calls,
                wanted = request.target_count,
                received,
                retries_remaining = request.retries_remaining,
                "received slot batch"
            );

            if received >= request.target_count {
                if received > request.target_count {
                    debug!(discarded = received - request.target_count, "discarding surplus slots");
                }
                allocated.extend(batch.into_iter().take(request.target_count));
                return Ok(allocated);
            }

            allocated.extend(batch);
            request = match request.shortfall(received) {
                Some(next) => next,
                None => {
                    warn!(
                        requested = target_count,
                        obtained = allocated.len(),
                        calls,
                        "slot retry budget exhausted"
                    );
                    return Err(AllocationError::InsufficientSlots {
                        requested: target_count,
                        obtained: allocated.len(),
                        calls,
                    });
                }
            };
        }
    }
}
