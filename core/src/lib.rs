//! Business-logic core of the SnapFit marketplace app.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host supplies an
//! [`HttpTransport`] and, for image uploads, an [`ImageUploader`]; the core
//! coordinates the calls and reshapes server payloads into view models.
//!
//! # Design
//! - `SnapfitClient` is stateless: it holds only `base_url` and an optional
//!   access token.
//! - `Worker` pairs the client with a transport, one async method per
//!   endpoint.
//! - `SlotAllocator` gathers an exact number of upload paths from a provider
//!   that may hand out fewer per call, within a bounded retry budget.
//! - `Interactor` exposes one handler per screen action and returns view
//!   models from `presenter`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod allocator;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod presenter;
pub mod types;
pub mod usecase;
pub mod worker;

pub use allocator::{SlotAllocator, SlotProvider, SlotRequest};
pub use client::SnapfitClient;
pub use config::ClientConfig;
pub use error::{AllocationError, ApiError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use presenter::{present_failure, FailureViewModel};
pub use types::{
    CancelReservation, CountResponse, FileInfo, ImagePaths, Location, MakerSummary, PostDetail,
    PriceOption, ProductPage, ProductPostRequest, ProductSummary, ReservationDetails,
    ReservationPage, ReservationRequest, ReservationSummary, UserCounts, UserDetails, Vibe,
};
pub use usecase::{ImageUploader, ImageUrlRequest, Interactor};
pub use worker::Worker;
