//! Domain DTOs for the SnapFit marketplace API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined
//! independently; integration tests catch any drift between the two crates.
//! JSON field names are camelCase on the wire. Prices are whole won and
//! durations are minutes.

use serde::{Deserialize, Serialize};

/// The seller a product belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MakerSummary {
    pub id: i64,
    pub nickname: String,
}

/// One bookable duration and its price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceOption {
    pub min: u32,
    pub price: i64,
}

/// A product as it appears in listing pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub maker: MakerSummary,
    pub title: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub vibes: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    pub price: i64,
    #[serde(default)]
    pub studio: bool,
    #[serde(default)]
    pub like: bool,
}

/// One page of products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductPage {
    pub offset: u32,
    pub limit: u32,
    pub data: Vec<ProductSummary>,
}

/// Full product description shown on the detail screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: i64,
    pub maker: MakerSummary,
    pub created_at: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub vibes: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub prices: Vec<PriceOption>,
    #[serde(default)]
    pub person_price: Option<i64>,
    #[serde(default)]
    pub studio: bool,
    #[serde(default)]
    pub like: bool,
}

/// Mood tag used to filter products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vibe {
    pub id: i64,
    pub name: String,
}

/// Shooting area.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub admin_name: String,
}

/// Payload for booking a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub post_id: i64,
    pub minutes: u32,
    pub price: i64,
    pub email: String,
    pub phone_number: String,
    pub reservation_location: String,
    pub reservation_time: String,
    pub person: u32,
    pub person_price: i64,
}

/// A reservation as it appears in listing pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    pub id: i64,
    pub post: ProductSummary,
    pub reservation_time: String,
    #[serde(default)]
    pub cancel_message: Option<String>,
}

/// One page of reservations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservationPage {
    pub offset: u32,
    pub limit: u32,
    pub data: Vec<ReservationSummary>,
}

/// Everything known about a single reservation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetails {
    pub id: i64,
    pub email: String,
    pub phone_number: String,
    pub post: ProductSummary,
    pub reservation_location: String,
    pub reservation_time: String,
    pub minutes: u32,
    pub price: i64,
    pub person: u32,
    pub person_price: i64,
    pub created_at: String,
    #[serde(default)]
    pub cancel_message: Option<String>,
}

/// Payload for cancelling a reservation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CancelReservation {
    pub message: String,
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub vibes: Vec<Vibe>,
    #[serde(default)]
    pub maker: bool,
}

/// A bare counter returned by the count endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    pub count: u64,
}

/// Like and reservation counters fetched together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserCounts {
    pub like_count: u64,
    pub reservation_count: u64,
}

/// A pre-authorized upload destination issued by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub file_path: String,
    pub presigned_url: String,
}

/// Response of the image-paths endpoint. The server decides how many
/// entries it hands out per call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImagePaths {
    pub file_infos: Vec<FileInfo>,
}

/// Payload for publishing a new product as a maker. `vibes` and `locations`
/// carry ids from the vibe and location catalogues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductPostRequest {
    pub title: String,
    pub description: String,
    pub vibes: Vec<i64>,
    pub locations: Vec<i64>,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub prices: Vec<PriceOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_price: Option<i64>,
    #[serde(default)]
    pub studio: bool,
}
