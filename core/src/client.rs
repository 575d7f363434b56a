//! Stateless HTTP request builder and response parser for the marketplace API.
//!
//! # Design
//! `SnapfitClient` holds only a `base_url` and an optional access token and
//! carries no mutable state between calls. Each endpoint has a `build_*`
//! method that produces an `HttpRequest`; responses are consumed by a
//! `parse_*` method named after the payload they carry. The caller executes
//! the actual HTTP round-trip, keeping the client deterministic and free of
//! I/O dependencies.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CancelReservation, CountResponse, FileInfo, ImagePaths, Location, PostDetail, ProductPage,
    ProductPostRequest, ReservationDetails, ReservationPage, ReservationRequest, UserDetails, Vibe,
};

/// Synchronous, stateless client for the marketplace API.
#[derive(Debug, Clone)]
pub struct SnapfitClient {
    base_url: String,
    access_token: Option<String>,
}

impl SnapfitClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Attach a bearer token to every request built from now on. The token
    /// is owned by the host; the client never persists it.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- products ---------------------------------------------------------

    pub fn build_list_products(&self, limit: u32, offset: u32) -> HttpRequest {
        self.get(&format!("/snapfit/posts?{}", page_query(&[], limit, offset)))
    }

    pub fn build_list_products_by_vibes(&self, vibes: &str, limit: u32, offset: u32) -> HttpRequest {
        self.get(&format!(
            "/snapfit/posts/vibes?{}",
            page_query(&[("vibes", vibes)], limit, offset)
        ))
    }

    pub fn build_get_post(&self, post_id: i64) -> HttpRequest {
        self.get(&format!("/snapfit/post/{post_id}"))
    }

    pub fn build_list_products_for_maker(&self, maker_id: i64, limit: u32, offset: u32) -> HttpRequest {
        let maker_id = maker_id.to_string();
        self.get(&format!(
            "/snapfit/posts/maker?{}",
            page_query(&[("userId", maker_id.as_str())], limit, offset)
        ))
    }

    pub fn build_list_vibes(&self) -> HttpRequest {
        self.get("/snapfit/vibes")
    }

    pub fn build_list_locations(&self) -> HttpRequest {
        self.get("/snapfit/locations")
    }

    // -- reservations -----------------------------------------------------

    pub fn build_create_reservation(&self, input: &ReservationRequest) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/snapfit/reservation", input)
    }

    pub fn build_list_user_reservations(&self, limit: u32, offset: u32) -> HttpRequest {
        self.get(&format!("/snapfit/reservations/user?{}", page_query(&[], limit, offset)))
    }

    pub fn build_get_reservation(&self, reservation_id: i64) -> HttpRequest {
        self.get(&format!("/snapfit/reservation/{reservation_id}"))
    }

    pub fn build_cancel_reservation(&self, reservation_id: i64, message: &str) -> Result<HttpRequest, ApiError> {
        let body = CancelReservation {
            message: message.to_string(),
        };
        self.with_json(
            HttpMethod::Post,
            &format!("/snapfit/reservation/{reservation_id}/cancel"),
            &body,
        )
    }

    // -- likes ------------------------------------------------------------

    pub fn build_like_post(&self, post_id: i64) -> HttpRequest {
        self.request(HttpMethod::Post, &format!("/snapfit/post/{post_id}/like"))
    }

    pub fn build_unlike_post(&self, post_id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/snapfit/post/{post_id}/like"))
    }

    pub fn build_list_user_likes(&self, limit: u32, offset: u32) -> HttpRequest {
        self.get(&format!("/snapfit/posts/like?{}", page_query(&[], limit, offset)))
    }

    // -- maker ------------------------------------------------------------

    pub fn build_list_maker_posts(&self, maker_id: i64, limit: u32, offset: u32) -> HttpRequest {
        let maker_id = maker_id.to_string();
        self.get(&format!(
            "/snapfit/maker/posts?{}",
            page_query(&[("userId", maker_id.as_str())], limit, offset)
        ))
    }

    pub fn build_image_paths(&self, extension: &str) -> HttpRequest {
        self.get(&format!("/snapfit/image/paths?{}", encode_query(&[("ext", extension)])))
    }

    pub fn build_create_post(&self, input: &ProductPostRequest) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, "/snapfit/post", input)
    }

    pub fn build_list_maker_reservations(&self, limit: u32, offset: u32) -> HttpRequest {
        self.get(&format!("/snapfit/maker/reservations?{}", page_query(&[], limit, offset)))
    }

    // -- user -------------------------------------------------------------

    pub fn build_get_user(&self) -> HttpRequest {
        self.get("/snapfit/user")
    }

    pub fn build_like_count(&self) -> HttpRequest {
        self.get("/snapfit/user/count/like")
    }

    pub fn build_reservation_count(&self) -> HttpRequest {
        self.get("/snapfit/user/count/reservation")
    }

    pub fn build_delete_account(&self) -> HttpRequest {
        self.request(HttpMethod::Delete, "/snapfit/user")
    }

    /// End the server-side session. The host clears its own stored tokens.
    pub fn build_logout(&self) -> HttpRequest {
        self.request(HttpMethod::Post, "/snapfit/logout")
    }

    // -- parsing ----------------------------------------------------------

    pub fn parse_product_page(&self, response: HttpResponse) -> Result<ProductPage, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_post_detail(&self, response: HttpResponse) -> Result<PostDetail, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_created_post(&self, response: HttpResponse) -> Result<PostDetail, ApiError> {
        parse_json(response, 201)
    }

    pub fn parse_vibes(&self, response: HttpResponse) -> Result<Vec<Vibe>, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_locations(&self, response: HttpResponse) -> Result<Vec<Location>, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_created_reservation(&self, response: HttpResponse) -> Result<ReservationDetails, ApiError> {
        parse_json(response, 201)
    }

    pub fn parse_reservation_details(&self, response: HttpResponse) -> Result<ReservationDetails, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_reservation_page(&self, response: HttpResponse) -> Result<ReservationPage, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_image_paths(&self, response: HttpResponse) -> Result<Vec<FileInfo>, ApiError> {
        parse_json::<ImagePaths>(response, 200).map(|paths| paths.file_infos)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<UserDetails, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_count(&self, response: HttpResponse) -> Result<u64, ApiError> {
        parse_json::<CountResponse>(response, 200).map(|c| c.count)
    }

    /// Parse the empty 204 reply of cancel, like, unlike, logout and account
    /// deletion.
    pub fn parse_no_content(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    // -- helpers ----------------------------------------------------------

    fn get(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Get, path)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(token) = &self.access_token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body: None,
        }
    }

    fn with_json<T: Serialize>(&self, method: HttpMethod, path: &str, input: &T) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

fn encode_query(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn page_query(extra: &[(&str, &str)], limit: u32, offset: u32) -> String {
    let limit = limit.to_string();
    let offset = offset.to_string();
    let mut pairs = extra.to_vec();
    pairs.push(("limit", limit.as_str()));
    pairs.push(("offset", offset.as_str()));
    encode_query(&pairs)
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        401 => Err(ApiError::Unauthorized),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
