//! Async worker pairing the request builder with a host transport.
//!
//! # Design
//! `Worker` is the only place where a built `HttpRequest` meets the network.
//! Every method is `build_*` -> [`HttpTransport::execute`] -> `parse_*`, so a
//! test can swap in a scripted transport and observe exact requests. The
//! worker also serves as the [`SlotProvider`] for image upload paths.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::allocator::SlotProvider;
use crate::client::SnapfitClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::{
    FileInfo, Location, PostDetail, ProductPage, ProductPostRequest, ReservationDetails,
    ReservationPage, ReservationRequest, UserDetails, Vibe,
};

/// Executes marketplace operations over a host-supplied transport.
#[derive(Debug, Clone)]
pub struct Worker<T> {
    client: SnapfitClient,
    transport: T,
}

impl<T: HttpTransport> Worker<T> {
    pub fn new(client: SnapfitClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &SnapfitClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    pub async fn fetch_products(&self, limit: u32, offset: u32) -> Result<ProductPage, ApiError> {
        let response = self.send(self.client.build_list_products(limit, offset)).await?;
        self.client.parse_product_page(response)
    }

    pub async fn fetch_products_by_vibes(
        &self,
        vibes: &str,
        limit: u32,
        offset: u32,
    ) -> Result<ProductPage, ApiError> {
        let request = self.client.build_list_products_by_vibes(vibes, limit, offset);
        let response = self.send(request).await?;
        self.client.parse_product_page(response)
    }

    pub async fn fetch_post_detail(&self, post_id: i64) -> Result<PostDetail, ApiError> {
        let response = self.send(self.client.build_get_post(post_id)).await?;
        self.client.parse_post_detail(response)
    }

    pub async fn fetch_products_for_maker(
        &self,
        maker_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<ProductPage, ApiError> {
        let request = self.client.build_list_products_for_maker(maker_id, limit, offset);
        let response = self.send(request).await?;
        self.client.parse_product_page(response)
    }

    pub async fn fetch_vibes(&self) -> Result<Vec<Vibe>, ApiError> {
        let response = self.send(self.client.build_list_vibes()).await?;
        self.client.parse_vibes(response)
    }

    pub async fn fetch_locations(&self) -> Result<Vec<Location>, ApiError> {
        let response = self.send(self.client.build_list_locations()).await?;
        self.client.parse_locations(response)
    }

    pub async fn make_reservation(
        &self,
        input: &ReservationRequest,
    ) -> Result<ReservationDetails, ApiError> {
        let response = self.send(self.client.build_create_reservation(input)?).await?;
        self.client.parse_created_reservation(response)
    }

    pub async fn fetch_user_reservations(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<ReservationPage, ApiError> {
        let request = self.client.build_list_user_reservations(limit, offset);
        let response = self.send(request).await?;
        self.client.parse_reservation_page(response)
    }

    pub async fn fetch_reservation_detail(
        &self,
        reservation_id: i64,
    ) -> Result<ReservationDetails, ApiError> {
        let response = self.send(self.client.build_get_reservation(reservation_id)).await?;
        self.client.parse_reservation_details(response)
    }

    pub async fn cancel_reservation(&self, reservation_id: i64, message: &str) -> Result<(), ApiError> {
        let request = self.client.build_cancel_reservation(reservation_id, message)?;
        let response = self.send(request).await?;
        self.client.parse_no_content(response)
    }

    pub async fn like_post(&self, post_id: i64) -> Result<(), ApiError> {
        let response = self.send(self.client.build_like_post(post_id)).await?;
        self.client.parse_no_content(response)
    }

    pub async fn unlike_post(&self, post_id: i64) -> Result<(), ApiError> {
        let response = self.send(self.client.build_unlike_post(post_id)).await?;
        self.client.parse_no_content(response)
    }

    pub async fn fetch_user_likes(&self, limit: u32, offset: u32) -> Result<ProductPage, ApiError> {
        let response = self.send(self.client.build_list_user_likes(limit, offset)).await?;
        self.client.parse_product_page(response)
    }

    pub async fn fetch_maker_posts(
        &self,
        maker_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<ProductPage, ApiError> {
        let request = self.client.build_list_maker_posts(maker_id, limit, offset);
        let response = self.send(request).await?;
        self.client.parse_product_page(response)
    }

    #[instrument(skip(self))]
    pub async fn fetch_image_paths(&self, extension: &str) -> Result<Vec<FileInfo>, ApiError> {
        let response = self.send(self.client.build_image_paths(extension)).await?;
        self.client.parse_image_paths(response)
    }

    pub async fn post_product(&self, input: &ProductPostRequest) -> Result<PostDetail, ApiError> {
        let response = self.send(self.client.build_create_post(input)?).await?;
        self.client.parse_created_post(response)
    }

    pub async fn fetch_maker_reservations(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<ReservationPage, ApiError> {
        let request = self.client.build_list_maker_reservations(limit, offset);
        let response = self.send(request).await?;
        self.client.parse_reservation_page(response)
    }

    pub async fn fetch_user_details(&self) -> Result<UserDetails, ApiError> {
        let response = self.send(self.client.build_get_user()).await?;
        self.client.parse_user(response)
    }

    pub async fn fetch_like_count(&self) -> Result<u64, ApiError> {
        let response = self.send(self.client.build_like_count()).await?;
        self.client.parse_count(response)
    }

    pub async fn fetch_reservation_count(&self) -> Result<u64, ApiError> {
        let response = self.send(self.client.build_reservation_count()).await?;
        self.client.parse_count(response)
    }

    pub async fn delete_account(&self) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_account()).await?;
        self.client.parse_no_content(response)
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.send(self.client.build_logout()).await?;
        self.client.parse_no_content(response)
    }
}

#[async_trait]
impl<T: HttpTransport> SlotProvider for Worker<T> {
    type Slot = FileInfo;
    type Error = ApiError;

    async fn request(&self, extension: &str) -> Result<Vec<FileInfo>, ApiError> {
        self.fetch_image_paths(extension).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::allocator::SlotAllocator;
    use crate::http::HttpMethod;

    /// Replays canned responses and records every request it receives.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
        pub(crate) requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn reply(self, status: u16, body: &str) -> Self {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }));
            self
        }

        pub(crate) fn fail(self, message: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(ApiError::Transport(message.to_string())));
            self
        }

        pub(crate) fn paths(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.path.clone())
                .collect()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
        }
    }

    pub(crate) fn image_paths_body(names: &[&str]) -> String {
        let infos: Vec<FileInfo> = names
            .iter()
            .map(|name| FileInfo {
                file_path: format!("/images/{name}.png"),
                presigned_url: format!("http://upload.test/{name}.png"),
            })
            .collect();
        serde_json::to_string(&crate::types::ImagePaths { file_infos: infos }).unwrap()
    }

    fn worker(transport: ScriptedTransport) -> Worker<ScriptedTransport> {
        Worker::new(SnapfitClient::new("http://api.test"), transport)
    }

    #[tokio::test]
    async fn fetch_vibes_round_trips_through_transport() {
        let worker = worker(ScriptedTransport::default().reply(200, r#"[{"id":1,"name":"calm"}]"#));
        let vibes = worker.fetch_vibes().await.unwrap();
        assert_eq!(vibes, vec![Vibe { id: 1, name: "calm".to_string() }]);
        assert_eq!(worker.transport().paths(), vec!["http://api.test/snapfit/vibes"]);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let worker = worker(ScriptedTransport::default().fail("offline"));
        let err = worker.fetch_user_details().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn cancel_reservation_posts_message() {
        let worker = worker(ScriptedTransport::default().reply(204, ""));
        worker.cancel_reservation(4, "sick").await.unwrap();
        let requests = worker.transport().requests.lock().unwrap();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].path, "http://api.test/snapfit/reservation/4/cancel");
    }

    #[tokio::test]
    async fn logout_posts_to_logout_endpoint() {
        let worker = worker(ScriptedTransport::default().reply(204, ""));
        worker.logout().await.unwrap();
        let requests = worker.transport().requests.lock().unwrap();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].path, "http://api.test/snapfit/logout");
    }

    #[tokio::test]
    async fn logout_with_expired_session_is_unauthorized() {
        let worker = worker(ScriptedTransport::default().reply(401, ""));
        let err = worker.logout().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn worker_acts_as_image_slot_provider() {
        let transport = ScriptedTransport::default()
            .reply(200, &image_paths_body(&["a", "b"]))
            .reply(200, &image_paths_body(&["c", "d"]));
        let worker = worker(transport);

        let slots = SlotAllocator::new(&worker).allocate(3, "png", 8).await.unwrap();
        let names: Vec<&str> = slots.iter().map(|s| s.file_path.as_str()).collect();
        assert_eq!(names, vec!["/images/a.png", "/images/b.png", "/images/c.png"]);
        assert_eq!(
            worker.transport().paths(),
            vec![
                "http://api.test/snapfit/image/paths?ext=png",
                "http://api.test/snapfit/image/paths?ext=png"
            ]
        );
    }

    #[tokio::test]
    async fn http_error_from_provider_aborts_allocation() {
        let transport = ScriptedTransport::default()
            .reply(200, &image_paths_body(&["a"]))
            .reply(500, "boom");
        let worker = worker(transport);

        let err: ApiError = SlotAllocator::new(&worker)
            .allocate(3, "png", 8)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
        assert_eq!(worker.transport().paths().len(), 2);
    }
}
