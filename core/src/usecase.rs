//! Use cases of the marketplace app, one async handler per screen action.
//!
//! # Design
//! `Interactor` is the entry point the host UI talks to. Each handler takes
//! a small request value, drives the [`Worker`], and returns a view model
//! or an [`ApiError`] the host can feed to
//! [`present_failure`](crate::presenter::present_failure).
//!
//! The only handler with logic of its own is [`Interactor::get_images`]:
//! it collects upload paths through a [`SlotAllocator`], pairs them with the
//! host's images in order, and uploads each pair through the host's
//! [`ImageUploader`].

use async_trait::async_trait;
use tracing::info;

use crate::allocator::SlotAllocator;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpTransport;
use crate::presenter::{
    DeleteReservationViewModel, ImageUrlViewModel, PostDetailViewModel, ProductListViewModel,
    ReservationListViewModel, ReservationResultViewModel, ReservationViewModel, UserViewModel,
};
use crate::types::{FileInfo, Location, ProductPostRequest, ReservationRequest, UserCounts, Vibe};
use crate::worker::Worker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibesRequest {
    pub vibes: String,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MakerProductsRequest {
    pub maker_id: i64,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReservationRequest {
    pub reservation_id: i64,
    pub message: String,
}

/// Local images waiting for upload, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlRequest<I> {
    pub images: Vec<I>,
}

/// Uploads one local image to one server-issued destination.
#[async_trait]
pub trait ImageUploader<I: Sync>: Send + Sync {
    async fn upload(&self, slot: &FileInfo, image: &I) -> Result<(), ApiError>;
}

/// Request handlers for every screen of the app.
#[derive(Debug)]
pub struct Interactor<T> {
    worker: Worker<T>,
    config: ClientConfig,
}

impl<T: HttpTransport> Interactor<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            worker: Worker::new(config.client(), transport),
            config,
        }
    }

    pub fn worker(&self) -> &Worker<T> {
        &self.worker
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// First page sized by the configured page size.
    pub fn first_page(&self) -> PageRequest {
        PageRequest {
            limit: self.config.page_size,
            offset: 0,
        }
    }

    // -- browsing ---------------------------------------------------------

    pub async fn fetch_product_all(&self, request: PageRequest) -> Result<ProductListViewModel, ApiError> {
        let page = self.worker.fetch_products(request.limit, request.offset).await?;
        Ok(page.into())
    }

    pub async fn fetch_products_with_filter(
        &self,
        request: &VibesRequest,
    ) -> Result<ProductListViewModel, ApiError> {
        let page = self
            .worker
            .fetch_products_by_vibes(&request.vibes, request.page.limit, request.page.offset)
            .await?;
        Ok(page.into())
    }

    pub async fn fetch_post_detail(&self, post_id: i64) -> Result<PostDetailViewModel, ApiError> {
        Ok(self.worker.fetch_post_detail(post_id).await?.into())
    }

    pub async fn fetch_products_for_maker(
        &self,
        request: MakerProductsRequest,
    ) -> Result<ProductListViewModel, ApiError> {
        let page = self
            .worker
            .fetch_products_for_maker(request.maker_id, request.page.limit, request.page.offset)
            .await?;
        Ok(page.into())
    }

    pub async fn fetch_vibes(&self) -> Result<Vec<Vibe>, ApiError> {
        self.worker.fetch_vibes().await
    }

    pub async fn fetch_locations(&self) -> Result<Vec<Location>, ApiError> {
        self.worker.fetch_locations().await
    }

    // -- reservations -----------------------------------------------------

    pub async fn make_reservation(
        &self,
        request: &ReservationRequest,
    ) -> Result<ReservationResultViewModel, ApiError> {
        let details = self.worker.make_reservation(request).await?;
        info!(reservation_id = details.id, post_id = request.post_id, "reservation created");
        Ok(ReservationResultViewModel {
            reservation_success: true,
            reservation: details.into(),
        })
    }

    pub async fn fetch_user_reservations(
        &self,
        request: PageRequest,
    ) -> Result<ReservationListViewModel, ApiError> {
        let page = self
            .worker
            .fetch_user_reservations(request.limit, request.offset)
            .await?;
        Ok(page.into())
    }

    pub async fn fetch_reservation_detail(
        &self,
        reservation_id: i64,
    ) -> Result<ReservationViewModel, ApiError> {
        Ok(self.worker.fetch_reservation_detail(reservation_id).await?.into())
    }

    pub async fn delete_reservation(
        &self,
        request: &DeleteReservationRequest,
    ) -> Result<DeleteReservationViewModel, ApiError> {
        self.worker
            .cancel_reservation(request.reservation_id, &request.message)
            .await?;
        info!(reservation_id = request.reservation_id, "reservation cancelled");
        Ok(DeleteReservationViewModel {
            delete_reservation_success: true,
        })
    }

    // -- likes ------------------------------------------------------------

    pub async fn like_post(&self, post_id: i64) -> Result<(), ApiError> {
        self.worker.like_post(post_id).await
    }

    pub async fn unlike_post(&self, post_id: i64) -> Result<(), ApiError> {
        self.worker.unlike_post(post_id).await
    }

    pub async fn fetch_user_likes(&self, request: PageRequest) -> Result<ProductListViewModel, ApiError> {
        let page = self.worker.fetch_user_likes(request.limit, request.offset).await?;
        Ok(page.into())
    }

    // -- my page ----------------------------------------------------------

    pub async fn fetch_user_details(&self) -> Result<UserViewModel, ApiError> {
        Ok(self.worker.fetch_user_details().await?.into())
    }

    /// Like and reservation counters, requested concurrently. Either failure
    /// fails the whole call.
    pub async fn fetch_counts(&self) -> Result<UserCounts, ApiError> {
        let (like_count, reservation_count) = futures::try_join!(
            self.worker.fetch_like_count(),
            self.worker.fetch_reservation_count()
        )?;
        Ok(UserCounts {
            like_count,
            reservation_count,
        })
    }

    pub async fn cancel_membership(&self) -> Result<(), ApiError> {
        self.worker.delete_account().await?;
        info!("account deleted");
        Ok(())
    }

    /// End the SnapFit server session. Runs regardless of how the host's
    /// social-login sign-out went; only the server outcome is reported.
    pub async fn service_logout(&self) -> Result<(), ApiError> {
        self.worker.logout().await?;
        info!("logged out");
        Ok(())
    }

    // -- maker ------------------------------------------------------------

    pub async fn fetch_maker_posts(
        &self,
        request: MakerProductsRequest,
    ) -> Result<ProductListViewModel, ApiError> {
        let page = self
            .worker
            .fetch_maker_posts(request.maker_id, request.page.limit, request.page.offset)
            .await?;
        Ok(page.into())
    }

    pub async fn post_product(&self, request: &ProductPostRequest) -> Result<PostDetailViewModel, ApiError> {
        let detail = self.worker.post_product(request).await?;
        info!(post_id = detail.id, "product posted");
        Ok(detail.into())
    }

    pub async fn fetch_maker_reservations(
        &self,
        request: PageRequest,
    ) -> Result<ReservationListViewModel, ApiError> {
        let page = self
            .worker
            .fetch_maker_reservations(request.limit, request.offset)
            .await?;
        Ok(page.into())
    }

    /// Upload `request.images` and return their server paths in the same
    /// order.
    ///
    /// Upload destinations are collected with the configured extension and
    /// retry budget. A shortage surfaces as `ApiError::InsufficientSlots`;
    /// any failing call or upload aborts the whole batch.
    pub async fn get_images<I, U>(
        &self,
        request: &ImageUrlRequest<I>,
        uploader: &U,
    ) -> Result<ImageUrlViewModel, ApiError>
    where
        I: Sync,
        U: ImageUploader<I> + ?Sized,
    {
        let wanted = request.images.len();
        let slots = SlotAllocator::new(&self.worker)
            .allocate(wanted, &self.config.image_extension, self.config.image_max_retries)
            .await?;
        debug_assert_eq!(slots.len(), wanted);

        let mut images = Vec::with_capacity(wanted);
        for (slot, image) in slots.iter().zip(&request.images) {
            uploader.upload(slot, image).await?;
            images.push(slot.file_path.clone());
        }
        info!(count = images.len(), "images uploaded");
        Ok(ImageUrlViewModel { images })
    }
}
