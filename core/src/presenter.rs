//! View models and the conversions that produce them.
//!
//! # Design
//! Presenters are plain `From` conversions from server payloads into
//! view-ready shapes: prices are formatted, tag lists are joined, and pages
//! report where the next one starts. Errors go through [`present_failure`],
//! which is the only place user-facing failure text is produced.

use crate::error::ApiError;
use crate::types::{
    PostDetail, PriceOption, ProductPage, ProductSummary, ReservationDetails, ReservationPage,
    ReservationSummary, UserDetails,
};

const TAG_SEPARATOR: &str = " · ";

/// Format whole won with thousands separators, e.g. `30,000원`.
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    if amount < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('원');
    grouped
}

fn next_offset(offset: u32, limit: u32, received: usize) -> Option<u32> {
    let received = u32::try_from(received).ok()?;
    (limit > 0 && received >= limit).then(|| offset.saturating_add(received))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: i64,
    pub title: String,
    pub maker_name: String,
    pub thumbnail: Option<String>,
    pub price_label: String,
    pub vibes_label: String,
    pub locations_label: String,
    pub studio: bool,
    pub liked: bool,
}

impl From<ProductSummary> for ProductCard {
    fn from(product: ProductSummary) -> Self {
        Self {
            id: product.id,
            price_label: format_won(product.price),
            vibes_label: product.vibes.join(TAG_SEPARATOR),
            locations_label: product.locations.join(TAG_SEPARATOR),
            title: product.title,
            maker_name: product.maker.nickname,
            thumbnail: product.thumbnail,
            studio: product.studio,
            liked: product.like,
        }
    }
}

/// A page of product cards. `next_offset` is `None` once a short page shows
/// the listing is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListViewModel {
    pub products: Vec<ProductCard>,
    pub next_offset: Option<u32>,
}

impl From<ProductPage> for ProductListViewModel {
    fn from(page: ProductPage) -> Self {
        let next_offset = next_offset(page.offset, page.limit, page.data.len());
        Self {
            products: page.data.into_iter().map(ProductCard::from).collect(),
            next_offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRow {
    pub minutes_label: String,
    pub price_label: String,
}

impl From<PriceOption> for PriceRow {
    fn from(option: PriceOption) -> Self {
        Self {
            minutes_label: format!("{}분", option.min),
            price_label: format_won(option.price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetailViewModel {
    pub id: i64,
    pub title: String,
    pub maker_id: i64,
    pub maker_name: String,
    pub description: String,
    pub images: Vec<String>,
    pub vibes_label: String,
    pub locations_label: String,
    /// Cheapest price option, shown as "from" price.
    pub starting_price_label: Option<String>,
    pub price_rows: Vec<PriceRow>,
    pub person_price_label: Option<String>,
    pub studio: bool,
    pub liked: bool,
}

impl From<PostDetail> for PostDetailViewModel {
    fn from(detail: PostDetail) -> Self {
        let starting_price_label = detail.prices.iter().map(|p| p.price).min().map(format_won);
        Self {
            id: detail.id,
            maker_id: detail.maker.id,
            maker_name: detail.maker.nickname,
            vibes_label: detail.vibes.join(TAG_SEPARATOR),
            locations_label: detail.locations.join(TAG_SEPARATOR),
            starting_price_label,
            price_rows: detail.prices.into_iter().map(PriceRow::from).collect(),
            person_price_label: detail.person_price.map(format_won),
            title: detail.title,
            description: detail.description,
            images: detail.images,
            studio: detail.studio,
            liked: detail.like,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRow {
    pub id: i64,
    pub title: String,
    pub thumbnail: Option<String>,
    pub reservation_time: String,
    pub is_cancelled: bool,
}

impl From<ReservationSummary> for ReservationRow {
    fn from(summary: ReservationSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.post.title,
            thumbnail: summary.post.thumbnail,
            reservation_time: summary.reservation_time,
            is_cancelled: summary.cancel_message.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationListViewModel {
    pub reservations: Vec<ReservationRow>,
    pub next_offset: Option<u32>,
}

impl From<ReservationPage> for ReservationListViewModel {
    fn from(page: ReservationPage) -> Self {
        let next_offset = next_offset(page.offset, page.limit, page.data.len());
        Self {
            reservations: page.data.into_iter().map(ReservationRow::from).collect(),
            next_offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationViewModel {
    pub id: i64,
    pub post_id: i64,
    pub title: String,
    pub email: String,
    pub phone_number: String,
    pub location: String,
    pub reservation_time: String,
    pub minutes_label: String,
    pub price_label: String,
    pub person: u32,
    pub person_price_label: String,
    pub created_at: String,
    pub is_cancelled: bool,
    pub cancel_message: Option<String>,
}

impl From<ReservationDetails> for ReservationViewModel {
    fn from(details: ReservationDetails) -> Self {
        Self {
            id: details.id,
            post_id: details.post.id,
            title: details.post.title,
            email: details.email,
            phone_number: details.phone_number,
            location: details.reservation_location,
            reservation_time: details.reservation_time,
            minutes_label: format!("{}분", details.minutes),
            price_label: format_won(details.price),
            person: details.person,
            person_price_label: format_won(details.person_price),
            created_at: details.created_at,
            is_cancelled: details.cancel_message.is_some(),
            cancel_message: details.cancel_message,
        }
    }
}

/// Outcome of booking a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationResultViewModel {
    pub reservation_success: bool,
    pub reservation: ReservationViewModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReservationViewModel {
    pub delete_reservation_success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserViewModel {
    pub id: i64,
    pub nickname: String,
    pub profile_image: Option<String>,
    pub vibes_label: String,
    pub is_maker: bool,
}

impl From<UserDetails> for UserViewModel {
    fn from(user: UserDetails) -> Self {
        let vibes: Vec<&str> = user.vibes.iter().map(|v| v.name.as_str()).collect();
        Self {
            vibes_label: vibes.join(TAG_SEPARATOR),
            id: user.id,
            nickname: user.nickname,
            profile_image: user.profile_image,
            is_maker: user.maker,
        }
    }
}

/// Uploaded image paths in the order the images were supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlViewModel {
    pub images: Vec<String>,
}

/// What the display surface shows when a use case fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureViewModel {
    pub title: String,
    pub message: String,
    pub retryable: bool,
}

pub fn present_failure(error: &ApiError) -> FailureViewModel {
    let (title, message) = match error {
        ApiError::NotFound => ("찾을 수 없음", "요청한 정보를 찾을 수 없습니다."),
        ApiError::Unauthorized => ("로그인 필요", "다시 로그인해 주세요."),
        ApiError::Transport(_) => ("네트워크 오류", "네트워크 연결을 확인해 주세요."),
        ApiError::InsufficientSlots { .. } => {
            ("이미지 업로드 실패", "이미지를 업로드하지 못했습니다. 잠시 후 다시 시도해 주세요.")
        }
        ApiError::HttpError { status, .. } if *status >= 500 => {
            ("서버 오류", "잠시 후 다시 시도해 주세요.")
        }
        _ => ("요청 실패", "요청을 처리하지 못했습니다."),
    };
    FailureViewModel {
        title: title.to_string(),
        message: message.to_string(),
        retryable: error.is_retryable(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MakerSummary;

    fn product(id: i64, price: i64) -> ProductSummary {
        ProductSummary {
            id,
            maker: MakerSummary {
                id: 2,
                nickname: "sunny".to_string(),
            },
            title: format!("product {id}"),
            thumbnail: None,
            vibes: vec!["calm".to_string(), "warm".to_string()],
            locations: vec!["Seoul".to_string()],
            price,
            studio: false,
            like: false,
        }
    }

    #[test]
    fn won_formatting_groups_thousands() {
        assert_eq!(format_won(0), "0원");
        assert_eq!(format_won(900), "900원");
        assert_eq!(format_won(30000), "30,000원");
        assert_eq!(format_won(1234567), "1,234,567원");
        assert_eq!(format_won(-1500), "-1,500원");
    }

    #[test]
    fn full_page_points_at_next_offset() {
        let page = ProductPage {
            offset: 10,
            limit: 2,
            data: vec![product(1, 30000), product(2, 45000)],
        };
        let view = ProductListViewModel::from(page);
        assert_eq!(view.next_offset, Some(12));
        assert_eq!(view.products[0].price_label, "30,000원");
        assert_eq!(view.products[0].vibes_label, "calm · warm");
        assert_eq!(view.products[1].maker_name, "sunny");
    }

    #[test]
    fn short_page_is_the_last_one() {
        let page = ProductPage {
            offset: 0,
            limit: 10,
            data: vec![product(1, 30000)],
        };
        assert_eq!(ProductListViewModel::from(page).next_offset, None);
    }

    #[test]
    fn detail_shows_cheapest_price_first() {
        let detail = PostDetail {
            id: 1,
            maker: MakerSummary {
                id: 2,
                nickname: "sunny".to_string(),
            },
            created_at: "2024-08-15".to_string(),
            title: "Snap".to_string(),
            description: "Outdoor".to_string(),
            vibes: vec![],
            locations: vec![],
            images: vec!["/images/a.png".to_string()],
            prices: vec![
                PriceOption { min: 60, price: 50000 },
                PriceOption { min: 30, price: 30000 },
            ],
            person_price: Some(10000),
            studio: true,
            like: false,
        };
        let view = PostDetailViewModel::from(detail);
        assert_eq!(view.starting_price_label.as_deref(), Some("30,000원"));
        assert_eq!(view.price_rows[0].minutes_label, "60분");
        assert_eq!(view.person_price_label.as_deref(), Some("10,000원"));
    }

    #[test]
    fn cancelled_reservation_is_flagged() {
        let row = ReservationRow::from(ReservationSummary {
            id: 3,
            post: product(1, 30000),
            reservation_time: "2024-08-20T10:00:00".to_string(),
            cancel_message: Some("rain".to_string()),
        });
        assert!(row.is_cancelled);
        assert_eq!(row.title, "product 1");
    }

    #[test]
    fn slot_shortage_reads_as_upload_failure() {
        let view = present_failure(&ApiError::InsufficientSlots {
            requested: 5,
            obtained: 3,
        });
        assert_eq!(view.title, "이미지 업로드 실패");
        assert!(view.retryable);
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let view = present_failure(&ApiError::HttpError {
            status: 400,
            body: String::new(),
        });
        assert_eq!(view.title, "요청 실패");
        assert!(!view.retryable);
        assert_eq!(present_failure(&ApiError::Unauthorized).title, "로그인 필요");
    }
}
