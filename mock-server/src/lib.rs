use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// The user every request is served as.
pub const USER_ID: i64 = 1;
pub const USER_NICKNAME: &str = "snapfit-user";
pub const DEFAULT_IMAGE_BATCH_SIZE: usize = 3;
/// Bearer token the user endpoints treat as expired.
pub const EXPIRED_TOKEN: &str = "expired";
const DEFAULT_LIMIT: u32 = 10;

#[derive(Clone, Debug)]
pub struct MockConfig {
    /// Upload paths handed out per image-paths call, regardless of how many
    /// the client needs.
    pub image_batch_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            image_batch_size: DEFAULT_IMAGE_BATCH_SIZE,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vibe {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub admin_name: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceOption {
    pub min: u32,
    pub price: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Maker {
    pub id: i64,
    pub nickname: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub maker: Maker,
    pub title: String,
    pub thumbnail: Option<String>,
    pub vibes: Vec<String>,
    pub locations: Vec<String>,
    pub price: i64,
    pub studio: bool,
    pub like: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub id: i64,
    pub maker: Maker,
    pub created_at: String,
    pub title: String,
    pub description: String,
    pub vibes: Vec<String>,
    pub locations: Vec<String>,
    pub images: Vec<String>,
    pub prices: Vec<PriceOption>,
    pub person_price: Option<i64>,
    pub studio: bool,
    pub like: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub offset: u32,
    pub limit: u32,
    pub data: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    pub description: String,
    pub vibes: Vec<i64>,
    pub locations: Vec<i64>,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub prices: Vec<PriceOption>,
    pub person_price: Option<i64>,
    #[serde(default)]
    pub studio: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
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

#[derive(Deserialize)]
pub struct CancelReservation {
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    pub id: i64,
    pub post: ProductSummary,
    pub reservation_time: String,
    pub cancel_message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
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
    pub cancel_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub id: i64,
    pub nickname: String,
    pub profile_image: Option<String>,
    pub vibes: Vec<Vibe>,
    pub maker: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Count {
    pub count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub file_path: String,
    pub presigned_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePaths {
    pub file_infos: Vec<FileInfo>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakerQuery {
    pub user_id: i64,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Deserialize)]
pub struct VibesQuery {
    pub vibes: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Deserialize)]
pub struct ExtQuery {
    pub ext: String,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

struct Post {
    detail: PostDetail,
}

struct Reservation {
    details: ReservationDetails,
    post_id: i64,
}

#[derive(Default)]
struct Store {
    next_id: i64,
    posts: BTreeMap<i64, Post>,
    reservations: BTreeMap<i64, Reservation>,
    likes: BTreeSet<i64>,
    account_deleted: bool,
    logged_out: bool,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn summary(&self, detail: &PostDetail) -> ProductSummary {
        ProductSummary {
            id: detail.id,
            maker: detail.maker.clone(),
            title: detail.title.clone(),
            thumbnail: detail.images.first().cloned(),
            vibes: detail.vibes.clone(),
            locations: detail.locations.clone(),
            price: detail.prices.iter().map(|p| p.price).min().unwrap_or(0),
            studio: detail.studio,
            like: self.likes.contains(&detail.id),
        }
    }

    fn session_ended(&self) -> bool {
        self.account_deleted || self.logged_out
    }

    fn with_like(&self, detail: &PostDetail) -> PostDetail {
        PostDetail {
            like: self.likes.contains(&detail.id),
            ..detail.clone()
        }
    }
}

struct AppState {
    store: RwLock<Store>,
    vibes: Vec<Vibe>,
    locations: Vec<Location>,
    config: MockConfig,
}

type Db = Arc<AppState>;

fn catalog_vibes() -> Vec<Vibe> {
    ["러블리", "시크", "따뜻한", "청량한", "빈티지"]
        .iter()
        .zip(1..)
        .map(|(name, id)| Vibe {
            id,
            name: name.to_string(),
        })
        .collect()
}

fn catalog_locations() -> Vec<Location> {
    ["서울", "경기", "부산", "제주"]
        .iter()
        .zip(1..)
        .map(|(name, id)| Location {
            id,
            admin_name: name.to_string(),
        })
        .collect()
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state: Db = Arc::new(AppState {
        store: RwLock::new(Store::default()),
        vibes: catalog_vibes(),
        locations: catalog_locations(),
        config,
    });
    Router::new()
        .route("/snapfit/posts", get(list_posts))
        .route("/snapfit/posts/vibes", get(list_posts_by_vibes))
        .route("/snapfit/posts/maker", get(list_maker_posts))
        .route("/snapfit/posts/like", get(list_liked_posts))
        .route("/snapfit/post", post(create_post))
        .route("/snapfit/post/{id}", get(get_post))
        .route("/snapfit/post/{id}/like", post(like_post).delete(unlike_post))
        .route("/snapfit/vibes", get(list_vibes))
        .route("/snapfit/locations", get(list_locations))
        .route("/snapfit/reservation", post(create_reservation))
        .route("/snapfit/reservation/{id}", get(get_reservation))
        .route("/snapfit/reservation/{id}/cancel", post(cancel_reservation))
        .route("/snapfit/reservations/user", get(list_user_reservations))
        .route("/snapfit/maker/posts", get(list_maker_posts))
        .route("/snapfit/maker/reservations", get(list_maker_reservations))
        .route("/snapfit/image/paths", get(image_paths))
        .route("/snapfit/user", get(get_user).delete(delete_user))
        .route("/snapfit/user/count/like", get(like_count))
        .route("/snapfit/user/count/reservation", get(reservation_count))
        .route("/snapfit/logout", post(logout))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn paginate<T>(items: Vec<T>, limit: u32, offset: u32) -> Page<T> {
    let data = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Page {
        offset,
        limit,
        data,
    }
}

fn now() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default()
}

// --- posts ---

async fn list_posts(State(db): State<Db>, Query(q): Query<PageQuery>) -> Json<Page<ProductSummary>> {
    let store = db.store.read().await;
    let items = store.posts.values().map(|p| store.summary(&p.detail)).collect();
    Json(paginate(items, q.limit, q.offset))
}

async fn list_posts_by_vibes(
    State(db): State<Db>,
    Query(q): Query<VibesQuery>,
) -> Json<Page<ProductSummary>> {
    let wanted: Vec<&str> = q.vibes.split(',').map(str::trim).filter(|v| !v.is_empty()).collect();
    let store = db.store.read().await;
    let items = store
        .posts
        .values()
        .filter(|p| p.detail.vibes.iter().any(|v| wanted.contains(&v.as_str())))
        .map(|p| store.summary(&p.detail))
        .collect();
    Json(paginate(items, q.limit, q.offset))
}

async fn list_maker_posts(
    State(db): State<Db>,
    Query(q): Query<MakerQuery>,
) -> Json<Page<ProductSummary>> {
    let store = db.store.read().await;
    let items = store
        .posts
        .values()
        .filter(|p| p.detail.maker.id == q.user_id)
        .map(|p| store.summary(&p.detail))
        .collect();
    Json(paginate(items, q.limit, q.offset))
}

async fn list_liked_posts(
    State(db): State<Db>,
    Query(q): Query<PageQuery>,
) -> Json<Page<ProductSummary>> {
    let store = db.store.read().await;
    let items = store
        .likes
        .iter()
        .filter_map(|id| store.posts.get(id))
        .map(|p| store.summary(&p.detail))
        .collect();
    Json(paginate(items, q.limit, q.offset))
}

async fn get_post(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<PostDetail>, StatusCode> {
    let store = db.store.read().await;
    store
        .posts
        .get(&id)
        .map(|p| Json(store.with_like(&p.detail)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<CreatePost>,
) -> Result<(StatusCode, Json<PostDetail>), StatusCode> {
    let vibes = names_for(&input.vibes, &db.vibes, |v| (v.id, &v.name))?;
    let locations = names_for(&input.locations, &db.locations, |l| (l.id, &l.admin_name))?;
    if input.prices.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut store = db.store.write().await;
    let id = store.next_id();
    let mut images = vec![input.thumbnail];
    images.extend(input.images);
    let detail = PostDetail {
        id,
        maker: Maker {
            id: USER_ID,
            nickname: USER_NICKNAME.to_string(),
        },
        created_at: now(),
        title: input.title,
        description: input.description,
        vibes,
        locations,
        images,
        prices: input.prices,
        person_price: input.person_price,
        studio: input.studio,
        like: false,
    };
    store.posts.insert(
        id,
        Post {
            detail: detail.clone(),
        },
    );
    info!(post_id = id, "post created");
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Resolve catalogue ids to names; any unknown id rejects the request.
fn names_for<T>(ids: &[i64], catalog: &[T], key: impl Fn(&T) -> (i64, &String)) -> Result<Vec<String>, StatusCode> {
    ids.iter()
        .map(|id| {
            catalog
                .iter()
                .map(&key)
                .find(|(candidate, _)| candidate == id)
                .map(|(_, name)| name.clone())
                .ok_or(StatusCode::BAD_REQUEST)
        })
        .collect()
}

async fn like_post(State(db): State<Db>, Path(id): Path<i64>) -> StatusCode {
    let mut store = db.store.write().await;
    if !store.posts.contains_key(&id) {
        return StatusCode::NOT_FOUND;
    }
    store.likes.insert(id);
    StatusCode::NO_CONTENT
}

async fn unlike_post(State(db): State<Db>, Path(id): Path<i64>) -> StatusCode {
    let mut store = db.store.write().await;
    if !store.posts.contains_key(&id) {
        return StatusCode::NOT_FOUND;
    }
    store.likes.remove(&id);
    StatusCode::NO_CONTENT
}

async fn list_vibes(State(db): State<Db>) -> Json<Vec<Vibe>> {
    Json(db.vibes.clone())
}

async fn list_locations(State(db): State<Db>) -> Json<Vec<Location>> {
    Json(db.locations.clone())
}

// --- reservations ---

async fn create_reservation(
    State(db): State<Db>,
    Json(input): Json<CreateReservation>,
) -> Result<(StatusCode, Json<ReservationDetails>), StatusCode> {
    let mut store = db.store.write().await;
    let post = store
        .posts
        .get(&input.post_id)
        .map(|p| store.summary(&p.detail))
        .ok_or(StatusCode::NOT_FOUND)?;
    let id = store.next_id();
    let details = ReservationDetails {
        id,
        email: input.email,
        phone_number: input.phone_number,
        post,
        reservation_location: input.reservation_location,
        reservation_time: input.reservation_time,
        minutes: input.minutes,
        price: input.price,
        person: input.person,
        person_price: input.person_price,
        created_at: now(),
        cancel_message: None,
    };
    store.reservations.insert(
        id,
        Reservation {
            details: details.clone(),
            post_id: input.post_id,
        },
    );
    info!(reservation_id = id, post_id = input.post_id, "reservation created");
    Ok((StatusCode::CREATED, Json(details)))
}

async fn get_reservation(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<ReservationDetails>, StatusCode> {
    let store = db.store.read().await;
    store
        .reservations
        .get(&id)
        .map(|r| Json(r.details.clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn cancel_reservation(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<CancelReservation>,
) -> StatusCode {
    let mut store = db.store.write().await;
    match store.reservations.get_mut(&id) {
        None => StatusCode::NOT_FOUND,
        Some(r) if r.details.cancel_message.is_some() => StatusCode::CONFLICT,
        Some(r) => {
            r.details.cancel_message = Some(input.message);
            StatusCode::NO_CONTENT
        }
    }
}

fn reservation_page(store: &Store, filter: impl Fn(&Reservation) -> bool, q: PageQuery) -> Page<ReservationSummary> {
    let items = store
        .reservations
        .values()
        .filter(|&r| filter(r))
        .map(|r| ReservationSummary {
            id: r.details.id,
            post: r.details.post.clone(),
            reservation_time: r.details.reservation_time.clone(),
            cancel_message: r.details.cancel_message.clone(),
        })
        .collect();
    paginate(items, q.limit, q.offset)
}

async fn list_user_reservations(
    State(db): State<Db>,
    Query(q): Query<PageQuery>,
) -> Json<Page<ReservationSummary>> {
    let store = db.store.read().await;
    Json(reservation_page(&store, |_| true, q))
}

async fn list_maker_reservations(
    State(db): State<Db>,
    Query(q): Query<PageQuery>,
) -> Json<Page<ReservationSummary>> {
    let store = db.store.read().await;
    let owned = |r: &Reservation| {
        store
            .posts
            .get(&r.post_id)
            .is_some_and(|p| p.detail.maker.id == USER_ID)
    };
    Json(reservation_page(&store, owned, q))
}

// --- maker uploads ---

async fn image_paths(State(db): State<Db>, Query(q): Query<ExtQuery>) -> Json<ImagePaths> {
    let file_infos: Vec<FileInfo> = (0..db.config.image_batch_size)
        .map(|_| {
            let name = format!("{}.{}", Uuid::new_v4(), q.ext);
            FileInfo {
                file_path: format!("/images/{name}"),
                presigned_url: format!("https://upload.snapfit.test/images/{name}"),
            }
        })
        .collect();
    debug!(count = file_infos.len(), ext = %q.ext, "issued image paths");
    Json(ImagePaths { file_infos })
}

// --- user ---

fn bearer_expired(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == EXPIRED_TOKEN)
}

async fn get_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<UserDetails>, StatusCode> {
    let store = db.store.read().await;
    if store.session_ended() || bearer_expired(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(UserDetails {
        id: USER_ID,
        nickname: USER_NICKNAME.to_string(),
        profile_image: None,
        vibes: db.vibes.iter().take(2).cloned().collect(),
        maker: true,
    }))
}

async fn delete_user(State(db): State<Db>, headers: HeaderMap) -> StatusCode {
    let mut store = db.store.write().await;
    if store.session_ended() || bearer_expired(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    store.account_deleted = true;
    StatusCode::NO_CONTENT
}

/// Always succeeds, even for a session that already ended.
async fn logout(State(db): State<Db>) -> StatusCode {
    db.store.write().await.logged_out = true;
    info!("logged out");
    StatusCode::NO_CONTENT
}

async fn like_count(State(db): State<Db>) -> Json<Count> {
    let store = db.store.read().await;
    Json(Count {
        count: store.likes.len() as u64,
    })
}

async fn reservation_count(State(db): State<Db>) -> Json<Count> {
    let store = db.store.read().await;
    let count = store
        .reservations
        .values()
        .filter(|r| r.details.cancel_message.is_none())
        .count();
    Json(Count { count: count as u64 })
}
