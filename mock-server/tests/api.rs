use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{
    app, app_with, Count, ImagePaths, Location, MockConfig, Page, PostDetail, ProductSummary,
    ReservationDetails, ReservationSummary, UserDetails, Vibe,
};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

/// Send one request through a router that keeps its state between calls.
async fn send(app: &mut Router, request: Request<String>) -> axum::response::Response {
    ServiceExt::<Request<String>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap()
}

const NEW_POST: &str = r#"{
    "title":"Seoul forest snap",
    "description":"Outdoor portraits",
    "vibes":[1,3],
    "locations":[1],
    "thumbnail":"/images/thumb.png",
    "images":["/images/a.png"],
    "prices":[{"min":60,"price":50000},{"min":30,"price":30000}],
    "personPrice":10000
}"#;

fn reservation_body(post_id: i64) -> String {
    format!(
        r#"{{"postId":{post_id},"minutes":30,"price":30000,"email":"a@b.c","phoneNumber":"010-1234-5678","reservationLocation":"서울","reservationTime":"2024-08-20T10:00:00","person":2,"personPrice":10000}}"#
    )
}

// --- catalogues ---

#[tokio::test]
async fn vibes_and_locations_are_seeded() {
    let resp = app().oneshot(empty_request("GET", "/snapfit/vibes")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let vibes: Vec<Vibe> = body_json(resp).await;
    assert_eq!(vibes.len(), 5);
    assert_eq!(vibes[0].id, 1);

    let resp = app()
        .oneshot(empty_request("GET", "/snapfit/locations"))
        .await
        .unwrap();
    let locations: Vec<Location> = body_json(resp).await;
    assert!(locations.iter().any(|l| l.admin_name == "서울"));
}

// --- posts ---

#[tokio::test]
async fn list_posts_empty() {
    let resp = app()
        .oneshot(empty_request("GET", "/snapfit/posts?limit=10&offset=0"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Page<ProductSummary> = body_json(resp).await;
    assert!(page.data.is_empty());
    assert_eq!(page.limit, 10);
}

#[tokio::test]
async fn get_post_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/snapfit/post/42"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_post_bad_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/snapfit/post/not-a-number"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_post_with_unknown_vibe_returns_400() {
    let body = NEW_POST.replace("[1,3]", "[99]");
    let resp = app()
        .oneshot(json_request("POST", "/snapfit/post", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_post_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/snapfit/post", r#"{"title":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn like_missing_post_returns_404() {
    let resp = app()
        .oneshot(empty_request("POST", "/snapfit/post/5/like"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- image paths ---

#[tokio::test]
async fn image_paths_hand_out_a_fixed_batch() {
    let app = app_with(MockConfig {
        image_batch_size: 2,
    });
    let resp = app
        .oneshot(empty_request("GET", "/snapfit/image/paths?ext=png"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let paths: ImagePaths = body_json(resp).await;
    assert_eq!(paths.file_infos.len(), 2);
    assert!(paths.file_infos.iter().all(|f| f.file_path.ends_with(".png")));
    assert_ne!(paths.file_infos[0].file_path, paths.file_infos[1].file_path);
}

#[tokio::test]
async fn image_paths_require_extension() {
    let resp = app()
        .oneshot(empty_request("GET", "/snapfit/image/paths"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- reservations ---

#[tokio::test]
async fn reservation_for_missing_post_returns_404() {
    let resp = app()
        .oneshot(json_request("POST", "/snapfit/reservation", &reservation_body(7)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_missing_reservation_returns_404() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/snapfit/reservation/3/cancel",
            r#"{"message":"nope"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- session ---

#[tokio::test]
async fn logout_ends_the_session() {
    let mut app = app();
    let resp = send(&mut app, empty_request("POST", "/snapfit/logout")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&mut app, empty_request("GET", "/snapfit/user")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = send(&mut app, empty_request("DELETE", "/snapfit/user")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // a second logout is still accepted
    let resp = send(&mut app, empty_request("POST", "/snapfit/logout")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// --- full marketplace lifecycle ---

#[tokio::test]
async fn marketplace_lifecycle() {
    let mut app = app();

    // maker publishes a post
    let resp = send(&mut app, json_request("POST", "/snapfit/post", NEW_POST)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: PostDetail = body_json(resp).await;
    assert_eq!(created.vibes, vec!["러블리", "따뜻한"]);
    assert_eq!(created.images[0], "/images/thumb.png");
    let post_id = created.id;

    // listing shows the cheapest price
    let resp = send(&mut app, empty_request("GET", "/snapfit/posts")).await;
    let page: Page<ProductSummary> = body_json(resp).await;
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].price, 30000);
    assert!(!page.data[0].like);

    // vibe filter
    let resp = send(&mut app, empty_request("GET", "/snapfit/posts/vibes?vibes=%EC%8B%9C%ED%81%AC")).await;
    let page: Page<ProductSummary> = body_json(resp).await;
    assert!(page.data.is_empty());

    // like, then it shows up in likes and the detail flag
    let resp = send(&mut app, empty_request("POST", &format!("/snapfit/post/{post_id}/like"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&mut app, empty_request("GET", "/snapfit/posts/like")).await;
    let page: Page<ProductSummary> = body_json(resp).await;
    assert_eq!(page.data[0].id, post_id);
    let resp = send(&mut app, empty_request("GET", &format!("/snapfit/post/{post_id}"))).await;
    let detail: PostDetail = body_json(resp).await;
    assert!(detail.like);

    // book it
    let resp = send(
        &mut app,
        json_request("POST", "/snapfit/reservation", &reservation_body(post_id)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let reservation: ReservationDetails = body_json(resp).await;
    assert_eq!(reservation.post.id, post_id);
    let reservation_id = reservation.id;

    let resp = send(&mut app, empty_request("GET", "/snapfit/user/count/reservation")).await;
    let count: Count = body_json(resp).await;
    assert_eq!(count.count, 1);

    // the maker sees it too
    let resp = send(&mut app, empty_request("GET", "/snapfit/maker/reservations")).await;
    let page: Page<ReservationSummary> = body_json(resp).await;
    assert_eq!(page.data[0].id, reservation_id);

    // cancel twice: second time conflicts
    let cancel = format!("/snapfit/reservation/{reservation_id}/cancel");
    let resp = send(&mut app, json_request("POST", &cancel, r#"{"message":"rain"}"#)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
    let resp = send(&mut app, json_request("POST", &cancel, r#"{"message":"rain"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = send(&mut app, empty_request("GET", &format!("/snapfit/reservation/{reservation_id}"))).await;
    let reservation: ReservationDetails = body_json(resp).await;
    assert_eq!(reservation.cancel_message.as_deref(), Some("rain"));

    let resp = send(&mut app, empty_request("GET", "/snapfit/user/count/reservation")).await;
    let count: Count = body_json(resp).await;
    assert_eq!(count.count, 0);

    // unlike
    let resp = send(&mut app, empty_request("DELETE", &format!("/snapfit/post/{post_id}/like"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&mut app, empty_request("GET", "/snapfit/user/count/like")).await;
    let count: Count = body_json(resp).await;
    assert_eq!(count.count, 0);

    // account deletion locks the profile
    let resp = send(&mut app, empty_request("GET", "/snapfit/user")).await;
    let user: UserDetails = body_json(resp).await;
    assert!(user.maker);
    let resp = send(&mut app, empty_request("DELETE", "/snapfit/user")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&mut app, empty_request("GET", "/snapfit/user")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = send(&mut app, empty_request("POST", "/snapfit/logout")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
