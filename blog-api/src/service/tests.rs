use super::*;
use crate::session::DefaultTokenSession;
use crate::storage::{tests::JPEG_MAGIC, FsImageStore};
use crate::store::testing;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{
    cookie::Key,
    http::{header, StatusCode},
    test, App,
};
use blog_commons::data_structures::{
    CommentFormData, ErrorResponse, LikeToggle, Page, PostData, PostDetail, PostFormData,
    ProfilePageData, UserData,
};
use std::sync::Arc;

struct State {
    db: web::Data<DbConnection>,
    token_session: web::Data<Mutex<dyn TokenSession>>,
    images: web::Data<dyn ImageStore>,
    _media: tempfile::TempDir,
}

async fn state() -> State {
    let db = web::Data::new(DbConnection::new(testing::setup_db().await));
    let token_session: Arc<Mutex<dyn TokenSession>> =
        Arc::new(Mutex::new(DefaultTokenSession::new(Some(600))));
    let media = tempfile::tempdir().unwrap();
    let images: Arc<dyn ImageStore> = Arc::new(FsImageStore::new(media.path()));
    State {
        db,
        token_session: web::Data::from(token_session),
        images: web::Data::from(images),
        _media: media,
    }
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .configure(configure_services)
                .app_data($state.db.clone())
                .app_data($state.token_session.clone())
                .app_data($state.images.clone())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                ),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $username:expr) => {{
        let req = test::TestRequest::post()
            .uri("/user/login")
            .set_json(LoginData {
                username: $username.to_owned(),
                password: testing::PASSWORD.to_owned(),
            })
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        resp.response()
            .cookies()
            .find(|c| c.name() == "id")
            .expect("session cookie")
            .into_owned()
    }};
}

fn hello_form() -> PostFormData {
    PostFormData {
        title: "Hello".to_owned(),
        description: None,
        content: Some("World".to_owned()),
    }
}

#[actix_web::test]
async fn signup_login_post_and_toggle_like() {
    let state = state().await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/user/signup")
        .set_json(testing::registration("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let alice: UserData = test::read_body_json(resp).await;
    assert_eq!(alice.username, "alice");

    let cookie = login!(app, "alice");

    let req = test::TestRequest::post()
        .uri("/posts/create")
        .cookie(cookie.clone())
        .set_json(hello_form())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: PostData = test::read_body_json(resp).await;

    let like_uri = format!("/posts/{}/like", post.post_id);
    let req = test::TestRequest::get()
        .uri(&like_uri)
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "Only POST requests are allowed");

    for expected in [
        LikeToggle {
            liked: true,
            total_likes: 1,
        },
        LikeToggle {
            liked: false,
            total_likes: 0,
        },
    ] {
        let req = test::TestRequest::post()
            .uri(&like_uri)
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let toggled: LikeToggle = test::read_body_json(resp).await;
        assert_eq!(toggled, expected);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.post_id))
        .cookie(cookie)
        .to_request();
    let detail: PostDetail = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail.is_liked, Some(false));
    assert_eq!(detail.post.total_likes, 0);
}

#[actix_web::test]
async fn failed_like_is_a_server_error_with_its_cause() {
    let state = state().await;
    let alice = testing::create_user(&state.db.db_connection, "alice").await;
    let post = testing::create_post(&state.db.db_connection, &alice, "Hello").await;
    let app = test_app!(state);
    let cookie = login!(app, "alice");

    testing::freeze_likes(&state.db.db_connection).await;
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/like", post.post_id))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(body.error.contains("likes are frozen"), "{}", body.error);
    testing::thaw_likes(&state.db.db_connection).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.post_id))
        .cookie(cookie)
        .to_request();
    let detail: PostDetail = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail.post.total_likes, 0);
    assert_eq!(detail.is_liked, Some(false));
}

#[actix_web::test]
async fn anonymous_requests_are_rejected_where_auth_is_required() {
    let state = state().await;
    let alice = testing::create_user(&state.db.db_connection, "alice").await;
    let post = testing::create_post(&state.db.db_connection, &alice, "Hello").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/like", post.post_id))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
    let req = test::TestRequest::post()
        .uri("/posts/create")
        .set_json(hello_form())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
    let req = test::TestRequest::get().uri("/dashboard").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}", post.post_id))
        .to_request();
    let detail: PostDetail = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail.is_liked, None);
}

#[actix_web::test]
async fn non_owner_edits_look_like_missing_posts() {
    let state = state().await;
    let alice = testing::create_user(&state.db.db_connection, "alice").await;
    testing::create_user(&state.db.db_connection, "mallory").await;
    let post = testing::create_post(&state.db.db_connection, &alice, "Hello").await;
    let app = test_app!(state);
    let mallory = login!(app, "mallory");

    for (method, path) in [
        ("GET", "update"),
        ("POST", "update"),
        ("GET", "delete"),
        ("POST", "delete"),
    ] {
        let uri = format!("/posts/{}/{}", post.post_id, path);
        let req = match method {
            "GET" => test::TestRequest::get().uri(&uri),
            _ => test::TestRequest::post().uri(&uri).set_json(hello_form()),
        };
        let req = req.cookie(mallory.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {path}");
    }

    let alice_cookie = login!(app, "alice");
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete", post.post_id))
        .cookie(alice_cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );
}

#[actix_web::test]
async fn comment_redirects_back_to_the_post() {
    let state = state().await;
    let alice = testing::create_user(&state.db.db_connection, "alice").await;
    let post = testing::create_post(&state.db.db_connection, &alice, "Hello").await;
    let app = test_app!(state);
    let cookie = login!(app, "alice");

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.post_id))
        .cookie(cookie.clone())
        .set_json(CommentFormData {
            content: "First!".to_owned(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert_eq!(location, format!("/posts/{}", post.post_id));

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment", post.post_id))
        .cookie(cookie)
        .set_json(CommentFormData {
            content: String::new(),
        })
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::get().uri(location).to_request();
    let detail: PostDetail = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].content, "First!");
}

#[actix_web::test]
async fn search_listing_and_stats() {
    let state = state().await;
    let alice = testing::create_user(&state.db.db_connection, "alice").await;
    testing::create_post(&state.db.db_connection, &alice, "Learning Rust").await;
    testing::create_post(&state.db.db_connection, &alice, "Baking").await;
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/posts?q=RUST").to_request();
    let page: Page<PostData> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Learning Rust");

    let req = test::TestRequest::get().uri("/posts?q=").to_request();
    let page: Page<PostData> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.total, 2);

    let req = test::TestRequest::get().uri("/posts?page=9").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get().uri("/").to_request();
    let stats: blog_commons::data_structures::SiteStats =
        test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.num_posts, 2);
    assert_eq!(stats.num_authors, 1);
}

#[actix_web::test]
async fn profile_picture_round_trip() {
    let state = state().await;
    testing::create_user(&state.db.db_connection, "alice").await;
    let app = test_app!(state);
    let cookie = login!(app, "alice");

    let req = test::TestRequest::post()
        .uri("/profile/picture")
        .cookie(cookie.clone())
        .set_payload(b"not an image".to_vec())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::post()
        .uri("/profile/picture")
        .cookie(cookie.clone())
        .insert_header((header::CONTENT_TYPE, "image/jpeg"))
        .set_payload(JPEG_MAGIC.to_vec())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/profile")
        .cookie(cookie)
        .to_request();
    let page: ProfilePageData = test::call_and_read_body_json(&app, req).await;
    let profile = page.profile.expect("upload provisions the profile");
    assert!(profile.has_picture);

    let req = test::TestRequest::get()
        .uri(&format!("/authors/{}/picture", profile.profile_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], JPEG_MAGIC);
}

#[actix_web::test]
async fn logout_and_account_deletion_end_the_session() {
    let state = state().await;
    let alice = testing::create_user(&state.db.db_connection, "alice").await;
    testing::create_post(&state.db.db_connection, &alice, "Hello").await;
    let app = test_app!(state);

    let cookie = login!(app, "alice");
    let req = test::TestRequest::post()
        .uri("/user/logout")
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let cookie = login!(app, "alice");
    let req = test::TestRequest::post()
        .uri("/user/delete")
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );
    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get().uri("/").to_request();
    let stats: blog_commons::data_structures::SiteStats =
        test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.num_posts, 0);
    assert_eq!(stats.num_authors, 0);

    let req = test::TestRequest::post()
        .uri("/user/login")
        .set_json(LoginData {
            username: "alice".to_owned(),
            password: testing::PASSWORD.to_owned(),
        })
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );
}
