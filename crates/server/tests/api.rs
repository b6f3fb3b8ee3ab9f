use actix_web::App;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::middleware::from_fn;
use actix_web::test;
use agora_auth::CredentialStore;
use agora_auth::Member;
use agora_auth::Role;
use agora_core::ACCESS_COOKIE;
use agora_core::ID;
use agora_core::REFRESH_COOKIE;
use agora_core::Unique;
use agora_server::Config;
use agora_server::State;
use agora_server::context;
use agora_server::gate;
use clap::Parser;
use serde_json::Value;
use serde_json::json;
use std::sync::Arc;

const ORIGIN: &str = "http://forum.test";
const PASSWORD: &str = "correct horse";

macro_rules! app {
    ($state:expr) => {{
        let state = $state.clone();
        test::init_service(
            App::new()
                .wrap(from_fn(gate))
                .wrap(from_fn(context))
                .configure(move |cfg| state.configure(cfg)),
        )
        .await
    }};
}

fn config() -> Config {
    Config::try_parse_from([
        "backend",
        "--db-url",
        "postgres://unused",
        "--secret",
        "integration-secret",
        "--base-url",
        "http://forum.test/",
        "--secure-cookies",
        "false",
    ])
    .unwrap()
    .validate()
    .unwrap()
}

struct Fixture {
    state: State,
    alice: Member,
    devon: Member,
}

async fn fixture() -> Fixture {
    let users = Arc::new(agora_auth::Memory::default());
    let board = Arc::new(agora_forum::Memory::default());
    let hashword = agora_auth::password::hash(PASSWORD).unwrap();
    let alice = Member::new(ID::default(), "Alice".into(), "alice".into(), Role::Member);
    let devon = Member::new(ID::default(), "Devon".into(), "devon".into(), Role::Developer);
    users.create(&alice, &hashword).await.unwrap();
    users.create(&devon, &hashword).await.unwrap();
    let state = State::new(users.clone(), users, board, &config());
    Fixture {
        state,
        alice,
        devon,
    }
}

async fn access(f: &Fixture, member: &Member) -> String {
    f.state.sessions().issue(member.id()).await.unwrap().access
}

fn set_cookies<B>(res: &actix_web::dev::ServiceResponse<B>) -> Vec<(String, String)> {
    res.response()
        .cookies()
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect()
}

#[actix_web::test]
async fn login_sets_both_cookies() {
    let f = fixture().await;
    let app = app!(f.state);
    let req = test::TestRequest::post()
        .uri("/rpc/user/login")
        .insert_header((header::ORIGIN, ORIGIN))
        .set_json(json!({ "username": "alice", "password": PASSWORD }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let names = set_cookies(&res).into_iter().map(|(n, _)| n).collect::<Vec<_>>();
    assert!(names.contains(&ACCESS_COOKIE.to_string()));
    assert!(names.contains(&REFRESH_COOKIE.to_string()));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"]["username"], "alice");
}

#[actix_web::test]
async fn failed_logins_look_alike() {
    let f = fixture().await;
    let app = app!(f.state);
    let mut bodies = Vec::new();
    for (username, password) in [("alice", "wrong password"), ("nobody", PASSWORD)] {
        let req = test::TestRequest::post()
            .uri("/rpc/user/login")
            .insert_header((header::ORIGIN, ORIGIN))
            .set_json(json!({ "username": username, "password": password }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&res).is_empty());
        bodies.push(test::read_body_json::<Value, _>(res).await);
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[actix_web::test]
async fn cross_origin_mutations_are_refused() {
    let f = fixture().await;
    let app = app!(f.state);
    for origin in [None, Some("http://evil.test")] {
        let mut req = test::TestRequest::post()
            .uri("/rpc/user/login")
            .set_json(json!({ "username": "alice", "password": PASSWORD }));
        if let Some(origin) = origin {
            req = req.insert_header((header::ORIGIN, origin));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
    let req = test::TestRequest::get().uri("/rpc/user/me").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn guards_separate_401_from_403() {
    let f = fixture().await;
    let app = app!(f.state);
    let req = test::TestRequest::get()
        .uri("/rpc/notification/getUserNotifications")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "UNAUTHENTICATED");

    let target = uuid::Uuid::now_v7();
    let uri = format!("/rpc/report/getReportMessage?postId={}", target);
    let member = access(&f, &f.alice).await;
    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(Cookie::new(ACCESS_COOKIE, member))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let developer = access(&f, &f.devon).await;
    let req = test::TestRequest::get()
        .uri(&uri)
        .cookie(Cookie::new(ACCESS_COOKIE, developer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], json!([]));
}

#[actix_web::test]
async fn refresh_cookie_rotates_once() {
    let f = fixture().await;
    let app = app!(f.state);
    let pair = f.state.sessions().issue(f.alice.id()).await.unwrap();
    let req = test::TestRequest::get()
        .uri("/rpc/user/me")
        .cookie(Cookie::new(REFRESH_COOKIE, pair.refresh.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    let rotated = set_cookies(&res);
    assert!(rotated.iter().any(|(n, v)| n == ACCESS_COOKIE && !v.is_empty()));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["username"], "alice");

    let req = test::TestRequest::get()
        .uri("/rpc/user/me")
        .cookie(Cookie::new(REFRESH_COOKIE, pair.refresh))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], Value::Null);
}

#[actix_web::test]
async fn logout_revokes_the_session() {
    let f = fixture().await;
    let app = app!(f.state);
    let token = access(&f, &f.alice).await;
    let req = test::TestRequest::post()
        .uri("/rpc/user/logout")
        .insert_header((header::ORIGIN, ORIGIN))
        .cookie(Cookie::new(ACCESS_COOKIE, token.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(set_cookies(&res).iter().all(|(_, v)| v.is_empty()));
    let req = test::TestRequest::get()
        .uri("/rpc/user/me")
        .cookie(Cookie::new(ACCESS_COOKIE, token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], Value::Null);
}

#[actix_web::test]
async fn pages_redirect_by_identity() {
    let f = fixture().await;
    let app = app!(f.state);
    let req = test::TestRequest::get().uri("/discussion").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");

    let token = access(&f, &f.alice).await;
    let req = test::TestRequest::get()
        .uri("/login")
        .cookie(Cookie::new(ACCESS_COOKIE, token.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/discussion");

    let req = test::TestRequest::get()
        .uri("/manage-post")
        .cookie(Cookie::new(ACCESS_COOKIE, token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/discussion");
}

#[actix_web::test]
async fn posts_flow_through_the_guards() {
    let f = fixture().await;
    let app = app!(f.state);
    let alice = access(&f, &f.alice).await;
    let devon = access(&f, &f.devon).await;
    let req = test::TestRequest::post()
        .uri("/rpc/post/createPost")
        .insert_header((header::ORIGIN, ORIGIN))
        .cookie(Cookie::new(ACCESS_COOKIE, alice.clone()))
        .set_json(json!({ "content": "hello @devon", "tags": ["intro"], "isAnonymous": true }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["user"], Value::Null);
    assert_eq!(body["data"]["anonymous"]["username"], "@0x0");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/rpc/notification/getUserNotificationCounts")
        .cookie(Cookie::new(ACCESS_COOKIE, devon.clone()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"], 1);

    let req = test::TestRequest::post()
        .uri("/rpc/post/deletePost")
        .insert_header((header::ORIGIN, ORIGIN))
        .cookie(Cookie::new(ACCESS_COOKIE, devon))
        .set_json(json!({ "postId": id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/rpc/post/getPublicPostDiscussions")
        .cookie(Cookie::new(ACCESS_COOKIE, alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn malformed_bodies_are_400() {
    let f = fixture().await;
    let app = app!(f.state);
    let req = test::TestRequest::post()
        .uri("/rpc/user/login")
        .insert_header((header::ORIGIN, ORIGIN))
        .set_json(json!({ "username": "alice" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "BAD_REQUEST");
}

macro_rules! call {
    ($app:expr, $req:expr, $token:expr) => {{
        let req = $req
            .insert_header((header::ORIGIN, ORIGIN))
            .cookie(Cookie::new(ACCESS_COOKIE, $token.clone()))
            .to_request();
        test::call_service(&$app, req).await
    }};
}

#[actix_web::test]
async fn post_detail_is_open_to_visitors() {
    let f = fixture().await;
    let app = app!(f.state);
    let alice = access(&f, &f.alice).await;
    let create = test::TestRequest::post()
        .uri("/rpc/post/createPost")
        .set_json(json!({ "content": "for everyone", "tags": ["intro"] }));
    let body: Value = test::read_body_json(call!(app, create, alice)).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/rpc/post/getPostDetail?id={}", id))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["content"], "for everyone");
    assert_eq!(body["data"]["user"]["username"], "alice");
}

#[actix_web::test]
async fn only_the_author_edits_a_post() {
    let f = fixture().await;
    let app = app!(f.state);
    let alice = access(&f, &f.alice).await;
    let devon = access(&f, &f.devon).await;
    let create = test::TestRequest::post()
        .uri("/rpc/post/createPost")
        .set_json(json!({ "content": "first draft", "tags": ["intro"] }));
    let body: Value = test::read_body_json(call!(app, create, alice)).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let change = json!({ "postId": id, "content": "second draft", "tags": ["meta"] });

    let edit = test::TestRequest::post().uri("/rpc/post/editPost").set_json(&change);
    let res = call!(app, edit, devon);
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["kind"], "FORBIDDEN");

    let edit = test::TestRequest::post().uri("/rpc/post/editPost").set_json(&change);
    let res = call!(app, edit, alice);
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["content"], "second draft");
    assert_eq!(body["data"]["tags"], json!(["meta"]));
}

#[actix_web::test]
async fn comments_notify_the_post_author() {
    let f = fixture().await;
    let app = app!(f.state);
    let alice = access(&f, &f.alice).await;
    let devon = access(&f, &f.devon).await;
    let create = test::TestRequest::post()
        .uri("/rpc/post/createPost")
        .set_json(json!({ "content": "ask me anything" }));
    let body: Value = test::read_body_json(call!(app, create, alice)).await;
    let post = body["data"]["id"].as_str().unwrap().to_string();

    let comment = test::TestRequest::post()
        .uri("/rpc/comment/createComment")
        .set_json(json!({ "postId": post, "text": "why rust?" }));
    let res = call!(app, comment, devon);
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    let comment = body["data"]["id"].as_str().unwrap().to_string();

    let reply = test::TestRequest::post()
        .uri("/rpc/comment/replyComment")
        .set_json(json!({ "commentId": comment, "text": "the borrow checker" }));
    assert_eq!(call!(app, reply, alice).status(), StatusCode::CREATED);

    let list = test::TestRequest::get().uri(&format!("/rpc/comment/getPostComments?postId={}", post));
    let body: Value = test::read_body_json(call!(app, list, alice)).await;
    assert_eq!(body["data"]["comments"][0]["text"], "why rust?");
    assert_eq!(body["data"]["comments"][0]["replies"], 1);
    assert_eq!(body["data"]["hasNextPage"], false);

    let counts = test::TestRequest::get().uri("/rpc/notification/getUserNotificationCounts");
    let body: Value = test::read_body_json(call!(app, counts, alice)).await;
    assert_eq!(body["data"], 1);
    let counts = test::TestRequest::get().uri("/rpc/notification/getUserNotificationCounts");
    let body: Value = test::read_body_json(call!(app, counts, devon)).await;
    assert_eq!(body["data"], 1);

    let delete = test::TestRequest::post()
        .uri("/rpc/comment/deleteComment")
        .set_json(json!({ "commentId": comment }));
    assert_eq!(call!(app, delete, alice).status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn groups_admit_invited_members() {
    let f = fixture().await;
    let app = app!(f.state);
    let alice = access(&f, &f.alice).await;
    let devon = access(&f, &f.devon).await;
    let found = test::TestRequest::post().uri("/rpc/group/createGroup").set_json(json!({
        "name": "Rustaceans",
        "description": "crabs only",
        "invitedUsername": ["devon"],
    }));
    let res = call!(app, found, alice);
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    let group = body["data"]["id"].as_str().unwrap().to_string();

    let posts = format!("/rpc/group/getAllGroupPosts?groupId={}", group);
    let list = test::TestRequest::get().uri(&posts);
    assert_eq!(call!(app, list, devon).status(), StatusCode::FORBIDDEN);

    let pending = test::TestRequest::get().uri("/rpc/group/getAvailableInvitation");
    let body: Value = test::read_body_json(call!(app, pending, devon)).await;
    assert_eq!(body["data"][0]["name"], "Rustaceans");

    let accept = test::TestRequest::post()
        .uri("/rpc/group/acceptInvitation")
        .set_json(json!({ "groupId": group }));
    let body: Value = test::read_body_json(call!(app, accept, devon)).await;
    assert_eq!(body["data"]["members"], 2);
    assert_eq!(body["data"]["alreadyMember"], true);

    let write = test::TestRequest::post()
        .uri("/rpc/group/createNewPostGroup")
        .set_json(json!({ "groupId": group, "content": "members only", "tags": ["club"] }));
    assert_eq!(call!(app, write, devon).status(), StatusCode::CREATED);
    let list = test::TestRequest::get().uri(&posts);
    let body: Value = test::read_body_json(call!(app, list, alice)).await;
    assert_eq!(body["data"][0]["content"], "members only");

    let public = test::TestRequest::get().uri("/rpc/post/getPublicPostDiscussions");
    let body: Value = test::read_body_json(call!(app, public, alice)).await;
    assert_eq!(body["data"], json!([]));
}
