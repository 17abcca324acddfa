//! HTTP tests for `/v1/posts/`

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use blog_service::config::PaginationConfig;
use blog_service::db::PostRepository;
use blog_service::middleware::FORBIDDEN_MESSAGE;
use common::{bearer, Fixture};
use serde_json::{json, Value};

#[actix_web::test]
async fn anonymous_can_read_but_not_write() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    let post = fx.post(&leo, "Happy families are all alike").await;
    let app = test_app!(fx.state());

    let req = test::TestRequest::get().uri("/v1/posts/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["author"], "leo");
    assert_eq!(body[0]["group"], Value::Null);

    let req = test::TestRequest::get()
        .uri(&format!("/v1/posts/{}/", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/v1/posts/")
        .set_json(json!({ "text": "anonymous" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("www-authenticate"));

    let req = test::TestRequest::delete()
        .uri(&format!("/v1/posts/{}/", post.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(fx.store.count_posts().await.unwrap(), 1);
}

#[actix_web::test]
async fn create_post_sets_author_from_token() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    let anna = fx.user("anna").await;
    let group = fx.group("novels").await;
    let app = test_app!(fx.state());

    let req = test::TestRequest::post()
        .uri("/v1/posts/")
        .insert_header(bearer(&leo))
        .set_json(json!({ "text": "Chapter one", "author": anna.username, "group": group.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["author"], "leo");
    assert_eq!(body["text"], "Chapter one");
    assert_eq!(body["group"], group.id);
    assert_eq!(body["image"], Value::Null);
    assert!(body["pub_date"].is_string());
    assert!(body.get("author_id").is_none());
}

#[actix_web::test]
async fn create_post_validates_fields() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    let app = test_app!(fx.state());

    let req = test::TestRequest::post()
        .uri("/v1/posts/")
        .insert_header(bearer(&leo))
        .set_json(json!({ "group": 42 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fields"]["text"][0], "This field is required.");
    assert_eq!(
        body["fields"]["group"][0],
        "Invalid pk \"42\" - object does not exist."
    );

    let req = test::TestRequest::post()
        .uri("/v1/posts/")
        .insert_header(bearer(&leo))
        .set_json(json!({ "text": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fx.store.count_posts().await.unwrap(), 0);
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    let app = test_app!(fx.state());

    let req = test::TestRequest::post()
        .uri("/v1/posts/")
        .insert_header(bearer(&leo))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"text\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("JSON parse error"));
}

#[actix_web::test]
async fn only_author_may_change_post() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    let anna = fx.user("anna").await;
    let post = fx.post(&leo, "original").await;
    let app = test_app!(fx.state());
    let uri = format!("/v1/posts/{}/", post.id);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&anna))
        .set_json(json!({ "text": "hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], FORBIDDEN_MESSAGE);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&anna))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let stored = fx.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
}

#[actix_web::test]
async fn put_requires_text_and_patch_is_partial() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    let group = fx.group("novels").await;
    let post = fx.post(&leo, "draft").await;
    let app = test_app!(fx.state());
    let uri = format!("/v1/posts/{}/", post.id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&leo))
        .set_json(json!({ "group": group.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&leo))
        .set_json(json!({ "group": group.id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["text"], "draft");
    assert_eq!(body["group"], group.id);

    // Explicit null detaches the group
    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&leo))
        .set_json(json!({ "group": null }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["group"], Value::Null);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&leo))
        .set_json(json!({ "text": "final" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["text"], "final");
    assert_eq!(body["author"], "leo");
}

#[actix_web::test]
async fn author_deletes_post() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    let post = fx.post(&leo, "short-lived").await;
    let app = test_app!(fx.state());
    let uri = format!("/v1/posts/{}/", post.id);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&leo))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn missing_post_is_404_before_permission() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let app = test_app!(fx.state());

    let req = test::TestRequest::patch()
        .uri("/v1/posts/999/")
        .insert_header(bearer(&anna))
        .set_json(json!({ "text": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Not found.");
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn limit_offset_pagination() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    for n in 1..=5 {
        fx.post(&leo, &format!("post {n}")).await;
    }
    let app = test_app!(fx.state());

    let req = test::TestRequest::get()
        .uri("/v1/posts/?limit=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 5);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["text"], "post 1");
    assert!(body["next"]
        .as_str()
        .unwrap()
        .ends_with("/v1/posts/?limit=2&offset=2"));
    assert_eq!(body["previous"], Value::Null);

    let req = test::TestRequest::get()
        .uri("/v1/posts/?limit=2&offset=4")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["text"], "post 5");
    assert_eq!(body["next"], Value::Null);
    assert!(body["previous"]
        .as_str()
        .unwrap()
        .ends_with("/v1/posts/?limit=2&offset=2"));

    // A bad limit without a configured default disables pagination
    let req = test::TestRequest::get()
        .uri("/v1/posts/?limit=zero")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[actix_web::test]
async fn configured_default_and_max_limit() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    for n in 1..=4 {
        fx.post(&leo, &format!("post {n}")).await;
    }
    let app = test_app!(fx.state_with(PaginationConfig {
        default_limit: Some(3),
        max_limit: Some(2),
    }));

    let req = test::TestRequest::get().uri("/v1/posts/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 4);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri("/v1/posts/?limit=100&offset=-1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["results"][0]["text"], "post 1");
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn unsupported_method_and_unknown_path() {
    let fx = Fixture::new();
    let app = test_app!(fx.state());

    let req = test::TestRequest::delete().uri("/v1/posts/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let req = test::TestRequest::get().uri("/v1/posts/abc/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn maximal_limit_is_served() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    for n in 1..=3 {
        fx.post(&leo, &format!("post {n}")).await;
    }
    let app = test_app!(fx.state());

    let req = test::TestRequest::get()
        .uri("/v1/posts/?limit=9223372036854775807&offset=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["next"], Value::Null);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["text"], "post 2");
}

#[actix_web::test]
async fn null_text_is_not_missing_text() {
    let fx = Fixture::new();
    let leo = fx.user("leo").await;
    let post = fx.post(&leo, "draft").await;
    let app = test_app!(fx.state());

    let req = test::TestRequest::post()
        .uri("/v1/posts/")
        .insert_header(bearer(&leo))
        .set_json(json!({ "text": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fields"]["text"][0], "This field may not be null.");

    let req = test::TestRequest::post()
        .uri(&format!("/v1/posts/{}/comments/", post.id))
        .insert_header(bearer(&leo))
        .set_json(json!({ "text": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fields"]["text"][0], "This field may not be null.");

    // PATCH with null text leaves the post untouched
    let req = test::TestRequest::patch()
        .uri(&format!("/v1/posts/{}/", post.id))
        .insert_header(bearer(&leo))
        .set_json(json!({ "text": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let stored = fx.store.find_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "draft");
}
