use serde_json::json;

use crate::common::{TestApp, post_body, post_content, routes};

mod post_auth {
    use super::*;

    #[tokio::test]
    async fn create_requires_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::POSTS, &post_body("hello", "Hello"))
            .await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn category_editor_cannot_manage_posts() {
        let app = TestApp::spawn().await;
        let token = app.token_with("cat-editor", &["category:manage"]);

        let res = app
            .post_with_token(routes::POSTS, &post_body("hello", "Hello"), &token)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod post_crud {
    use super::*;

    #[tokio::test]
    async fn create_starts_as_draft() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");

        let res = app
            .post_with_token(routes::POSTS, &post_body("First Steps", "First"), &token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["slug"], "first-steps");
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["view_count"], 0);
        assert_eq!(res.body["created_by"], "editor");
        assert_eq!(res.body["publish_date"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn incomplete_content_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");

        let res = app
            .post_with_token(
                routes::POSTS,
                &json!({
                    "slug": "half",
                    "content": {
                        "fa": { "title": "عنوان", "summary": "", "body": "<p>x</p>" },
                        "de": { "title": "Titel", "summary": "Kurz", "body": "<p>x</p>" },
                    },
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["message"].as_str().unwrap().contains("fa"));
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");
        app.create_post(&token, "taken").await;

        let res = app
            .post_with_token(routes::POSTS, &post_body("taken", "Again"), &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");

        let mut body = post_body("orphan", "Orphan");
        body["category_ids"] = json!([404]);
        let res = app.post_with_token(routes::POSTS, &body, &token).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "REFERENTIAL_INTEGRITY");
    }

    #[tokio::test]
    async fn publish_stamps_publish_date() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");
        let id = app.create_post(&token, "going-live").await;

        let res = app
            .patch_with_token(&routes::post(id), &json!({ "status": "published" }), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "published");
        assert!(res.body["publish_date"].is_string());
        assert_eq!(res.body["updated_by"], "editor");
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");
        let id = app.create_post(&token, "p").await;

        let res = app
            .patch_with_token(&routes::post(id), &json!({ "status": "live" }), &token)
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn soft_delete_hides_post() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");
        let id = app.create_post(&token, "bye").await;

        let res = app.delete_with_token(&routes::post(id), &token).await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(&routes::post(id), &token).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let res = app.delete_with_token(&routes::post(id), &token).await;
        assert_eq!(res.status, 404);

        let list = app.get_with_token(routes::POSTS, &token).await;
        assert_eq!(list.body["pagination"]["total"], 0);
    }
}

mod post_revisions {
    use super::*;

    #[tokio::test]
    async fn history_keeps_ten_newest() {
        let app = TestApp::spawn().await;
        let id = app.create_post(&app.admin_token("author"), "busy").await;

        for i in 0..15 {
            let token = app.admin_token(&format!("editor-{i}"));
            let res = app
                .patch_with_token(
                    &routes::post(id),
                    &json!({ "content": post_content(&format!("v{}", i + 1)) }),
                    &token,
                )
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        let token = app.admin_token("reader");
        let res = app.get_with_token(&routes::post_revisions(id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let revisions = res.body["data"].as_array().unwrap();
        assert_eq!(revisions.len(), 10);

        let authors: Vec<&str> = revisions
            .iter()
            .map(|r| r["modified_by"].as_str().unwrap())
            .collect();
        let expected: Vec<String> = (5..15).map(|i| format!("editor-{i}")).collect();
        assert_eq!(authors, expected);
        assert_eq!(revisions[9]["content"]["de"]["title"], "v15 de");
    }

    #[tokio::test]
    async fn slug_only_change_writes_no_revision() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");
        let id = app.create_post(&token, "old-slug").await;

        let res = app
            .patch_with_token(&routes::post(id), &json!({ "slug": "new-slug" }), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["slug"], "new-slug");

        let res = app.get_with_token(&routes::post_revisions(id), &token).await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 0);
    }
}

mod post_listing {
    use super::*;

    #[tokio::test]
    async fn paginates_and_filters() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");
        let news = app.create_category(&token, "news", None).await;

        for i in 0..5 {
            let mut body = post_body(&format!("post-{i}"), &format!("Post {i}"));
            if i % 2 == 0 {
                body["category_ids"] = json!([news]);
            }
            let res = app.post_with_token(routes::POSTS, &body, &token).await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app
            .get_with_token(
                &format!("{}?page=2&per_page=2&sort_order=asc", routes::POSTS),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 5);
        assert_eq!(res.body["pagination"]["total_pages"], 3);
        let slugs: Vec<&str> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["post-2", "post-3"]);

        let res = app
            .get_with_token(&format!("{}?category={news}", routes::POSTS), &token)
            .await;
        assert_eq!(res.body["pagination"]["total"], 3);

        let res = app
            .get_with_token(&format!("{}?search=POST%204", routes::POSTS), &token)
            .await;
        assert_eq!(res.body["pagination"]["total"], 1);
        assert_eq!(res.body["data"][0]["slug"], "post-4");
    }

    #[tokio::test]
    async fn rejects_unknown_sort() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("editor");

        let res = app
            .get_with_token(&format!("{}?sort_by=title", routes::POSTS), &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
