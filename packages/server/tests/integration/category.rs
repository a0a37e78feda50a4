use serde_json::json;

use crate::common::{TestApp, routes};

mod category_auth {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::CATEGORIES).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::CATEGORIES, "not-a-jwt").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn missing_permission_is_forbidden() {
        let app = TestApp::spawn().await;
        let token = app.token_with("reader", &["post:manage"]);

        let res = app.get_with_token(routes::CATEGORIES, &token).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn cookie_token_is_accepted() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");

        let res = app.get_with_cookie(routes::CATEGORIES, &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
    }
}

mod category_crud {
    use super::*;

    #[tokio::test]
    async fn create_and_fetch() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");

        let res = app
            .post_with_token(
                routes::CATEGORIES,
                &json!({
                    "slug": "Grammar Tips",
                    "name": { "fa": "نکات دستوری", "de": "Grammatiktipps" },
                    "visibility": "registered",
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["slug"], "grammar-tips");
        assert_eq!(res.body["visibility"], "registered");
        assert_eq!(res.body["is_active"], true);
        assert_eq!(res.body["sort_order"], 0.0);

        let id = res.body["id"].as_i64().unwrap();
        let res = app.get_with_token(&routes::category(id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"]["de"], "Grammatiktipps");
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        app.create_category(&token, "news", None).await;

        let res = app
            .post_with_token(
                routes::CATEGORIES,
                &json!({ "slug": "news", "name": { "fa": "خبر", "de": "News" } }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let list = app.get_with_token(routes::CATEGORIES, &token).await;
        assert_eq!(list.body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_locale_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");

        let res = app
            .post_with_token(
                routes::CATEGORIES,
                &json!({ "slug": "half", "name": { "de": "Halb" } }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert!(res.body["message"].as_str().unwrap().contains("fa"));
    }

    #[tokio::test]
    async fn invalid_visibility_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");

        let res = app
            .post_with_token(
                routes::CATEGORIES,
                &json!({
                    "slug": "x",
                    "name": { "fa": "x", "de": "x" },
                    "visibility": "secret",
                }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn patch_updates_only_given_fields() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let parent = app.create_category(&token, "parent", None).await;
        let id = app.create_category(&token, "child", Some(parent)).await;

        let res = app
            .patch_with_token(
                &routes::category(id),
                &json!({ "is_active": false, "parent_id": null }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["is_active"], false);
        assert_eq!(res.body["parent_id"], serde_json::Value::Null);
        assert_eq!(res.body["slug"], "child");
    }

    #[tokio::test]
    async fn patch_into_own_subtree_is_a_cycle() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let a = app.create_category(&token, "a", None).await;
        let b = app.create_category(&token, "b", Some(a)).await;

        let res = app
            .patch_with_token(&routes::category(a), &json!({ "parent_id": b }), &token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CYCLE_DETECTED");
    }

    #[tokio::test]
    async fn delete_with_children_is_blocked() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let parent = app.create_category(&token, "parent", None).await;
        let child = app.create_category(&token, "child", Some(parent)).await;

        let res = app.delete_with_token(&routes::category(parent), &token).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "REFERENTIAL_INTEGRITY");

        let res = app.delete_with_token(&routes::category(child), &token).await;
        assert_eq!(res.status, 204);
        let res = app.delete_with_token(&routes::category(parent), &token).await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(&routes::category(parent), &token).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn delete_with_posts_is_blocked() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let id = app.create_category(&token, "news", None).await;
        let mut body = crate::common::post_body("tagged", "Tagged");
        body["category_ids"] = json!([id]);
        let res = app.post_with_token(routes::POSTS, &body, &token).await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app.delete_with_token(&routes::category(id), &token).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "REFERENTIAL_INTEGRITY");
    }
}

mod category_listing {
    use super::*;

    #[tokio::test]
    async fn tree_and_filters() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let root = app.create_category(&token, "root", None).await;
        app.create_category(&token, "leaf", Some(root)).await;
        app.create_category(&token, "other", None).await;

        let res = app
            .get_with_token(&format!("{}?tree=true", routes::CATEGORIES), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let roots = res.body["data"].as_array().unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0]["slug"], "root");
        assert_eq!(roots[0]["children"][0]["slug"], "leaf");

        let res = app
            .get_with_token(&format!("{}?parent=root", routes::CATEGORIES), &token)
            .await;
        let slugs: Vec<&str> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["root", "other"]);

        let res = app
            .get_with_token(&format!("{}?parent=abc", routes::CATEGORIES), &token)
            .await;
        assert_eq!(res.status, 400);
    }
}

mod category_placement {
    use super::*;

    #[tokio::test]
    async fn reorder_up_and_boundary_noop() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let a = app.create_category(&token, "a", None).await;
        let b = app.create_category(&token, "b", None).await;

        let res = app
            .post_with_token(&routes::category_reorder(a), &json!({ "direction": "up" }), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["sort_order"], 0.0);

        let res = app
            .post_with_token(&routes::category_reorder(b), &json!({ "direction": "up" }), &token)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["sort_order"], -1.0);

        let res = app
            .post_with_token(
                &routes::category_reorder(a),
                &json!({ "direction": "sideways" }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn move_inside_descendant_is_rejected_without_changes() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let a = app.create_category(&token, "a", None).await;
        let b = app.create_category(&token, "b", Some(a)).await;
        let c = app.create_category(&token, "c", Some(b)).await;
        let before = app.get_with_token(routes::CATEGORIES, &token).await.body;

        let res = app
            .post_with_token(
                routes::CATEGORIES_MOVE,
                &json!({ "dragged_id": a, "target_id": c, "position": "inside" }),
                &token,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CYCLE_DETECTED");

        let after = app.get_with_token(routes::CATEGORIES, &token).await.body;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn move_to_missing_target() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let a = app.create_category(&token, "a", None).await;

        let res = app
            .post_with_token(
                routes::CATEGORIES_MOVE,
                &json!({ "dragged_id": a, "target_id": 999, "position": "below" }),
                &token,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "REFERENTIAL_INTEGRITY");
    }

    #[tokio::test]
    async fn move_below_then_renumber() {
        let app = TestApp::spawn().await;
        let token = app.admin_token("admin");
        let a = app.create_category(&token, "a", None).await;
        let b = app.create_category(&token, "b", None).await;
        let c = app.create_category(&token, "c", None).await;

        let res = app
            .post_with_token(
                routes::CATEGORIES_MOVE,
                &json!({ "dragged_id": c, "target_id": a, "position": "below" }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["sort_order"], 0.5);

        let res = app
            .post_with_token(routes::CATEGORIES_RENUMBER, &json!({ "parent_id": null }), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let placed: Vec<(i64, f64)> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| (c["id"].as_i64().unwrap(), c["sort_order"].as_f64().unwrap()))
            .collect();
        assert_eq!(placed, vec![(a, 0.0), (c, 1.0), (b, 2.0)]);
    }
}
