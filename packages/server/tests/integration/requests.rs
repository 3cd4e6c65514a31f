use serde_json::json;

use crate::common::{TestApp, model_pair, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn new_request_starts_pending() {
        let app = TestApp::spawn().await;
        let (user_id, token) = app.register_user("Alice", "alice@example.com").await;

        let res = app
            .post_with_token(
                routes::REQUESTS,
                &json!({
                    "title": "  Lounge chair ",
                    "description": "Walnut",
                    "specifications": "80x75x90 cm",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "Lounge chair");
        assert_eq!(res.body["status"], "Pending");
        assert_eq!(res.body["userId"], user_id);
        assert!(res.body["modelId"].is_null());
        assert!(res.body["additionalNotes"].is_null());
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, token) = app.register_user("Alice", "alice@example.com").await;

        let res = app
            .post_with_token(
                routes::REQUESTS,
                &json!({"title": " ", "description": "d", "specifications": "s"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REQUESTS,
                &json!({"title": "t", "description": "d", "specifications": "s"}),
            )
            .await;

        assert_eq!(res.status, 401);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn users_see_only_their_own_requests_newest_first() {
        let app = TestApp::spawn().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;
        let (_, bob) = app.register_user("Bob", "bob@example.com").await;

        let first = app.create_request(&alice, "First").await;
        let second = app.create_request(&alice, "Second").await;
        app.create_request(&bob, "Bob's").await;

        let res = app.get_with_token(routes::REQUESTS, &alice).await;

        assert_eq!(res.status, 200);
        let ids: Vec<i64> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![second as i64, first as i64]);
    }

    #[tokio::test]
    async fn admin_listing_includes_owner_details() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (alice_id, alice) = app.register_user("Alice", "alice@example.com").await;
        app.create_request(&alice, "Chair").await;

        let res = app.get_with_token(routes::ALL_REQUESTS, &admin).await;

        assert_eq!(res.status, 200);
        let all = res.body.as_array().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["user"]["id"], alice_id);
        assert_eq!(all[0]["user"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn non_admin_cannot_list_everything() {
        let app = TestApp::spawn().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;

        let res = app.get_with_token(routes::ALL_REQUESTS, &alice).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn completed_requests_carry_their_model() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;
        let request_id = app.create_request(&alice, "Chair").await;

        let upload = app.upload_model(request_id, model_pair(), &admin).await;
        assert_eq!(upload.status, 201, "{}", upload.text);

        let res = app.get_with_token(routes::REQUESTS, &alice).await;
        let listed = &res.body.as_array().unwrap()[0];
        assert_eq!(listed["status"], "Completed");
        assert_eq!(listed["model"]["id"], upload.body["model"]["id"]);
        assert_eq!(listed["modelId"], upload.body["model"]["id"]);
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn owner_and_admin_can_read_a_request() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;
        let id = app.create_request(&alice, "Chair").await;

        let own = app.get_with_token(&routes::request(id), &alice).await;
        assert_eq!(own.status, 200);
        assert_eq!(own.body["title"], "Chair");

        let as_admin = app.get_with_token(&routes::request(id), &admin).await;
        assert_eq!(as_admin.status, 200);
    }

    #[tokio::test]
    async fn other_users_are_refused() {
        let app = TestApp::spawn().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;
        let (_, bob) = app.register_user("Bob", "bob@example.com").await;
        let id = app.create_request(&alice, "Chair").await;

        let res = app.get_with_token(&routes::request(id), &bob).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;

        let res = app.get_with_token(&routes::request(999), &alice).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "REQUEST_NOT_FOUND");
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn admin_can_move_request_in_progress() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;
        let id = app.create_request(&alice, "Chair").await;

        let res = app
            .put_with_token(
                &routes::request_status(id),
                &json!({"status": "In Progress"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "In Progress");
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;
        let id = app.create_request(&alice, "Chair").await;

        let res = app
            .put_with_token(
                &routes::request_status(id),
                &json!({"status": "Shipped"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn owner_cannot_change_status() {
        let app = TestApp::spawn().await;
        let (_, alice) = app.register_user("Alice", "alice@example.com").await;
        let id = app.create_request(&alice, "Chair").await;

        let res = app
            .put_with_token(
                &routes::request_status(id),
                &json!({"status": "Completed"}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 403);
    }
}
