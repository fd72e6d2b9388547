use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod profiles {
    use super::*;

    #[tokio::test]
    async fn me_returns_the_current_user() {
        let app = TestApp::spawn().await;
        let (id, token) = app.create_authenticated_user("alice").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["is_subscribed"], false);
    }

    #[tokio::test]
    async fn anyone_can_view_a_profile() {
        let app = TestApp::spawn().await;
        let id = app.register("alice").await;

        let res = app.get_without_token(&routes::user(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["is_subscribed"], false);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::user(9999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn is_subscribed_reflects_the_caller() {
        let app = TestApp::spawn().await;
        let author = app.register("author").await;
        let (_, reader) = app.create_authenticated_user("reader").await;

        let res = app
            .post_with_token(&routes::subscribe(author), &json!({}), &reader)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let as_reader = app.get_with_token(&routes::user(author), &reader).await;
        assert_eq!(as_reader.body["is_subscribed"], true);

        let anonymous = app.get_without_token(&routes::user(author)).await;
        assert_eq!(anonymous.body["is_subscribed"], false);
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn users_are_paginated() {
        let app = TestApp::spawn().await;
        for name in ["u1", "u2", "u3"] {
            app.register(name).await;
        }

        let res = app
            .get_without_token(&format!("{}?page=2&limit=2", routes::USERS))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["data"][0]["username"], "u3");
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
    }
}

mod set_password {
    use super::*;

    #[tokio::test]
    async fn password_can_be_changed() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(
                routes::SET_PASSWORD,
                &json!({"current_password": PASSWORD, "new_password": "brand-new-pass"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let old = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": PASSWORD}),
            )
            .await;
        assert_eq!(old.status, 401);

        let new = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "brand-new-pass"}),
            )
            .await;
        assert_eq!(new.status, 200);
    }

    #[tokio::test]
    async fn wrong_current_password_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(
                routes::SET_PASSWORD,
                &json!({"current_password": "wrong-password", "new_password": "brand-new-pass"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
