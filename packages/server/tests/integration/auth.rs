use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod registration {
    use super::*;

    fn body(email: &str, username: &str, password: &str) -> serde_json::Value {
        json!({
            "email": email,
            "username": username,
            "first_name": "Alice",
            "last_name": "Liddell",
            "password": password,
        })
    }

    #[tokio::test]
    async fn new_user_can_register_with_valid_details() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::USERS, &body("alice@example.com", "alice", PASSWORD))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["email"], "alice@example.com");
        assert!(res.body.get("password").is_none());
        assert!(res.body.get("is_subscribed").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_or_username_is_a_conflict() {
        let app = TestApp::spawn().await;
        app.register("alice").await;

        let same_email = app
            .post_without_token(routes::USERS, &body("alice@example.com", "other", PASSWORD))
            .await;
        assert_eq!(same_email.status, 409);
        assert_eq!(same_email.body["code"], "CONFLICT");

        let same_username = app
            .post_without_token(routes::USERS, &body("other@example.com", "alice", PASSWORD))
            .await;
        assert_eq!(same_username.status, 409);
    }

    #[tokio::test]
    async fn rejects_invalid_fields() {
        let app = TestApp::spawn().await;

        for bad in [
            body("not-an-email", "alice", PASSWORD),
            body("alice@example.com", "no spaces!", PASSWORD),
            body("alice@example.com", "me", PASSWORD),
            body("alice@example.com", "alice", "short"),
        ] {
            let res = app.post_without_token(routes::USERS, &bad).await;
            assert_eq!(res.status, 400, "accepted {bad}");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::USERS, &json!({"email": "a@b.com"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn registered_user_receives_a_token() {
        let app = TestApp::spawn().await;
        app.register("alice").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["auth_token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_email_is_rejected() {
        let app = TestApp::spawn().await;
        app.register("alice").await;

        let wrong_password = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "not-the-password"}),
            )
            .await;
        assert_eq!(wrong_password.status, 401);
        assert_eq!(wrong_password.body["code"], "INVALID_CREDENTIALS");

        let unknown = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "nobody@example.com", "password": PASSWORD}),
            )
            .await;
        assert_eq!(unknown.status, 401);
        assert_eq!(unknown.body["code"], "INVALID_CREDENTIALS");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn protected_endpoint_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_even_on_public_endpoints() {
        let app = TestApp::spawn().await;

        let me = app.get_with_token(routes::ME, "garbage").await;
        assert_eq!(me.status, 401);
        assert_eq!(me.body["code"], "TOKEN_INVALID");

        let recipes = app.get_with_token(routes::RECIPES, "garbage").await;
        assert_eq!(recipes.status, 401);
        assert_eq!(recipes.body["code"], "TOKEN_INVALID");
    }
}
