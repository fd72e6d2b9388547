use serde_json::json;

use crate::common::{Kitchen, TestApp, routes};

mod favorites {
    use super::*;

    #[tokio::test]
    async fn add_returns_the_short_view_and_marks_the_recipe() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let id = app
            .create_recipe(&token, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;

        let res = app
            .post_with_token(&routes::favorite(id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["name"], "Pancakes");
        assert_eq!(res.body["cooking_time"], 30);
        assert!(res.body["image"].as_str().is_some());
        assert!(res.body.get("ingredients").is_none());

        let view = app.get_with_token(&routes::recipe(id), &token).await;
        assert_eq!(view.body["is_favorited"], true);
    }

    #[tokio::test]
    async fn duplicate_add_and_absent_remove_are_errors() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let id = app
            .create_recipe(&token, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;

        let absent = app.delete_with_token(&routes::favorite(id), &token).await;
        assert_eq!(absent.status, 404);
        assert_eq!(absent.body["code"], "NOT_FOUND");

        let first = app
            .post_with_token(&routes::favorite(id), &json!({}), &token)
            .await;
        assert_eq!(first.status, 201);

        let second = app
            .post_with_token(&routes::favorite(id), &json!({}), &token)
            .await;
        assert_eq!(second.status, 400);
        assert_eq!(second.body["code"], "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn add_remove_add_ends_present() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let id = app
            .create_recipe(&token, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;

        let add = app.post_with_token(&routes::favorite(id), &json!({}), &token).await;
        assert_eq!(add.status, 201);
        let remove = app.delete_with_token(&routes::favorite(id), &token).await;
        assert_eq!(remove.status, 204);
        let again = app.post_with_token(&routes::favorite(id), &json!({}), &token).await;
        assert_eq!(again.status, 201);

        let view = app.get_with_token(&routes::recipe(id), &token).await;
        assert_eq!(view.body["is_favorited"], true);
    }

    #[tokio::test]
    async fn unknown_recipe_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(&routes::favorite(9999), &json!({}), &token)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn concurrent_duplicate_adds_leave_one_row() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let id = app
            .create_recipe(&token, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;

        let path = routes::favorite(id);
        let body = json!({});
        let (a, b) = tokio::join!(
            app.post_with_token(&path, &body, &token),
            app.post_with_token(&path, &body, &token),
        );

        let mut statuses = [a.status, b.status];
        statuses.sort_unstable();
        assert_eq!(statuses, [201, 400]);
        let loser = if a.status == 400 { a } else { b };
        assert_eq!(loser.body["code"], "ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;

        let res = app.post_without_token(&routes::favorite(1), &json!({})).await;

        assert_eq!(res.status, 401);
    }
}

mod shopping_cart {
    use super::*;

    #[tokio::test]
    async fn cart_toggle_follows_the_same_rules() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let id = app
            .create_recipe(&token, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;

        let add = app
            .post_with_token(&routes::shopping_cart(id), &json!({}), &token)
            .await;
        assert_eq!(add.status, 201);
        assert_eq!(add.body["id"], id);

        let duplicate = app
            .post_with_token(&routes::shopping_cart(id), &json!({}), &token)
            .await;
        assert_eq!(duplicate.status, 400);
        assert_eq!(duplicate.body["code"], "ALREADY_EXISTS");

        let view = app.get_with_token(&routes::recipe(id), &token).await;
        assert_eq!(view.body["is_in_shopping_cart"], true);
        assert_eq!(view.body["is_favorited"], false);

        let remove = app
            .delete_with_token(&routes::shopping_cart(id), &token)
            .await;
        assert_eq!(remove.status, 204);
        let absent = app
            .delete_with_token(&routes::shopping_cart(id), &token)
            .await;
        assert_eq!(absent.status, 404);
    }

    #[tokio::test]
    async fn carts_are_per_user() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, alice) = app.create_authenticated_user("alice").await;
        let (_, bob) = app.create_authenticated_user("bob").await;
        let id = app
            .create_recipe(&alice, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;

        app.post_with_token(&routes::shopping_cart(id), &json!({}), &alice)
            .await;

        let bob_view = app.get_with_token(&routes::recipe(id), &bob).await;
        assert_eq!(bob_view.body["is_in_shopping_cart"], false);
        let bob_remove = app
            .delete_with_token(&routes::shopping_cart(id), &bob)
            .await;
        assert_eq!(bob_remove.status, 404);
    }
}

mod follows {
    use super::*;

    #[tokio::test]
    async fn self_follow_is_always_rejected() {
        let app = TestApp::spawn().await;
        let (me, token) = app.create_authenticated_user("alice").await;

        for _ in 0..2 {
            let res = app
                .post_with_token(&routes::subscribe(me), &json!({}), &token)
                .await;
            assert_eq!(res.status, 400);
            assert_eq!(res.body["code"], "SELF_REFERENCE");
        }
    }

    #[tokio::test]
    async fn follow_toggle_rules() {
        let app = TestApp::spawn().await;
        let author = app.register("author").await;
        let (_, token) = app.create_authenticated_user("reader").await;

        let missing = app
            .post_with_token(&routes::subscribe(9999), &json!({}), &token)
            .await;
        assert_eq!(missing.status, 404);

        let absent = app.delete_with_token(&routes::subscribe(author), &token).await;
        assert_eq!(absent.status, 404);

        let first = app
            .post_with_token(&routes::subscribe(author), &json!({}), &token)
            .await;
        assert_eq!(first.status, 201, "{}", first.text);
        assert_eq!(first.body["id"], author);
        assert_eq!(first.body["is_subscribed"], true);
        assert_eq!(first.body["recipes_count"], 0);

        let duplicate = app
            .post_with_token(&routes::subscribe(author), &json!({}), &token)
            .await;
        assert_eq!(duplicate.status, 400);
        assert_eq!(duplicate.body["code"], "ALREADY_EXISTS");

        let remove = app.delete_with_token(&routes::subscribe(author), &token).await;
        assert_eq!(remove.status, 204);
    }
}
