use serde_json::json;

use crate::common::{Kitchen, TestApp, recipe_body, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn author_creates_a_recipe_with_full_read_view() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (author_id, token) = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(
                routes::RECIPES,
                &recipe_body("Pancakes", &[k.breakfast], &[(k.flour, 200), (k.eggs, 2)]),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Pancakes");
        assert_eq!(res.body["author"]["id"], author_id);
        assert_eq!(res.body["tags"][0]["slug"], "breakfast");
        assert_eq!(res.body["ingredients"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["ingredients"][0]["id"], k.flour);
        assert_eq!(res.body["ingredients"][0]["amount"], 200);
        assert_eq!(res.body["ingredients"][0]["measurement_unit"], "g");
        assert_eq!(res.body["is_favorited"], false);
        assert_eq!(res.body["is_in_shopping_cart"], false);
    }

    #[tokio::test]
    async fn image_is_stored_and_served() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(
                routes::RECIPES,
                &recipe_body("Toast", &[k.breakfast], &[(k.flour, 50)]),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let image = res.body["image"].as_str().unwrap().to_string();
        assert!(image.starts_with("/media/recipes/"));
        assert!(image.ends_with(".png"));

        let served = app.get_without_token(&image).await;
        assert_eq!(served.status, 200);
        let stored = app
            .media_dir
            .path()
            .join(image.trim_start_matches("/media/"));
        assert!(stored.exists());
    }

    #[tokio::test]
    async fn anonymous_users_cannot_create() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;

        let res = app
            .post_without_token(
                routes::RECIPES,
                &recipe_body("Toast", &[k.breakfast], &[(k.flour, 50)]),
            )
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn invalid_writes_are_rejected() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;

        let mut no_image = recipe_body("Toast", &[k.breakfast], &[(k.flour, 50)]);
        no_image.as_object_mut().unwrap().remove("image");
        let mut bad_image = recipe_body("Toast", &[k.breakfast], &[(k.flour, 50)]);
        bad_image["image"] = json!("http://example.com/cat.png");
        let mut zero_time = recipe_body("Toast", &[k.breakfast], &[(k.flour, 50)]);
        zero_time["cooking_time"] = json!(0);
        let mut blank_text = recipe_body("Toast", &[k.breakfast], &[(k.flour, 50)]);
        blank_text["text"] = json!("   ");

        let cases = [
            ("missing image", no_image),
            ("bad image", bad_image),
            ("no tags", recipe_body("Toast", &[], &[(k.flour, 50)])),
            (
                "duplicate tag",
                recipe_body("Toast", &[k.breakfast, k.breakfast], &[(k.flour, 50)]),
            ),
            ("no ingredients", recipe_body("Toast", &[k.breakfast], &[])),
            (
                "duplicate ingredient",
                recipe_body("Toast", &[k.breakfast], &[(k.flour, 50), (k.flour, 10)]),
            ),
            ("zero amount", recipe_body("Toast", &[k.breakfast], &[(k.flour, 0)])),
            ("unknown tag", recipe_body("Toast", &[9999], &[(k.flour, 50)])),
            (
                "unknown ingredient",
                recipe_body("Toast", &[k.breakfast], &[(9999, 50)]),
            ),
            ("zero cooking time", zero_time),
            ("blank text", blank_text),
        ];

        for (label, body) in cases {
            let res = app.post_with_token(routes::RECIPES, &body, &token).await;
            assert_eq!(res.status, 400, "{label} was accepted: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR", "{label}");
        }

        let list = app.get_without_token(routes::RECIPES).await;
        assert_eq!(list.body["pagination"]["total"], 0);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn author_replaces_tags_and_ingredients() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let id = app
            .create_recipe(&token, "Pancakes", &[k.breakfast], &[(k.flour, 200), (k.eggs, 2)])
            .await;
        let original_image = app.get_without_token(&routes::recipe(id)).await.body["image"].clone();

        let mut body = recipe_body("Crepes", &[k.dinner], &[(k.milk, 300)]);
        body.as_object_mut().unwrap().remove("image");
        let res = app.patch_with_token(&routes::recipe(id), &body, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Crepes");
        assert_eq!(res.body["image"], original_image);
        let tags = res.body["tags"].as_array().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0]["id"], k.dinner);
        let ingredients = res.body["ingredients"].as_array().unwrap();
        assert_eq!(ingredients.len(), 1);
        assert_eq!(ingredients[0]["id"], k.milk);
        assert_eq!(ingredients[0]["amount"], 300);
    }

    #[tokio::test]
    async fn rejected_update_leaves_the_recipe_untouched() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        let id = app
            .create_recipe(&token, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;

        let res = app
            .patch_with_token(
                &routes::recipe(id),
                &recipe_body("Broken", &[k.breakfast], &[(k.eggs, 1), (k.eggs, 2)]),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);

        let stored = app.get_without_token(&routes::recipe(id)).await;
        assert_eq!(stored.body["name"], "Pancakes");
        assert_eq!(stored.body["ingredients"][0]["id"], k.flour);
        assert_eq!(stored.body["ingredients"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_the_author_may_update_or_delete() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, alice) = app.create_authenticated_user("alice").await;
        let (_, bob) = app.create_authenticated_user("bob").await;
        let id = app
            .create_recipe(&alice, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;

        let patch = app
            .patch_with_token(
                &routes::recipe(id),
                &recipe_body("Mine now", &[k.breakfast], &[(k.flour, 1)]),
                &bob,
            )
            .await;
        assert_eq!(patch.status, 403);
        assert_eq!(patch.body["code"], "PERMISSION_DENIED");

        let delete = app.delete_with_token(&routes::recipe(id), &bob).await;
        assert_eq!(delete.status, 403);

        let missing = app
            .patch_with_token(
                &routes::recipe(9999),
                &recipe_body("Ghost", &[k.breakfast], &[(k.flour, 1)]),
                &alice,
            )
            .await;
        assert_eq!(missing.status, 404);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn deleting_removes_the_recipe_and_its_relations() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, alice) = app.create_authenticated_user("alice").await;
        let (_, bob) = app.create_authenticated_user("bob").await;
        let id = app
            .create_recipe(&alice, "Pancakes", &[k.breakfast], &[(k.flour, 200)])
            .await;
        app.post_with_token(&routes::favorite(id), &json!({}), &bob)
            .await;
        app.post_with_token(&routes::shopping_cart(id), &json!({}), &bob)
            .await;

        let res = app.delete_with_token(&routes::recipe(id), &alice).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get_without_token(&routes::recipe(id)).await.status, 404);
        let cart = app.get_with_token(routes::DOWNLOAD_SHOPPING_CART, &bob).await;
        assert_eq!(cart.status, 400);
        assert_eq!(cart.body["code"], "EMPTY_CART");
    }
}

mod listing {
    use super::*;

    fn names(body: &serde_json::Value) -> Vec<String> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn newest_first_with_pagination() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, token) = app.create_authenticated_user("alice").await;
        for name in ["first", "second", "third"] {
            app.create_recipe(&token, name, &[k.breakfast], &[(k.flour, 1)])
                .await;
        }

        let page1 = app
            .get_without_token(&format!("{}?limit=2", routes::RECIPES))
            .await;
        assert_eq!(names(&page1.body), ["third", "second"]);
        assert_eq!(page1.body["pagination"]["total"], 3);

        let page2 = app
            .get_without_token(&format!("{}?limit=2&page=2", routes::RECIPES))
            .await;
        assert_eq!(names(&page2.body), ["first"]);
    }

    #[tokio::test]
    async fn filters_by_author_and_tags() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (alice_id, alice) = app.create_authenticated_user("alice").await;
        let (_, bob) = app.create_authenticated_user("bob").await;
        app.create_recipe(&alice, "porridge", &[k.breakfast], &[(k.milk, 200)])
            .await;
        app.create_recipe(&alice, "stew", &[k.dinner], &[(k.flour, 10)])
            .await;
        app.create_recipe(&bob, "omelette", &[k.breakfast, k.dinner], &[(k.eggs, 3)])
            .await;

        let by_alice = app
            .get_without_token(&format!("{}?author={alice_id}", routes::RECIPES))
            .await;
        assert_eq!(names(&by_alice.body), ["stew", "porridge"]);

        let breakfast = app
            .get_without_token(&format!("{}?tags=breakfast", routes::RECIPES))
            .await;
        assert_eq!(names(&breakfast.body), ["omelette", "porridge"]);

        let either = app
            .get_without_token(&format!("{}?tags=breakfast&tags=dinner", routes::RECIPES))
            .await;
        assert_eq!(either.body["pagination"]["total"], 3);

        let malformed = app
            .get_without_token(&format!("{}?author=abc", routes::RECIPES))
            .await;
        assert_eq!(malformed.status, 400);
    }

    #[tokio::test]
    async fn relation_filters_apply_to_the_caller_only() {
        let app = TestApp::spawn().await;
        let k = Kitchen::stock(&app).await;
        let (_, alice) = app.create_authenticated_user("alice").await;
        let a = app
            .create_recipe(&alice, "liked", &[k.breakfast], &[(k.flour, 1)])
            .await;
        let b = app
            .create_recipe(&alice, "carted", &[k.breakfast], &[(k.flour, 1)])
            .await;
        app.create_recipe(&alice, "plain", &[k.breakfast], &[(k.flour, 1)])
            .await;
        app.post_with_token(&routes::favorite(a), &json!({}), &alice)
            .await;
        app.post_with_token(&routes::shopping_cart(b), &json!({}), &alice)
            .await;

        let favorites = app
            .get_with_token(&format!("{}?is_favorited=1", routes::RECIPES), &alice)
            .await;
        assert_eq!(names(&favorites.body), ["liked"]);
        assert_eq!(favorites.body["data"][0]["is_favorited"], true);

        let cart = app
            .get_with_token(&format!("{}?is_in_shopping_cart=true", routes::RECIPES), &alice)
            .await;
        assert_eq!(names(&cart.body), ["carted"]);
        assert_eq!(cart.body["data"][0]["is_in_shopping_cart"], true);

        let anonymous = app
            .get_without_token(&format!("{}?is_favorited=1", routes::RECIPES))
            .await;
        assert_eq!(anonymous.body["pagination"]["total"], 3);
        for recipe in anonymous.body["data"].as_array().unwrap() {
            assert_eq!(recipe["is_favorited"], false);
            assert_eq!(recipe["is_in_shopping_cart"], false);
            assert_eq!(recipe["author"]["is_subscribed"], false);
        }
    }
}
