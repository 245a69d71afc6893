use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use plateful::config::{Config, DatabaseConfig, JwtConfig, ObservabilityConfig, ServerConfig};
use plateful_recipe::{IngredientAmountInput, RecipeInput, create_recipe, query_tags};
use plateful_user::{RegisterInput, generate_jwt, register};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx_migrator::{Migrate, Plan};
use tower::ServiceExt;
use ulid::Ulid;

const JWT_SECRET: &str = "test_secret_key_minimum_32_characters_long";

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            expiration_days: 7,
        },
        observability: ObservabilityConfig::default(),
    }
}

/// Helper to build the app against a migrated in-memory database
async fn setup_app() -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    plateful_db::migrator()
        .unwrap()
        .run(&mut conn, &Plan::apply_all())
        .await
        .unwrap();
    drop(conn);

    let app = plateful::create_app(pool.clone(), test_config());

    (app, pool)
}

async fn register_user(pool: &SqlitePool, username: &str) -> (String, String) {
    let user = register(
        pool,
        RegisterInput {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password: "correct-horse-battery".to_string(),
        },
    )
    .await
    .unwrap();

    let token = generate_jwt(user.id.clone(), user.email.clone(), JWT_SECRET, 7).unwrap();

    (user.id, token)
}

async fn insert_ingredient(pool: &SqlitePool, name: &str, unit: &str) -> String {
    let id = Ulid::new().to_string();
    sqlx::query("INSERT INTO ingredient (id, name, measurement_unit) VALUES (?1, ?2, ?3)")
        .bind(&id)
        .bind(name)
        .bind(unit)
        .execute(pool)
        .await
        .unwrap();

    id
}

async fn seed_recipe(
    pool: &SqlitePool,
    author_id: &str,
    name: &str,
    ingredients: Vec<(String, i64)>,
) -> String {
    let tag = query_tags(pool).await.unwrap().remove(0).id;

    create_recipe(
        pool,
        author_id,
        RecipeInput {
            ingredients: ingredients
                .into_iter()
                .map(|(id, amount)| IngredientAmountInput { id, amount })
                .collect(),
            tags: vec![tag],
            image: None,
            name: name.to_string(),
            text: "Mix everything and bake.".to_string(),
            cooking_time: 30,
        },
    )
    .await
    .unwrap()
    .id
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = setup_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_download_requires_authentication() {
    let (app, _pool) = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recipes/download_shopping_cart")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn test_download_shopping_cart_attachment() {
    let (app, pool) = setup_app().await;
    let (user_id, token) = register_user(&pool, "baker").await;

    let flour = insert_ingredient(&pool, "Flour", "g").await;
    let sugar = insert_ingredient(&pool, "Sugar", "g").await;
    let eggs = insert_ingredient(&pool, "Eggs", "pcs").await;

    let cake = seed_recipe(
        &pool,
        &user_id,
        "Cake",
        vec![(flour.clone(), 200), (sugar, 50)],
    )
    .await;
    let bread = seed_recipe(&pool, &user_id, "Bread", vec![(flour, 300), (eggs, 2)]).await;

    // Put both recipes in the cart through the API
    for recipe_id in [&cake, &bread] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/recipes/{recipe_id}/shopping_cart"))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recipes/download_shopping_cart")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=shopping_list"
    );

    let body = body_string(response).await;
    assert_eq!(body, "Eggs pcs - 2\nFlour g - 500\nSugar g - 50");
}

#[tokio::test]
async fn test_download_empty_cart_is_empty_file() {
    let (app, pool) = setup_app().await;
    let (_user_id, token) = register_user(&pool, "empty").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recipes/download_shopping_cart")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_register_login_me_flow() {
    let (app, _pool) = setup_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "email": "alice@example.com",
                        "username": "alice",
                        "first_name": "Alice",
                        "last_name": "Árbenz",
                        "password": "correct-horse-battery"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_subscribed"], false);
    assert!(body.get("password").is_none());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/token/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "email": "alice@example.com",
                        "password": "correct-horse-battery"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["auth_token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn test_login_bad_password_is_unauthorized() {
    let (app, pool) = setup_app().await;
    register_user(&pool, "bob").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/token/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "email": "bob@example.com",
                        "password": "wrong"
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recipe_list_is_public_and_viewer_aware() {
    let (app, pool) = setup_app().await;
    let (author_id, token) = register_user(&pool, "chef").await;

    let flour = insert_ingredient(&pool, "Flour", "g").await;
    let recipe = seed_recipe(&pool, &author_id, "Pancakes", vec![(flour, 100)]).await;

    // Anonymous listing works and carries unset per-user flags
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/recipes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], recipe.as_str());
    assert_eq!(body[0]["is_favorited"], false);
    assert_eq!(body[0]["author"]["username"], "chef");
    assert_eq!(body[0]["ingredients"][0]["name"], "Flour");
    assert_eq!(body[0]["ingredients"][0]["amount"], 100);

    // Favoriting flips the flag for the authenticated viewer
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/recipes/{recipe}/favorite"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/recipes")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body[0]["is_favorited"], true);
}

#[tokio::test]
async fn test_anonymous_recipe_creation_is_rejected() {
    let (app, _pool) = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/recipes")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "ingredients": [],
                        "tags": [],
                        "name": "Anonymous stew",
                        "text": "no",
                        "cooking_time": 10
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_subscription_flow() {
    let (app, pool) = setup_app().await;
    let (reader_id, reader_token) = register_user(&pool, "reader").await;
    let (author_id, _author_token) = register_user(&pool, "writer").await;

    let flour = insert_ingredient(&pool, "Flour", "g").await;
    seed_recipe(&pool, &author_id, "Bread", vec![(flour, 500)]).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/users/{author_id}/subscribe"))
                .header(header::AUTHORIZATION, format!("Bearer {reader_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["username"], "writer");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 1);

    // Self-subscription is rejected
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/users/{reader_id}/subscribe"))
                .header(header::AUTHORIZATION, format!("Bearer {reader_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/subscriptions?recipes_limit=0")
                .header(header::AUTHORIZATION, format!("Bearer {reader_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["recipes"].as_array().unwrap().len(), 0);
    assert_eq!(body[0]["recipes_count"], 1);
}

#[tokio::test]
async fn test_tags_are_seeded() {
    let (app, _pool) = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tags")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Breakfast", "Dinner", "Lunch"]);
}
