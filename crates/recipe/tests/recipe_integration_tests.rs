use plateful_recipe::{
    IngredientAmountInput, RecipeError, RecipeFilters, RecipeInput, add_favorite, create_recipe,
    delete_recipe, is_favorited, query_ingredient_lines, query_recipe_by_id, query_recipe_tags,
    query_recipes, query_tags, remove_favorite, update_recipe,
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx_migrator::{Migrate, Plan};
use ulid::Ulid;

/// Helper to create a migrated in-memory database
async fn setup_test_db() -> SqlitePool {
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

    pool
}

async fn insert_test_user(pool: &SqlitePool, username: &str) -> String {
    let id = Ulid::new().to_string();
    sqlx::query(
        r#"INSERT INTO "user" (id, email, username, first_name, last_name, password_hash, created_at)
           VALUES (?1, ?2, ?3, '', '', 'hash', 0)"#,
    )
    .bind(&id)
    .bind(format!("{username}@example.com"))
    .bind(username)
    .execute(pool)
    .await
    .unwrap();

    id
}

async fn insert_ingredient(pool: &SqlitePool, name: &str, unit: &str) -> String {
    let id = Ulid::new().to_string();
    sqlx::query(r#"INSERT INTO ingredient (id, name, measurement_unit) VALUES (?1, ?2, ?3)"#)
        .bind(&id)
        .bind(name)
        .bind(unit)
        .execute(pool)
        .await
        .unwrap();

    id
}

async fn first_tag_id(pool: &SqlitePool) -> String {
    query_tags(pool).await.unwrap().remove(0).id
}

fn recipe_input(
    ingredients: Vec<(String, i64)>,
    tags: Vec<String>,
    name: &str,
    cooking_time: i64,
) -> RecipeInput {
    RecipeInput {
        ingredients: ingredients
            .into_iter()
            .map(|(id, amount)| IngredientAmountInput { id, amount })
            .collect(),
        tags,
        image: None,
        name: name.to_string(),
        text: "Mix everything and bake.".to_string(),
        cooking_time,
    }
}

#[tokio::test]
async fn test_create_recipe_with_lines_and_tags() {
    let pool = setup_test_db().await;
    let author = insert_test_user(&pool, "author").await;
    let flour = insert_ingredient(&pool, "Flour", "g").await;
    let sugar = insert_ingredient(&pool, "Sugar", "g").await;
    let tag = first_tag_id(&pool).await;

    let recipe = create_recipe(
        &pool,
        &author,
        recipe_input(
            vec![(flour.clone(), 200), (sugar.clone(), 50)],
            vec![tag.clone()],
            "Pancakes",
            25,
        ),
    )
    .await
    .unwrap();

    let fetched = query_recipe_by_id(&pool, &recipe.id).await.unwrap();
    assert_eq!(fetched.name, "Pancakes");
    assert_eq!(fetched.author_id, author);

    let lines = query_ingredient_lines(&pool, &recipe.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    // Lines come back in insertion order
    assert_eq!(lines[0].id, flour);
    assert_eq!(lines[0].amount, 200);
    assert_eq!(lines[1].id, sugar);
    assert_eq!(lines[1].amount, 50);

    let tags = query_recipe_tags(&pool, &recipe.id).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, tag);
}

#[tokio::test]
async fn test_create_recipe_validation() {
    let pool = setup_test_db().await;
    let author = insert_test_user(&pool, "strict").await;
    let flour = insert_ingredient(&pool, "Flour", "g").await;
    let tag = first_tag_id(&pool).await;

    // amount below range
    let result = create_recipe(
        &pool,
        &author,
        recipe_input(vec![(flour.clone(), 0)], vec![tag.clone()], "Bad", 10),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::ValidationError(_))));

    // amount above range
    let result = create_recipe(
        &pool,
        &author,
        recipe_input(vec![(flour.clone(), 32768)], vec![tag.clone()], "Bad", 10),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::ValidationError(_))));

    // cooking_time out of range
    let result = create_recipe(
        &pool,
        &author,
        recipe_input(vec![(flour.clone(), 10)], vec![tag.clone()], "Bad", 0),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::ValidationError(_))));

    // duplicate ingredient ids
    let result = create_recipe(
        &pool,
        &author,
        recipe_input(
            vec![(flour.clone(), 10), (flour.clone(), 20)],
            vec![tag.clone()],
            "Bad",
            10,
        ),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::ValidationError(_))));

    // no ingredients
    let result = create_recipe(
        &pool,
        &author,
        recipe_input(vec![], vec![tag.clone()], "Bad", 10),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::ValidationError(_))));

    // no tags
    let result = create_recipe(
        &pool,
        &author,
        recipe_input(vec![(flour.clone(), 10)], vec![], "Bad", 10),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::ValidationError(_))));

    // unknown ingredient id
    let result = create_recipe(
        &pool,
        &author,
        recipe_input(
            vec![(Ulid::new().to_string(), 10)],
            vec![tag.clone()],
            "Bad",
            10,
        ),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::IngredientNotFound)));

    // unknown tag id
    let result = create_recipe(
        &pool,
        &author,
        recipe_input(
            vec![(flour, 10)],
            vec![Ulid::new().to_string()],
            "Bad",
            10,
        ),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::TagNotFound)));
}

#[tokio::test]
async fn test_update_and_delete_require_author() {
    let pool = setup_test_db().await;
    let author = insert_test_user(&pool, "owner").await;
    let other = insert_test_user(&pool, "intruder").await;
    let flour = insert_ingredient(&pool, "Flour", "g").await;
    let tag = first_tag_id(&pool).await;

    let recipe = create_recipe(
        &pool,
        &author,
        recipe_input(vec![(flour.clone(), 100)], vec![tag.clone()], "Bread", 60),
    )
    .await
    .unwrap();

    let result = update_recipe(
        &pool,
        &other,
        &recipe.id,
        recipe_input(vec![(flour.clone(), 150)], vec![tag.clone()], "Bread!", 60),
    )
    .await;
    assert!(matches!(result, Err(RecipeError::PermissionDenied)));

    let result = delete_recipe(&pool, &other, &recipe.id).await;
    assert!(matches!(result, Err(RecipeError::PermissionDenied)));

    let updated = update_recipe(
        &pool,
        &author,
        &recipe.id,
        recipe_input(vec![(flour, 150)], vec![tag], "Sourdough", 90),
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Sourdough");

    let lines = query_ingredient_lines(&pool, &recipe.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].amount, 150);

    delete_recipe(&pool, &author, &recipe.id).await.unwrap();
    let result = query_recipe_by_id(&pool, &recipe.id).await;
    assert!(matches!(result, Err(RecipeError::NotFound)));
    assert!(query_ingredient_lines(&pool, &recipe.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_query_recipes_filters() {
    let pool = setup_test_db().await;
    let author = insert_test_user(&pool, "chef").await;
    let viewer = insert_test_user(&pool, "viewer").await;
    let flour = insert_ingredient(&pool, "Flour", "g").await;

    // Seeded tags come back name-ordered: Breakfast, Dinner, Lunch
    let tags = query_tags(&pool).await.unwrap();
    let breakfast = tags[0].id.clone();
    let dinner = tags[1].id.clone();

    let morning = create_recipe(
        &pool,
        &author,
        recipe_input(
            vec![(flour.clone(), 100)],
            vec![breakfast.clone()],
            "Porridge",
            15,
        ),
    )
    .await
    .unwrap();

    let evening = create_recipe(
        &pool,
        &author,
        recipe_input(vec![(flour, 300)], vec![dinner], "Dumplings", 45),
    )
    .await
    .unwrap();

    // No filters: both, newest first is still a stable full listing
    let all = query_recipes(&pool, RecipeFilters::default(), None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    // Tag filter
    let filtered = query_recipes(
        &pool,
        RecipeFilters {
            tags: vec!["breakfast".to_string()],
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, morning.id);

    // Author filter
    let filtered = query_recipes(
        &pool,
        RecipeFilters {
            author: Some(viewer.clone()),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();
    assert!(filtered.is_empty());

    // Favorite filter only applies when set to true
    add_favorite(&pool, &viewer, &evening.id).await.unwrap();

    let filtered = query_recipes(
        &pool,
        RecipeFilters {
            is_favorited: true,
            ..Default::default()
        },
        Some(&viewer),
    )
    .await
    .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, evening.id);

    // is_favorited = false must not restrict the listing
    let unfiltered = query_recipes(
        &pool,
        RecipeFilters {
            is_favorited: false,
            ..Default::default()
        },
        Some(&viewer),
    )
    .await
    .unwrap();
    assert_eq!(unfiltered.len(), 2);
}

#[tokio::test]
async fn test_favorite_error_cases() {
    let pool = setup_test_db().await;
    let author = insert_test_user(&pool, "grace").await;
    let user = insert_test_user(&pool, "heidi").await;
    let flour = insert_ingredient(&pool, "Flour", "g").await;
    let tag = first_tag_id(&pool).await;

    let recipe = create_recipe(
        &pool,
        &author,
        recipe_input(vec![(flour, 100)], vec![tag], "Cake", 40),
    )
    .await
    .unwrap();

    let result = add_favorite(&pool, &user, &Ulid::new().to_string()).await;
    assert!(matches!(result, Err(RecipeError::NotFound)));

    add_favorite(&pool, &user, &recipe.id).await.unwrap();
    assert!(is_favorited(&pool, &user, &recipe.id).await.unwrap());

    let result = add_favorite(&pool, &user, &recipe.id).await;
    assert!(matches!(result, Err(RecipeError::AlreadyFavorited)));

    remove_favorite(&pool, &user, &recipe.id).await.unwrap();
    let result = remove_favorite(&pool, &user, &recipe.id).await;
    assert!(matches!(result, Err(RecipeError::NotFavorited)));
}
