//! API integration tests against a running server

use chrono::{Duration, Local};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create an author, language, genre and book; returns the book
async fn create_book(client: &Client, token: &str) -> Value {
    let author: Value = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "first_name": "Arkady", "last_name": "Strugatsky" }))
        .send()
        .await
        .expect("Failed to create author")
        .json()
        .await
        .expect("Failed to parse author");

    let language: Value = client
        .post(format!("{}/languages", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "name": "Russian" }))
        .send()
        .await
        .expect("Failed to create language")
        .json()
        .await
        .expect("Failed to parse language");

    let genre: Value = client
        .post(format!("{}/genres", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "name": "Science Fiction" }))
        .send()
        .await
        .expect("Failed to create genre")
        .json()
        .await
        .expect("Failed to parse genre");

    client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": "Roadside Picnic",
            "author_id": author["id"],
            "summary": "Stalkers smuggle artifacts out of the Zone.",
            "isbn": "9780575093133",
            "genre_ids": [genre["id"]],
            "language_id": language["id"]
        }))
        .send()
        .await
        .expect("Failed to create book")
        .json()
        .await
        .expect("Failed to parse book")
}

async fn current_user_id(client: &Client, token: &str) -> Value {
    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to fetch current user")
        .json()
        .await
        .expect("Failed to parse user");
    me["id"].clone()
}

/// Create a copy of `book`; returns the copy id
async fn create_copy(
    client: &Client,
    token: &str,
    book: &Value,
    status: &str,
    due_in_days: i64,
    borrower_id: &Value,
) -> String {
    let due_back = Local::now().date_naive() + Duration::days(due_in_days);
    let copy: Value = client
        .post(format!("{}/copies", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "book_id": book["id"],
            "imprint": "Gollancz, 2012",
            "status": status,
            "due_back": due_back.to_string(),
            "borrower_id": borrower_id
        }))
        .send()
        .await
        .expect("Failed to create copy")
        .json()
        .await
        .expect("Failed to parse copy");

    copy["id"].as_str().expect("No copy id").to_string()
}

/// A fresh book with one copy on loan to the caller, due in three days
async fn create_copy_on_loan(client: &Client, token: &str) -> String {
    let book = create_book(client, token).await;
    let me = current_user_id(client, token).await;
    create_copy(client, token, &book, "on_loan", 3, &me).await
}

/// Loan list ids, keeping only the given copies
async fn listed_ids(client: &Client, token: &str, path: &str, keep: &[&str]) -> Vec<String> {
    let copies: Value = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    copies
        .as_array()
        .expect("Expected a list")
        .iter()
        .filter_map(|c| c["id"].as_str())
        .filter(|id| keep.contains(id))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"]["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_visit_counter_follows_session_cookie() {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client");

    let first: Value = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(first["num_visits"], 0);

    let second: Value = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(second["num_visits"], 1);
    assert!(second["num_books"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_renewal_flow() {
    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client");
    let token = get_auth_token(&client).await;
    let copy_id = create_copy_on_loan(&client, &token).await;
    let today = Local::now().date_naive();

    // Form proposes three weeks out
    let form: Value = client
        .get(format!("{}/book/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(
        form["proposed_renewal_date"],
        (today + Duration::days(21)).to_string()
    );

    // Yesterday is refused
    let response = client
        .post(format!("{}/book/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": (today - Duration::days(1)).to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["fields"]["renewal_date"][0], "Invalid date - renewal in past");

    // Five weeks out is refused
    let response = client
        .post(format!("{}/book/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": (today + Duration::days(35)).to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Four weeks exactly is accepted
    let new_due = today + Duration::days(28);
    let response = client
        .post(format!("{}/book/{}/renew", BASE_URL, copy_id))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": new_due.to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        "/api/v1/borrowed"
    );

    let copy: Value = client
        .get(format!("{}/copies/{}", BASE_URL, copy_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(copy["due_back"], new_due.to_string());
    assert_eq!(copy["is_overdue"], false);

    // Shows up in the caller's own loans
    let mine: Value = client
        .get(format!("{}/mybooks", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(mine
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"] == copy_id.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_renew_unknown_copy_is_not_found() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!(
            "{}/book/00000000-0000-0000-0000-000000000000/renew",
            BASE_URL
        ))
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": "1999-01-01" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_create_book_with_unknown_author() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Ghost Book",
            "author_id": 999999,
            "summary": "Nobody wrote it.",
            "isbn": "0000000000",
            "genre_ids": [999999],
            "language_id": 999999
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["author_id"].is_array());
    assert!(body["fields"]["genre_ids"].is_array());
    assert!(body["fields"]["language_id"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_loan_lists_filter_and_order() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let book = create_book(&client, &token).await;
    let me = current_user_id(&client, &token).await;

    let patron: Value = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "username": format!("patron-{}", uuid::Uuid::new_v4().simple()),
            "password": "patron"
        }))
        .send()
        .await
        .expect("Failed to create user")
        .json()
        .await
        .expect("Failed to parse user");

    let returned_mine = create_copy(&client, &token, &book, "available", 1, &me).await;
    let others = create_copy(&client, &token, &book, "on_loan", 2, &patron["id"]).await;
    // Created latest-due first
    let later_mine = create_copy(&client, &token, &book, "on_loan", 10, &me).await;
    let sooner_mine = create_copy(&client, &token, &book, "on_loan", 5, &me).await;

    let created = [
        returned_mine.as_str(),
        others.as_str(),
        later_mine.as_str(),
        sooner_mine.as_str(),
    ];

    assert_eq!(
        listed_ids(&client, &token, "/mybooks", &created).await,
        vec![sooner_mine.clone(), later_mine.clone()]
    );
    assert_eq!(
        listed_ids(&client, &token, "/borrowed", &created).await,
        vec![others, sooner_mine, later_mine]
    );

    // Everything the caller sees as theirs is on loan to them, soonest due first
    let mine: Value = client
        .get(format!("{}/mybooks", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let mine = mine.as_array().unwrap();
    assert!(mine
        .iter()
        .all(|c| c["status"] == "on_loan" && c["borrower_id"] == me));
    let due: Vec<&str> = mine.iter().filter_map(|c| c["due_back"].as_str()).collect();
    assert!(due.windows(2).all(|w| w[0] <= w[1]));
}
