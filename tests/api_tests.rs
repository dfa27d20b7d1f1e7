//! API integration tests
//!
//! These run against a live server with an empty-ish database:
//! `cargo test -- --ignored`

use chrono::{Duration, NaiveDate, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn create_member(client: &Client, name: &str, first_name: &str) -> i64 {
    let response = client
        .post(format!("{}/members", BASE_URL))
        .json(&json!({
            "name": name,
            "first_name": first_name,
            "phone": "0601020304"
        }))
        .send()
        .await
        .expect("Failed to send create member request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No member ID")
}

async fn create_media(client: &Client, name: &str, category: &str) -> i64 {
    let response = client
        .post(format!("{}/media", BASE_URL))
        .json(&json!({
            "name": name,
            "author": "Test Author",
            "category": category
        }))
        .send()
        .await
        .expect("Failed to send create media request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No media ID")
}

async fn open_loan(client: &Client, member_id: i64, media_id: i64, loan_date: Option<NaiveDate>) -> reqwest::Response {
    let mut payload = json!({
        "member_id": member_id,
        "media_id": media_id
    });
    if let Some(date) = loan_date {
        payload["loan_date"] = json!(date.to_string());
    }

    client
        .post(format!("{}/loans", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send create loan request")
}

async fn delete_member(client: &Client, member_id: i64) {
    let _ = client
        .delete(format!("{}/members/{}?force=true", BASE_URL, member_id))
        .send()
        .await;
}

async fn delete_media(client: &Client, media_id: i64) {
    let _ = client
        .delete(format!("{}/media/{}?force=true", BASE_URL, media_id))
        .send()
        .await;
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
async fn test_member_crud() {
    let client = Client::new();

    let member_id = create_member(&client, "Dupont", "Jean").await;

    // Fetch it back
    let response = client
        .get(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Dupont");
    assert_eq!(body["first_name"], "Jean");

    // Update the phone number
    let response = client
        .put(format!("{}/members/{}", BASE_URL, member_id))
        .json(&json!({"phone": "0699999999"}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["phone"], "0699999999");

    // Delete
    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    // Gone
    let response = client
        .get(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_member_requires_name() {
    let client = Client::new();

    let response = client
        .post(format!("{}/members", BASE_URL))
        .json(&json!({
            "name": "",
            "first_name": "Jean",
            "phone": "0601020304"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_media_with_category_details() {
    let client = Client::new();

    let response = client
        .post(format!("{}/media", BASE_URL))
        .json(&json!({
            "name": "Les Aventuriers du Rail",
            "author": "Alan R. Moon",
            "category": "board",
            "details": {"board": {"players_min": 2, "players_max": 5}}
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["category"], "board");
    assert_eq!(body["available"], true);
    assert_eq!(body["details"]["board"]["players_max"], 5);

    delete_media(&client, body["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore]
async fn test_media_rejects_mismatched_details() {
    let client = Client::new();

    let response = client
        .post(format!("{}/media", BASE_URL))
        .json(&json!({
            "name": "Dune",
            "author": "Frank Herbert",
            "category": "book",
            "details": {"dvd": {"genre": "science-fiction"}}
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_loan_round_trip() {
    let client = Client::new();
    let member_id = create_member(&client, "Martin", "Claire").await;
    let media_id = create_media(&client, "Round Trip Book", "book").await;
    let today = Utc::now().date_naive();

    // Open
    let response = open_loan(&client, member_id, media_id, Some(today)).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["id"].as_i64().expect("No loan ID");
    assert_eq!(
        body["expected_return_date"],
        (today + Duration::days(7)).to_string()
    );

    // Media is now unavailable
    let media: Value = client
        .get(format!("{}/media/{}", BASE_URL, media_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(media["available"], false);
    assert_eq!(media["borrower_id"].as_i64(), Some(member_id));

    // The loan shows up in the member's open loans
    let loans: Value = client
        .get(format!("{}/members/{}/loans", BASE_URL, member_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(loans.as_array().unwrap().len(), 1);
    assert_eq!(loans[0]["media"]["id"].as_i64(), Some(media_id));
    assert_eq!(loans[0]["is_overdue"], false);

    // Return the same day
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .json(&json!({"effective_return_date": today.to_string()}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "returned");
    assert_eq!(body["loan"]["effective_return_date"], today.to_string());

    // Media is available again
    let media: Value = client
        .get(format!("{}/media/{}", BASE_URL, media_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(media["available"], true);
    assert!(media["borrower_id"].is_null());

    delete_media(&client, media_id).await;
    delete_member(&client, member_id).await;
}

#[tokio::test]
#[ignore]
async fn test_double_return_is_rejected() {
    let client = Client::new();
    let member_id = create_member(&client, "Double", "Retour").await;
    let media_id = create_media(&client, "Double Return CD", "cd").await;
    let today = Utc::now().date_naive();

    let response = open_loan(&client, member_id, media_id, None).await;
    let body: Value = response.json().await.unwrap();
    let loan_id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .json(&json!({"effective_return_date": today.to_string()}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // Second close attempt
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .json(&json!({"effective_return_date": today.to_string()}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "AlreadyReturned");

    // Availability is unaffected by the failed second attempt
    let media: Value = client
        .get(format!("{}/media/{}", BASE_URL, media_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(media["available"], true);

    delete_media(&client, media_id).await;
    delete_member(&client, member_id).await;
}

#[tokio::test]
#[ignore]
async fn test_unavailable_media_is_refused() {
    let client = Client::new();
    let first = create_member(&client, "Premier", "Emprunteur").await;
    let second = create_member(&client, "Second", "Emprunteur").await;
    let media_id = create_media(&client, "Contended DVD", "dvd").await;

    let response = open_loan(&client, first, media_id, None).await;
    assert_eq!(response.status(), 201);

    let response = open_loan(&client, second, media_id, None).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "MediaUnavailable");

    delete_media(&client, media_id).await;
    delete_member(&client, first).await;
    delete_member(&client, second).await;
}

#[tokio::test]
#[ignore]
async fn test_borrowing_limit() {
    let client = Client::new();
    let member_id = create_member(&client, "Bidule", "Marc").await;
    let mut media_ids = Vec::new();
    for i in 0..4 {
        media_ids.push(create_media(&client, &format!("Limit Media {}", i), "book").await);
    }

    for &media_id in &media_ids[..3] {
        let response = open_loan(&client, member_id, media_id, None).await;
        assert_eq!(response.status(), 201);
    }

    // Fourth loan breaks the cap
    let response = open_loan(&client, member_id, media_ids[3], None).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "BorrowingLimitExceeded");

    // The fourth media was left untouched
    let media: Value = client
        .get(format!("{}/media/{}", BASE_URL, media_ids[3]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(media["available"], true);

    for media_id in media_ids {
        delete_media(&client, media_id).await;
    }
    delete_member(&client, member_id).await;
}

#[tokio::test]
#[ignore]
async fn test_overdue_loans_block_new_loans() {
    let client = Client::new();
    let member_id = create_member(&client, "Machin", "Justine").await;
    let overdue_media = create_media(&client, "Overdue Book", "book").await;
    let wanted_media = create_media(&client, "Wanted Book", "book").await;
    let today = Utc::now().date_naive();

    // Backdated loan, due three days ago
    let response = open_loan(
        &client,
        member_id,
        overdue_media,
        Some(today - Duration::days(10)),
    )
    .await;
    assert_eq!(response.status(), 201);

    let response = open_loan(&client, member_id, wanted_media, None).await;
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "OverdueLoansExist");

    // The member's loan list flags the overdue loan
    let loans: Value = client
        .get(format!("{}/members/{}/loans", BASE_URL, member_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(loans[0]["is_overdue"], true);

    delete_media(&client, overdue_media).await;
    delete_media(&client, wanted_media).await;
    delete_member(&client, member_id).await;
}

#[tokio::test]
#[ignore]
async fn test_future_loan_date_is_rejected() {
    let client = Client::new();
    let member_id = create_member(&client, "Futur", "Anne").await;
    let media_id = create_media(&client, "Future Book", "book").await;
    let today = Utc::now().date_naive();

    let response = open_loan(&client, member_id, media_id, Some(today + Duration::days(1))).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "InvalidReturnDate");

    delete_media(&client, media_id).await;
    delete_member(&client, member_id).await;
}

#[tokio::test]
#[ignore]
async fn test_return_before_loan_date_is_rejected() {
    let client = Client::new();
    let member_id = create_member(&client, "Avant", "Luc").await;
    let media_id = create_media(&client, "Early Return Book", "book").await;
    let today = Utc::now().date_naive();

    let response = open_loan(&client, member_id, media_id, Some(today)).await;
    let body: Value = response.json().await.unwrap();
    let loan_id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .json(&json!({
            "effective_return_date": (today - Duration::days(1)).to_string()
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "InvalidReturnDate");

    // The loan is still open
    let loan: Value = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(loan["effective_return_date"].is_null());

    delete_media(&client, media_id).await;
    delete_member(&client, member_id).await;
}

#[tokio::test]
#[ignore]
async fn test_delete_member_with_open_loans() {
    let client = Client::new();
    let member_id = create_member(&client, "Parti", "Paul").await;
    let media_id = create_media(&client, "Held Book", "book").await;

    let response = open_loan(&client, member_id, media_id, None).await;
    assert_eq!(response.status(), 201);

    // Blocked without force
    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // Force delete releases the media
    let response = client
        .delete(format!("{}/members/{}?force=true", BASE_URL, member_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let media: Value = client
        .get(format!("{}/media/{}", BASE_URL, media_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(media["available"], true);

    delete_media(&client, media_id).await;
}

#[tokio::test]
#[ignore]
async fn test_available_media_filter() {
    let client = Client::new();
    let member_id = create_member(&client, "Filtre", "Eva").await;
    let borrowed = create_media(&client, "Filter Borrowed CD", "cd").await;
    let free = create_media(&client, "Filter Free CD", "cd").await;

    let response = open_loan(&client, member_id, borrowed, None).await;
    assert_eq!(response.status(), 201);

    let body: Value = client
        .get(format!(
            "{}/media?category=cd&available=true&name=Filter",
            BASE_URL
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let items = body["items"].as_array().unwrap();
    assert!(items.iter().any(|m| m["id"].as_i64() == Some(free)));
    assert!(!items.iter().any(|m| m["id"].as_i64() == Some(borrowed)));

    delete_media(&client, borrowed).await;
    delete_media(&client, free).await;
    delete_member(&client, member_id).await;
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["members"]["total"].is_number());
    assert!(body["media"]["total"].is_number());
    assert!(body["loans"]["active"].is_number());
    assert!(body["loans"]["overdue"].is_number());
}
