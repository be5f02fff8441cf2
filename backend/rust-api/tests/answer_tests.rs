use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use spellingbee_api::models::Difficulty;

mod common;

async fn new_task(app: &common::TestApp, user_id: i64) -> i64 {
    let (status, json) = app
        .get_json(&format!("/api/puzzle?difficulty=easy&user_id={}", user_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    json["task_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_correct_answer_is_case_insensitive() {
    let app = common::create_test_app(&[("CAT", Difficulty::Easy)]).await;
    let task_id = new_task(&app, 1).await;

    let (status, json) = app
        .send_json(
            "POST",
            "/api/submit",
            &json!({ "task_id": task_id, "answer": "cat", "original_word": "CAT" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["correct"], true);
    assert_eq!(json["message"], "Correct! Great job!");
    assert_eq!(json["consecutive_correct"], 1);
    assert_eq!(json["celebration"], false);
}

#[tokio::test]
async fn test_wrong_answer_resets_progress() {
    let app = common::create_test_app(&[("CAT", Difficulty::Easy)]).await;
    for _ in 0..3 {
        let task_id = new_task(&app, 2).await;
        app.send_json(
            "POST",
            "/api/submit",
            &json!({ "task_id": task_id, "answer": "CAT", "original_word": "CAT", "user_id": 2 }),
        )
        .await;
    }
    let (_, progress) = app.get_json("/api/progress?user_id=2").await;
    assert_eq!(progress["consecutive_correct"], 3);

    let task_id = new_task(&app, 2).await;
    let (status, json) = app
        .send_json(
            "POST",
            "/api/submit",
            &json!({ "task_id": task_id, "answer": "COT", "original_word": "CAT", "user_id": 2 }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["correct"], false);
    assert_eq!(json["message"], "Not quite! The word was \"CAT\".");
    assert_eq!(json["consecutive_correct"], 0);
    let (_, progress) = app.get_json("/api/progress?user_id=2").await;
    assert_eq!(progress["consecutive_correct"], 0);
}

#[tokio::test]
async fn test_tenth_correct_answer_celebrates_once() {
    let app = common::create_test_app(&[("CAT", Difficulty::Easy)]).await;

    for expected in 1..=9 {
        let task_id = new_task(&app, 1).await;
        let (_, json) = app
            .send_json(
                "POST",
                "/api/submit",
                &json!({ "task_id": task_id, "answer": "cat", "original_word": "CAT" }),
            )
            .await;
        assert_eq!(json["consecutive_correct"], expected);
        assert_eq!(json["celebration"], false);
    }

    let task_id = new_task(&app, 1).await;
    let (_, json) = app
        .send_json(
            "POST",
            "/api/submit",
            &json!({ "task_id": task_id, "answer": "cat", "original_word": "CAT" }),
        )
        .await;
    assert_eq!(json["celebration"], true);
    assert_eq!(json["consecutive_correct"], 0);

    let (_, progress) = app.get_json("/api/progress").await;
    assert_eq!(progress["consecutive_correct"], 0);
}

#[tokio::test]
async fn test_resubmitting_a_task_does_not_grow_streak() {
    let app = common::create_test_app(&[("CAT", Difficulty::Easy)]).await;
    let task_id = new_task(&app, 4).await;
    let body = json!({ "task_id": task_id, "answer": "cat", "original_word": "CAT", "user_id": 4 });

    let (status, first) = app.send_json("POST", "/api/submit", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["consecutive_correct"], 1);

    for _ in 0..10 {
        let (status, json) = app.send_json("POST", "/api/submit", &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["correct"], true);
        assert_eq!(json["consecutive_correct"], 1);
        assert_eq!(json["celebration"], false);
    }

    let (_, progress) = app.get_json("/api/progress?user_id=4").await;
    assert_eq!(progress["consecutive_correct"], 1);
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let app = common::create_test_app(&[("CAT", Difficulty::Easy)]).await;
    let task_id = new_task(&app, 1).await;

    for body in [
        json!({ "answer": "cat", "original_word": "CAT" }),
        json!({ "task_id": task_id, "original_word": "CAT" }),
        json!({ "task_id": task_id, "answer": "cat" }),
        json!({ "task_id": task_id, "answer": "", "original_word": "CAT" }),
    ] {
        let (status, json) = app.send_json("POST", "/api/submit", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(json["error"], "Missing required data");
    }

    let task = app.store.get_task(task_id).await.unwrap().unwrap();
    assert!(!task.completed);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = common::create_test_app(&[]).await;

    let (status, body) = app
        .request(
            Request::builder()
                .method("POST")
                .uri("/api/submit")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_progress_for_unknown_user_is_zero() {
    let app = common::create_test_app(&[]).await;

    let (status, json) = app.get_json("/api/progress?user_id=555").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["consecutive_correct"], 0);
}
