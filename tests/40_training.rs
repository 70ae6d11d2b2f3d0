mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn feedback_suggests_load_changes_from_rpe() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, token) = app.sign_up().await?;

    let cases = [(json!(5), 2.5, "RPE 5 detectado."), (json!("9"), -2.5, "RPE 9 detectado."), (json!(7), 0.0, "RPE 7 detectado.")];
    for (rpe, adjustment, preview) in cases {
        let (status, body) = app
            .post(
                "/api/training/feedback",
                &token,
                &json!({"exercise_id": 12, "rpe": rpe, "weight": 60, "reps": 8}),
            )
            .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["suggested_adjustment"], adjustment);
        assert_eq!(body["analysis_preview"], preview);
    }

    let (_, body) = app
        .post("/api/training/feedback", &token, &json!({"exercise_id": "abc", "rpe": 7}))
        .await?;
    assert_eq!(body["message"], "¡Buen esfuerzo!");
    Ok(())
}

#[tokio::test]
async fn feedback_requires_exercise_and_rpe() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, token) = app.sign_up().await?;

    for body in [json!({"rpe": 8}), json!({"exercise_id": 3}), json!({"exercise_id": 0, "rpe": 8}), json!({"exercise_id": 3, "rpe": null})] {
        let (status, reply) = app.post("/api/training/feedback", &token, &body).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(reply["error"], "Faltan datos obligatorios (exercise_id, rpe)");
    }
    Ok(())
}

#[tokio::test]
async fn today_without_routines_says_so() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, token) = app.sign_up().await?;

    let (status, body) = app.get("/api/training/today", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No tienes rutinas activas. ¡Crea una con el Coach IA!");
    assert_eq!(body["exercises"], json!([]));
    Ok(())
}

#[tokio::test]
async fn today_serves_day_one_of_the_newest_routine() -> Result<()> {
    let app = TestApp::spawn().await?;
    let (_, token) = app.sign_up().await?;

    let (_, older) = app
        .post(
            "/api/routines",
            &token,
            &json!({
                "name": "Antigua",
                "days": [{"day_number": 1, "name": "Todo", "exercises": [{"name": "Burpees"}]}]
            }),
        )
        .await?;
    app.post(
        "/api/routines",
        &token,
        &json!({
            "name": "Nueva",
            "days": [
                {"day_number": 2, "name": "Pierna", "exercises": [{"name": "Sentadilla"}]},
                {"day_number": 1, "name": "Empuje", "exercises": [
                    {"name": "Press Militar", "sets": 5, "reps": 5, "target_weight": 40, "notes": "Controlado"}
                ]}
            ]
        }),
    )
    .await?;

    let (status, body) = app.get("/api/training/today", &token).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["routine_name"], "Nueva");
    assert_eq!(body["day_name"], "Empuje");
    assert_eq!(body["exercises"][0]["name"], "Press Militar");
    assert_eq!(body["exercises"][0]["sets"], 5);
    assert_eq!(body["exercises"][0]["weight"], 40.0);
    assert_eq!(body["exercises"][0]["notes"], "Controlado");

    let path = format!(
        "/api/training/today?routineId={}",
        older["routine"]["id"].as_str().unwrap_or_default()
    );
    let (_, body) = app.get(&path, &token).await?;
    assert_eq!(body["routine_name"], "Antigua");
    assert_eq!(body["exercises"][0]["name"], "Burpees");
    Ok(())
}
