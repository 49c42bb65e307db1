use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use serde_json::json;
use std::path::PathBuf;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_a_completed_script_run(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/audio/script",
            &json!({ "script": [{ "text": "Alpha" }, { "text": "FAIL bravo" }, { "text": "Charlie" }] }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let job_id = response.json()["job_id"].as_str().unwrap().to_string();

    let jobs = ctx.client.get("/api/jobs").await.unwrap();
    jobs.assert_status(StatusCode::OK);
    let listed = jobs.json().as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], job_id.as_str());

    let job = ctx.client.get(&format!("/api/jobs/{}", job_id)).await.unwrap();
    job.assert_status(StatusCode::OK);
    let body = job.json();
    assert_eq!(body["status"], "completed");
    assert_eq!(body["total_parts"], 3);
    assert_eq!(body["completed_parts"], 3);
    assert_eq!(body["script_parts"][1]["text"], "FAIL bravo");
    assert!(body.get("error").is_none());

    let output_file = PathBuf::from(body["output_file"].as_str().unwrap());
    assert_eq!(
        output_file.file_name().and_then(|name| name.to_str()),
        response.json()["file_name"].as_str()
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_a_failed_script_run(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/audio/script",
            &json!({ "script": [{ "text": "FAIL one" }, { "text": "FAIL two" }] }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let jobs = ctx.client.get("/api/jobs").await.unwrap();
    let listed = jobs.json().as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["status"], "failed");
    assert_eq!(listed[0]["error"], "No audio segments were generated");
    assert_eq!(listed[0]["completed_parts"], 2);
    assert!(listed[0].get("output_file").is_none());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_a_job_and_its_output_file(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/audio/script", &json!({ "script": [{ "text": "Alpha" }] }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let job_id = response.json()["job_id"].as_str().unwrap().to_string();
    let file_name = response.json()["file_name"].as_str().unwrap().to_string();
    assert!(ctx.output_dir.join(&file_name).exists());

    ctx.client
        .delete(&format!("/api/jobs/{}", job_id))
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    assert!(!ctx.output_dir.join(&file_name).exists());
    ctx.client
        .get(&format!("/api/jobs/{}", job_id))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Job not found");
    ctx.client
        .get(&format!("/api/audio/files/{}", file_name))
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_not_found_for_an_unknown_job(ctx: &TestContext) {
    let path = format!("/api/jobs/{}", uuid::Uuid::new_v4());

    ctx.client
        .get(&path)
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_message("Job not found");
    ctx.client
        .delete(&path)
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_record_simple_audio_as_a_job(ctx: &TestContext) {
    ctx.client
        .post("/api/audio/simple", &json!({ "text": "Just one line" }))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let jobs = ctx.client.get("/api/jobs").await.unwrap();
    jobs.assert_status(StatusCode::OK);
    assert_eq!(jobs.json(), &json!([]));
}
