//! LinkedIn post generation against a mock AI gateway and real Postgres

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use KarmaHub::models::{AppRole, CreateTemplateRequest, GeneratePostRequest, PostType};
use KarmaHub::services::ServiceFactory;
use KarmaHub::utils::errors::{AiError, KarmaHubError};

#[tokio::test]
#[serial]
async fn test_generate_stores_post_with_event_context() {
    let test_db = require_db!();
    let mock = AiMockServer::new().await;
    mock.mock_completion("Proud to have attended Hack Night!").await;

    let dir = tempfile::tempdir().unwrap();
    let mut settings = test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    settings.ai = mock.config();
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();

    let admin = create_profile(&db, AppRole::Admin).await;
    let student = create_profile(&db, AppRole::Student).await;
    let event = create_event(&db, &admin, live_event_request()).await;

    let template = services
        .post_service
        .create_template(
            &student,
            CreateTemplateRequest {
                post_type: PostType::Event,
                base_text: "Keep it under 100 words.".to_string(),
            },
        )
        .await
        .unwrap();

    let post = services
        .post_service
        .generate(
            &student,
            GeneratePostRequest {
                post_type: "event".to_string(),
                details: "Met great people".to_string(),
                event_id: Some(event.id),
                template_id: Some(template.id),
            },
        )
        .await
        .unwrap();

    assert_eq!(post.content, "Proud to have attended Hack Night!");
    assert_eq!(post.post_type, PostType::Event);
    assert_eq!(services.post_service.my_posts(&student).await.unwrap().len(), 1);

    let requests = mock.server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user_message = body["messages"][1]["content"].as_str().unwrap();
    assert!(user_message.starts_with("Use this template as a style guide:\nKeep it under 100 words."));
    assert!(user_message.contains("Event: Hack Night at Main Auditorium"));
}

#[tokio::test]
#[serial]
async fn test_generate_surfaces_credit_errors_without_storing() {
    let test_db = require_db!();
    let mock = AiMockServer::new().await;
    mock.mock_status(402).await;

    let dir = tempfile::tempdir().unwrap();
    let mut settings = test_settings(&test_db.database_url, dir.path().to_str().unwrap());
    settings.ai = mock.config();
    let db = test_db.service();
    let services = ServiceFactory::new(&settings, db.clone()).unwrap();
    let student = create_profile(&db, AppRole::Student).await;

    let err = services
        .post_service
        .generate(
            &student,
            GeneratePostRequest {
                post_type: "hackathon".to_string(),
                details: "Won first prize".to_string(),
                event_id: None,
                template_id: None,
            },
        )
        .await
        .unwrap_err();

    assert_matches!(err, KarmaHubError::Ai(AiError::CreditsDepleted));
    assert!(services.post_service.my_posts(&student).await.unwrap().is_empty());
}
