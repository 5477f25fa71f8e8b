use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, TestResponse, routes};

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn new_session_starts_in_draft() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;

        let res = app
            .post_with_token(
                routes::SESSIONS,
                &json!({"title": "  90s Hits  ", "description": "Bring earplugs"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "90s Hits");
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["round_count"], 0);
        assert_eq!(res.body["tenant_id"], tenant_id.to_string());
        assert!(res.body["active_round_number"].is_null());
    }

    #[tokio::test]
    async fn draft_and_active_toggle_until_completed() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;

        let res = app.transition(&token, session_id, "activate").await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "active");

        let res = app.transition(&token, session_id, "deactivate").await;
        assert_eq!(res.body["status"], "draft");

        let res = app.transition(&token, session_id, "activate").await;
        assert_eq!(res.body["status"], "active");

        let res = app.transition(&token, session_id, "complete").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "completed");

        let res = app.transition(&token, session_id, "activate").await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");

        let res = app.transition(&token, session_id, "deactivate").await;
        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn repeating_a_transition_is_a_no_op() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;

        app.transition(&token, session_id, "activate").await;
        let res = app.transition(&token, session_id, "activate").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "active");

        app.transition(&token, session_id, "complete").await;
        let res = app.transition(&token, session_id, "complete").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "completed");
    }

    #[tokio::test]
    async fn draft_cannot_be_completed() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;

        let res = app.transition(&token, session_id, "complete").await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let draft = app.create_session(&token, "Draft").await;
        let live = app.create_session(&token, "Live").await;
        app.transition(&token, live, "activate").await;

        let all = app.get_with_token(routes::SESSIONS, &token).await;
        assert_eq!(all.status, 200);
        assert_eq!(all.body.as_array().unwrap().len(), 2);

        let active = app
            .get_with_token(&format!("{}?status=active", routes::SESSIONS), &token)
            .await;
        let ids: Vec<&str> = active
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![live.to_string().as_str()]);
        assert!(!ids.contains(&draft.to_string().as_str()));
    }

    #[tokio::test]
    async fn update_changes_title_and_clears_description() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let res = app
            .post_with_token(
                routes::SESSIONS,
                &json!({"title": "Friday", "description": "old"}),
                &token,
            )
            .await;
        let session_id = res.id();

        let res = app
            .patch_with_token(
                &routes::session(session_id),
                &json!({"title": "Saturday", "description": null}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Saturday");
        assert!(res.body["description"].is_null());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;

        let res = app
            .get_with_token(&routes::session(Uuid::now_v7()), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod permissions {
    use super::*;

    #[tokio::test]
    async fn participants_cannot_create_sessions() {
        let app = TestApp::spawn().await;
        let tenant_id = app.create_tenant("Acme").await;
        let alice = app.register(tenant_id, "Alice").await;

        let res = app
            .post_with_token(routes::SESSIONS, &json!({"title": "Mine"}), &alice.credential)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn super_admin_has_no_tenant_to_create_sessions_in() {
        let app = TestApp::spawn().await;
        let tenant_id = app.create_tenant("Acme").await;

        let res = app
            .post_with_token(
                routes::SESSIONS,
                &json!({"title": "Global", "tenant_id": tenant_id}),
                &app.super_token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "CROSS_TENANT_ACCESS");
    }

    #[tokio::test]
    async fn participants_cannot_drive_transitions() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;
        let alice = app.register(tenant_id, "Alice").await;

        let res = app
            .transition(&alice.credential, session_id, "activate")
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod rounds {
    use super::*;

    #[tokio::test]
    async fn rounds_are_numbered_from_one() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;

        assert_eq!(app.add_round(&token, session_id, 0).await, 1);
        assert_eq!(app.add_round(&token, session_id, 3).await, 2);

        let res = app.get_with_token(&routes::rounds(session_id), &token).await;
        assert_eq!(res.status, 200);
        let rounds = res.body.as_array().unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[1]["correct_option_index"], 3);
        assert_eq!(rounds[0]["options"], json!(["A", "B", "C", "D"]));
    }

    #[tokio::test]
    async fn thirty_first_round_is_rejected() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Marathon").await;
        for _ in 0..30 {
            app.add_round(&token, session_id, 1).await;
        }

        let res = app
            .post_with_token(
                &routes::rounds(session_id),
                &json!({
                    "prompt": "One too many",
                    "options": ["A", "B", "C", "D"],
                    "correct_option_index": 0,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "MAX_ROUNDS_REACHED");

        let session = app.get_with_token(&routes::session(session_id), &token).await;
        assert_eq!(session.body["round_count"], 30);
    }

    #[tokio::test]
    async fn round_needs_exactly_four_options() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;

        let res = app
            .post_with_token(
                &routes::rounds(session_id),
                &json!({
                    "prompt": "Three options",
                    "options": ["A", "B", "C"],
                    "correct_option_index": 0,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn completed_session_takes_no_new_rounds() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;
        app.transition(&token, session_id, "activate").await;
        app.transition(&token, session_id, "complete").await;

        let res = app
            .post_with_token(
                &routes::rounds(session_id),
                &json!({
                    "prompt": "Too late",
                    "options": ["A", "B", "C", "D"],
                    "correct_option_index": 0,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn starting_a_round_requires_an_active_session() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;
        app.add_round(&token, session_id, 0).await;

        let res = app
            .post_with_token(&routes::round_start(session_id, 1), &json!({}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "SESSION_NOT_ACTIVE");
    }

    #[tokio::test]
    async fn starting_an_unknown_round_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;
        app.transition(&token, session_id, "activate").await;

        let res = app
            .post_with_token(&routes::round_start(session_id, 4), &json!({}), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn started_round_is_visible_without_the_answer_to_participants() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 2).await;
        let alice = app.register(tenant_id, "Alice").await;

        let res = app
            .get_with_token(&routes::session(session_id), &alice.credential)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["active_round_number"], 1);
        assert!(res.body["active_round_started_at"].is_string());
        let rounds = res.body["rounds"].as_array().unwrap();
        assert_eq!(rounds.len(), 2);
        assert!(rounds[0].get("correct_option_index").is_none());

        let admin_view = app.get_with_token(&routes::session(session_id), &token).await;
        assert_eq!(admin_view.body["rounds"][0]["correct_option_index"], 0);
    }

    fn round_numbers(res: &TestResponse) -> Vec<i64> {
        res.body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["round_number"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn deleting_a_round_keeps_the_other_numbers() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;
        for _ in 0..3 {
            app.add_round(&token, session_id, 0).await;
        }

        let res = app
            .delete_with_token(&routes::round(session_id, 2), &token)
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let listed = app.get_with_token(&routes::rounds(session_id), &token).await;
        assert_eq!(round_numbers(&listed), vec![1, 3]);
        let session = app.get_with_token(&routes::session(session_id), &token).await;
        assert_eq!(session.body["round_count"], 2);

        assert_eq!(app.add_round(&token, session_id, 1).await, 4);

        let again = app
            .delete_with_token(&routes::round(session_id, 2), &token)
            .await;
        assert_eq!(again.status, 404);
        assert_eq!(again.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn live_round_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 2).await;

        let live = app
            .delete_with_token(&routes::round(session_id, 1), &token)
            .await;
        assert_eq!(live.status, 409);
        assert_eq!(live.body["code"], "CONFLICT");

        let idle = app
            .delete_with_token(&routes::round(session_id, 2), &token)
            .await;
        assert_eq!(idle.status, 204, "{}", idle.text);

        let session = app.get_with_token(&routes::session(session_id), &token).await;
        assert_eq!(session.body["round_count"], 1);
        assert_eq!(session.body["active_round_number"], 1);
    }

    #[tokio::test]
    async fn answered_round_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 2).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;
        assert_eq!(app.answer(session_id, &alice, 1, 0).await.status, 201);
        app.start_round(&token, session_id, 2).await;

        let res = app
            .delete_with_token(&routes::round(session_id, 1), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
        let listed = app.get_with_token(&routes::rounds(session_id), &token).await;
        assert_eq!(round_numbers(&listed), vec![1, 2]);
    }

    #[tokio::test]
    async fn completed_session_keeps_its_rounds() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;
        app.add_round(&token, session_id, 0).await;
        app.transition(&token, session_id, "activate").await;
        app.transition(&token, session_id, "complete").await;

        let res = app
            .delete_with_token(&routes::round(session_id, 1), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn other_tenant_cannot_delete_rounds() {
        let app = TestApp::spawn().await;
        let (_, acme_token) = app.tenant_with_admin("Acme").await;
        let (_, globex_token) = app.tenant_with_admin("Globex").await;
        let session_id = app.create_session(&acme_token, "Friday").await;
        app.add_round(&acme_token, session_id, 0).await;

        let res = app
            .delete_with_token(&routes::round(session_id, 1), &globex_token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "CROSS_TENANT_ACCESS");
        let listed = app
            .get_with_token(&routes::rounds(session_id), &acme_token)
            .await;
        assert_eq!(round_numbers(&listed), vec![1]);
    }
}
