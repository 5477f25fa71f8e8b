use serde_json::json;

use common::ScoreTier;
use server::error::AppError;

use crate::common::{TestApp, routes};

mod tiers {
    use super::*;

    #[tokio::test]
    async fn fast_then_slow_correct_answers_add_up() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 2).await;
        let alice = app.register(tenant_id, "Alice").await;
        assert_eq!(app.join(session_id, &alice).await.status, 201);

        let first = app.answer_timed(session_id, &alice, 1, 0, 1.0).await.unwrap();
        assert_eq!(first.points_awarded, 10);
        assert_eq!(first.tier, ScoreTier::Fast);

        app.start_round(&token, session_id, 2).await;
        let second = app.answer_timed(session_id, &alice, 2, 0, 9.0).await.unwrap();
        assert_eq!(second.points_awarded, 5);
        assert_eq!(second.tier, ScoreTier::Slow);
        assert_eq!(second.total_points, 15);
        assert_eq!(second.correct_answers, 2);

        let history = app
            .get_with_token(&routes::participations(alice.id), &alice.credential)
            .await;
        assert_eq!(history.body[0]["total_points"], 15);
        assert_eq!(history.body[0]["correct_answers"], 2);
    }

    #[tokio::test]
    async fn medium_window_awards_middle_points() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        let outcome = app.answer_timed(session_id, &alice, 1, 0, 4.0).await.unwrap();

        assert_eq!(outcome.points_awarded, 8);
        assert_eq!(outcome.total_points, 8);
    }

    #[tokio::test]
    async fn duplicate_is_rejected_at_the_service_boundary() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        app.answer_timed(session_id, &alice, 1, 0, 1.0).await.unwrap();
        let err = app
            .answer_timed(session_id, &alice, 1, 1, 1.5)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateAnswer(1)));
    }
}

mod answers {
    use super::*;

    #[tokio::test]
    async fn correct_answer_over_http_scores_and_updates_totals() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        let res = app.answer(session_id, &alice, 1, 0).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["is_correct"], true);
        let points = res.body["points_awarded"].as_i64().unwrap();
        assert!(points > 0);
        assert_eq!(res.body["total_points"].as_i64().unwrap(), points);
        assert_eq!(res.body["correct_answers"], 1);
    }

    #[tokio::test]
    async fn wrong_answer_scores_zero() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        let res = app.answer(session_id, &alice, 1, 2).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["is_correct"], false);
        assert_eq!(res.body["tier"], "incorrect");
        assert_eq!(res.body["points_awarded"], 0);
        assert_eq!(res.body["correct_answers"], 0);
    }

    #[tokio::test]
    async fn second_answer_for_a_round_is_a_duplicate() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        let first = app.answer(session_id, &alice, 1, 0).await;
        let second = app.answer(session_id, &alice, 1, 1).await;

        assert_eq!(first.status, 201);
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "DUPLICATE_ANSWER");

        let board = app
            .get_with_token(&routes::scoreboard(session_id), &alice.credential)
            .await;
        assert_eq!(board.body[0]["total_points"], first.body["total_points"]);
    }

    #[tokio::test]
    async fn answering_requires_joining_first() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;

        let res = app.answer(session_id, &alice, 1, 0).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "NOT_JOINED");
    }

    #[tokio::test]
    async fn draft_session_is_joinable_but_not_answerable() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&token, "Friday").await;
        app.add_round(&token, session_id, 0).await;
        let alice = app.register(tenant_id, "Alice").await;

        let joined = app.join(session_id, &alice).await;
        assert_eq!(joined.status, 201, "{}", joined.text);

        let res = app.answer(session_id, &alice, 1, 0).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "SESSION_NOT_ACTIVE");

        app.transition(&token, session_id, "activate").await;
        app.start_round(&token, session_id, 1).await;
        let res = app.answer(session_id, &alice, 1, 0).await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn completing_mid_round_closes_answers() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        let res = app.transition(&token, session_id, "complete").await;
        assert_eq!(res.status, 200);

        let res = app.answer(session_id, &alice, 1, 0).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "SESSION_NOT_ACTIVE");
    }

    #[tokio::test]
    async fn only_the_live_round_accepts_answers() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 2).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        let res = app.answer(session_id, &alice, 2, 0).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "ROUND_NOT_STARTED");
    }

    #[tokio::test]
    async fn option_index_out_of_range_is_rejected() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        let res = app.answer(session_id, &alice, 1, 4).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn admins_cannot_answer() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;

        let res = app
            .post_with_token(
                &routes::answers(session_id),
                &json!({"round_number": 1, "selected_option_index": 0}),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod live_round {
    use super::*;

    #[tokio::test]
    async fn reactivated_session_needs_a_fresh_round_start() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;
        let alice = app.register(tenant_id, "Alice").await;
        app.join(session_id, &alice).await;

        let paused = app.transition(&token, session_id, "deactivate").await;
        assert_eq!(paused.status, 200, "{}", paused.text);
        assert!(paused.body["active_round_number"].is_null());
        assert!(paused.body["active_round_started_at"].is_null());

        let resumed = app.transition(&token, session_id, "activate").await;
        assert!(resumed.body["active_round_number"].is_null());

        let res = app.answer(session_id, &alice, 1, 0).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "ROUND_NOT_STARTED");

        app.start_round(&token, session_id, 1).await;
        let outcome = app.answer_timed(session_id, &alice, 1, 0, 1.0).await.unwrap();
        assert_eq!(outcome.tier, ScoreTier::Fast);
        assert_eq!(outcome.points_awarded, 10);
    }

    #[tokio::test]
    async fn completing_a_session_ends_its_live_round() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let session_id = app.live_session(&token, 1).await;

        let res = app.transition(&token, session_id, "complete").await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "completed");
        assert!(res.body["active_round_number"].is_null());
    }
}
