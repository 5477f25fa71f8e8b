use serde_json::json;
use uuid::Uuid;

use crate::common::{PASSWORD, TestApp, routes};

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn super_admin_can_create_and_fetch_a_tenant() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(
                routes::TENANTS,
                &json!({"name": "  Acme Pub  ", "description": "Weekly quiz night"}),
                &app.super_token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "Acme Pub");
        assert_eq!(res.body["status"], "active");

        let fetched = app
            .get_with_token(&routes::tenant(res.id()), &app.super_token)
            .await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body["description"], "Weekly quiz night");
    }

    #[tokio::test]
    async fn empty_tenant_name_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(routes::TENANTS, &json!({"name": "   "}), &app.super_token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn deleting_a_tenant_deactivates_it() {
        let app = TestApp::spawn().await;
        let active = app.create_tenant("Acme").await;
        let doomed = app.create_tenant("Globex").await;

        let res = app
            .delete_with_token(&routes::tenant(doomed), &app.super_token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "inactive");

        let inactive = app
            .get_with_token(
                &format!("{}?status=inactive", routes::TENANTS),
                &app.super_token,
            )
            .await;
        assert_eq!(inactive.status, 200);
        let ids: Vec<String> = inactive
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec![doomed.to_string()]);
        assert!(!ids.contains(&active.to_string()));
    }

    #[tokio::test]
    async fn update_can_reactivate_and_clear_description() {
        let app = TestApp::spawn().await;
        let tenant_id = app.create_tenant("Acme").await;
        app.delete_with_token(&routes::tenant(tenant_id), &app.super_token)
            .await;

        let res = app
            .patch_with_token(
                &routes::tenant(tenant_id),
                &json!({"status": "active", "description": null, "name": "Acme II"}),
                &app.super_token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "active");
        assert_eq!(res.body["name"], "Acme II");
        assert!(res.body["description"].is_null());
    }

    #[tokio::test]
    async fn unknown_tenant_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get_with_token(&routes::tenant(Uuid::now_v7()), &app.super_token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod inactive_tenant {
    use super::*;

    #[tokio::test]
    async fn inactive_tenant_rejects_registration_and_new_sessions() {
        let app = TestApp::spawn().await;
        let (tenant_id, admin_token) = app.tenant_with_admin("Acme").await;
        app.delete_with_token(&routes::tenant(tenant_id), &app.super_token)
            .await;

        let register = app
            .post_without_token(
                routes::REGISTER,
                &json!({"tenant_id": tenant_id, "name": "Alice"}),
            )
            .await;
        assert_eq!(register.status, 403);
        assert_eq!(register.body["code"], "TENANT_INACTIVE");

        let session = app
            .post_with_token(routes::SESSIONS, &json!({"title": "Late"}), &admin_token)
            .await;
        assert_eq!(session.status, 403);
        assert_eq!(session.body["code"], "TENANT_INACTIVE");
    }

    #[tokio::test]
    async fn inactive_tenant_rejects_new_joins_but_keeps_existing_ones() {
        let app = TestApp::spawn().await;
        let (tenant_id, admin_token) = app.tenant_with_admin("Acme").await;
        let session_id = app.create_session(&admin_token, "Friday").await;
        let alice = app.register(tenant_id, "Alice").await;
        let bob = app.register(tenant_id, "Bob").await;
        assert_eq!(app.join(session_id, &alice).await.status, 201);

        app.delete_with_token(&routes::tenant(tenant_id), &app.super_token)
            .await;

        let again = app.join(session_id, &alice).await;
        assert_eq!(again.status, 200, "{}", again.text);

        let fresh = app.join(session_id, &bob).await;
        assert_eq!(fresh.status, 403);
        assert_eq!(fresh.body["code"], "TENANT_INACTIVE");
    }
}

mod permissions {
    use super::*;

    #[tokio::test]
    async fn tenant_admin_cannot_manage_tenants() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;

        let create = app
            .post_with_token(routes::TENANTS, &json!({"name": "Rogue"}), &token)
            .await;
        assert_eq!(create.status, 403);
        assert_eq!(create.body["code"], "PERMISSION_DENIED");

        let delete = app
            .delete_with_token(&routes::tenant(tenant_id), &token)
            .await;
        assert_eq!(delete.status, 403);
        assert_eq!(delete.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn tenant_admin_can_read_only_its_own_tenant() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        let other = app.create_tenant("Globex").await;

        let own = app.get_with_token(&routes::tenant(tenant_id), &token).await;
        assert_eq!(own.status, 200);

        let foreign = app.get_with_token(&routes::tenant(other), &token).await;
        assert_eq!(foreign.status, 403);
        assert_eq!(foreign.body["code"], "CROSS_TENANT_ACCESS");
    }

    #[tokio::test]
    async fn participant_cannot_list_tenants() {
        let app = TestApp::spawn().await;
        let tenant_id = app.create_tenant("Acme").await;
        let alice = app.register(tenant_id, "Alice").await;

        let res = app.get_with_token(routes::TENANTS, &alice.credential).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod admins {
    use super::*;

    #[tokio::test]
    async fn usernames_are_unique_across_tenants() {
        let app = TestApp::spawn().await;
        let acme = app.create_tenant("Acme").await;
        let globex = app.create_tenant("Globex").await;
        app.create_tenant_admin(acme, "quizmaster").await;

        let res = app
            .post_with_token(
                &routes::tenant_admins(globex),
                &json!({"username": "quizmaster", "password": PASSWORD}),
                &app.super_token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn tenant_admin_lists_its_own_admins() {
        let app = TestApp::spawn().await;
        let (tenant_id, token) = app.tenant_with_admin("Acme").await;
        app.create_tenant_admin(tenant_id, "second").await;

        let res = app
            .get_with_token(&routes::tenant_admins(tenant_id), &token)
            .await;

        assert_eq!(res.status, 200);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["username"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["acme_admin", "second"]);
    }

    #[tokio::test]
    async fn reset_password_replaces_the_old_one() {
        let app = TestApp::spawn().await;
        let tenant_id = app.create_tenant("Acme").await;
        let created = app
            .post_with_token(
                &routes::tenant_admins(tenant_id),
                &json!({"username": "host", "password": PASSWORD}),
                &app.super_token,
            )
            .await;
        let admin_id = created.id();

        let res = app
            .put_with_token(
                &routes::admin_password(admin_id),
                &json!({"password": "brand-new-pass"}),
                &app.super_token,
            )
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let old = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "host", "password": PASSWORD}),
            )
            .await;
        assert_eq!(old.status, 401);
        app.login("host", "brand-new-pass").await;
    }

    #[tokio::test]
    async fn rename_and_delete_an_admin() {
        let app = TestApp::spawn().await;
        let tenant_id = app.create_tenant("Acme").await;
        let created = app
            .post_with_token(
                &routes::tenant_admins(tenant_id),
                &json!({"username": "host", "password": PASSWORD}),
                &app.super_token,
            )
            .await;
        let admin_id = created.id();

        let renamed = app
            .patch_with_token(
                &routes::admin(admin_id),
                &json!({"username": "emcee"}),
                &app.super_token,
            )
            .await;
        assert_eq!(renamed.status, 200, "{}", renamed.text);
        assert_eq!(renamed.body["username"], "emcee");

        let deleted = app
            .delete_with_token(&routes::admin(admin_id), &app.super_token)
            .await;
        assert_eq!(deleted.status, 204);

        let again = app
            .delete_with_token(&routes::admin(admin_id), &app.super_token)
            .await;
        assert_eq!(again.status, 404);
    }

    #[tokio::test]
    async fn deleted_admin_credential_stops_working() {
        let app = TestApp::spawn().await;
        let (_, token) = app.tenant_with_admin("Acme").await;
        let me = app.get_with_token(routes::ME, &token).await;
        assert_eq!(
            app.get_with_token(routes::SESSIONS, &token).await.status,
            200
        );

        let deleted = app
            .delete_with_token(&routes::admin(me.id()), &app.super_token)
            .await;
        assert_eq!(deleted.status, 204);

        let res = app.get_with_token(routes::SESSIONS, &token).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn super_admin_cannot_delete_itself() {
        let app = TestApp::spawn().await;
        let me = app.get_with_token(routes::ME, &app.super_token).await;

        let res = app
            .delete_with_token(&routes::admin(me.id()), &app.super_token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn inactive_tenant_cannot_get_new_admins() {
        let app = TestApp::spawn().await;
        let tenant_id = app.create_tenant("Acme").await;
        app.delete_with_token(&routes::tenant(tenant_id), &app.super_token)
            .await;

        let res = app
            .post_with_token(
                &routes::tenant_admins(tenant_id),
                &json!({"username": "late", "password": PASSWORD}),
                &app.super_token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "TENANT_INACTIVE");
    }
}
