use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::admin::*;
use crate::handlers::auth::*;
use crate::handlers::participant::*;
use crate::handlers::play::*;
use crate::handlers::session::*;
use crate::handlers::tenant::*;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/tenants", tenant_routes())
        .nest("/admins", admin_routes())
        .nest("/participants", participant_routes())
        .nest("/sessions", session_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(me))
}

fn tenant_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_tenant, list_tenants))
        .routes(routes!(get_tenant, update_tenant, delete_tenant))
        .routes(routes!(create_tenant_admin, list_tenant_admins))
        .routes(routes!(get_tenant_leaderboard))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(update_admin, delete_admin))
        .routes(routes!(reset_admin_password))
}

fn participant_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register_participant))
        .routes(routes!(get_participant, update_participant, delete_participant))
        .routes(routes!(list_my_participations))
}

fn session_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_session, list_sessions))
        .routes(routes!(get_session, update_session))
        .routes(routes!(activate_session))
        .routes(routes!(deactivate_session))
        .routes(routes!(complete_session))
        .routes(routes!(add_round, list_rounds))
        .routes(routes!(delete_round))
        .routes(routes!(start_round))
        .merge(play_routes())
}

fn play_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(join_session))
        .routes(routes!(submit_answer))
        .routes(routes!(get_session_scoreboard))
}
