// HTTP handlers and route builders for the job board API

pub mod applications;
pub mod auth;
pub mod companies;
pub mod dashboard;
pub mod jobs;
pub mod profile;
pub mod saved_jobs;

use crate::{app::AppState, middleware::auth_middleware};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

/// Wraps a router so every route requires a valid, unrevoked access token
fn protected(state: &AppState, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

// Authentication routes
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/logout", post(auth::logout))
        .route("/refresh-token", post(auth::refresh_token))
        .route("/verify-email/{token}", get(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password));

    let private = Router::new()
        .route("/change-password", put(auth::change_password))
        .route("/me", get(auth::me));

    public.merge(protected(state, private))
}

pub fn company_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(companies::list_companies))
        .route("/{id}", get(companies::get_company));

    let private = Router::new()
        .route("/", post(companies::create_company))
        .route("/me", get(companies::get_my_company))
        .route(
            "/{id}",
            put(companies::update_company).delete(companies::delete_company),
        );

    public.merge(protected(state, private))
}

pub fn job_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(jobs::list_jobs))
        .route("/{id}", get(jobs::get_job));

    let private = Router::new()
        .route("/", post(jobs::create_job))
        .route("/mine", get(jobs::list_my_jobs))
        .route("/{id}", put(jobs::update_job).delete(jobs::delete_job))
        .route("/{id}/apply", post(jobs::apply_to_job))
        .route("/{id}/applications", get(jobs::list_job_applications))
        .route("/{id}/save", post(jobs::save_job).delete(jobs::unsave_job));

    public.merge(protected(state, private))
}

pub fn application_routes(state: &AppState) -> Router<AppState> {
    protected(
        state,
        Router::new()
            .route("/mine", get(applications::list_my_applications))
            .route(
                "/{id}",
                get(applications::get_application).delete(applications::withdraw_application),
            )
            .route("/{id}/status", put(applications::update_application_status)),
    )
}

pub fn saved_job_routes(state: &AppState) -> Router<AppState> {
    protected(
        state,
        Router::new().route("/", get(saved_jobs::list_saved_jobs)),
    )
}

pub fn profile_routes(state: &AppState) -> Router<AppState> {
    protected(
        state,
        Router::new().route("/", get(profile::get_profile).put(profile::update_profile)),
    )
}

pub fn dashboard_routes(state: &AppState) -> Router<AppState> {
    protected(
        state,
        Router::new()
            .route("/jobseeker", get(dashboard::jobseeker_dashboard))
            .route("/employer", get(dashboard::employer_dashboard))
            .route("/admin", get(dashboard::admin_dashboard)),
    )
}

/// Everything mounted under `/api`
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state))
        .nest("/companies", company_routes(state))
        .nest("/jobs", job_routes(state))
        .nest("/applications", application_routes(state))
        .nest("/saved-jobs", saved_job_routes(state))
        .nest("/profile", profile_routes(state))
        .nest("/dashboard", dashboard_routes(state))
}
