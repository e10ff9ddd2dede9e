// Integration tests for the role dashboards

use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

mod common;
use common::{apply, create_company, create_job, set_status, setup_test_app};

#[tokio::test]
#[serial]
async fn test_employer_dashboard_stats() {
    let Some(app) = setup_test_app().await else { return };
    let employer = app.access_token_for("dash_employer", "EMPLOYER").await;
    let first = app.access_token_for("dash_seeker_a", "JOBSEEKER").await;
    let second = app.access_token_for("dash_seeker_b", "JOBSEEKER").await;

    create_company(&app, &employer, "Dashboard Corp").await;
    let jobs = [
        create_job(&app, &employer, "Job One").await,
        create_job(&app, &employer, "Job Two").await,
        create_job(&app, &employer, "Job Three").await,
    ];

    let mut applications = Vec::new();
    for job in &jobs {
        applications.push(apply(&app, &first, job).await);
    }
    for job in &jobs[..2] {
        applications.push(apply(&app, &second, job).await);
    }

    set_status(&app, &employer, &applications[0], "REVIEWING").await;
    set_status(&app, &employer, &applications[3], "REVIEWING").await;
    set_status(&app, &employer, &applications[1], "INTERVIEW").await;

    let response = app.get("/api/dashboard/employer").bearer(&employer).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    let data = &body["data"];

    assert_eq!(
        data["stats"],
        json!({
            "activeJobs": 3,
            "totalApplications": 5,
            "reviewingApplications": 2,
            "interviewInvitations": 1
        })
    );
    assert_eq!(data["recentApplications"].as_array().unwrap().len(), 5);
    assert_eq!(data["recentJobs"].as_array().unwrap().len(), 3);
    assert_eq!(data["company"]["name"], "Dashboard Corp");
    assert!(data["companyCompletion"]["totalFields"].as_u64().unwrap() > 0);
    assert!(data["recentActivity"].as_array().unwrap().len() <= 10);

    let job_one = data["recentJobs"]
        .as_array()
        .unwrap()
        .iter()
        .find(|j| j["title"] == "Job One")
        .unwrap();
    assert_eq!(job_one["applicationCount"], 2);

    let response = app.get("/api/dashboard/jobseeker").bearer(&first).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    let data = &body["data"];
    assert_eq!(data["stats"]["totalApplications"], 3);
    assert_eq!(data["stats"]["reviewingApplications"], 1);
    assert_eq!(data["stats"]["interviewApplications"], 1);
    assert_eq!(data["recentApplications"].as_array().unwrap().len(), 3);
    assert_eq!(data["profileCompletion"]["percentage"], 15);

    let applied: Vec<&str> = jobs.iter().map(String::as_str).collect();
    for recommended in data["recommendedJobs"].as_array().unwrap() {
        assert!(!applied.contains(&recommended["id"].as_str().unwrap()));
    }
}

#[tokio::test]
#[serial]
async fn test_jobseeker_dashboard_saved_and_activity() {
    let Some(app) = setup_test_app().await else { return };
    let employer = app.access_token_for("saved_employer", "EMPLOYER").await;
    let seeker = app.access_token_for("saved_seeker", "JOBSEEKER").await;

    create_company(&app, &employer, "Saved Corp").await;
    let job = create_job(&app, &employer, "Saved Job").await;
    let other = create_job(&app, &employer, "Applied Job").await;

    let saved = app
        .post(&format!("/api/jobs/{}/save", job))
        .bearer(&seeker)
        .send()
        .await;
    assert_eq!(saved.status(), StatusCode::CREATED);
    apply(&app, &seeker, &other).await;

    let response = app.get("/api/dashboard/jobseeker").bearer(&seeker).send().await;
    let body: Value = response.json().await;
    let data = &body["data"];

    assert_eq!(data["stats"]["savedJobs"], 1);
    assert_eq!(data["stats"]["pendingApplications"], 1);
    assert_eq!(data["savedJobs"][0]["jobTitle"], "Saved Job");

    let activity = data["recentActivity"].as_array().unwrap();
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0]["kind"], "APPLICATION_SUBMITTED");
    assert_eq!(activity[1]["kind"], "JOB_SAVED");
}

#[tokio::test]
#[serial]
async fn test_dashboard_role_checks() {
    let Some(app) = setup_test_app().await else { return };
    let employer = app.access_token_for("role_employer", "EMPLOYER").await;
    let seeker = app.access_token_for("role_seeker", "JOBSEEKER").await;

    let response = app.get("/api/dashboard/employer").bearer(&seeker).send().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.get("/api/dashboard/jobseeker").bearer(&employer).send().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.get("/api/dashboard/admin").bearer(&employer).send().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // an employer without a company still gets an empty dashboard
    let response = app.get("/api/dashboard/employer").bearer(&employer).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert!(body["data"]["company"].is_null());
    assert_eq!(body["data"]["stats"]["activeJobs"], 0);
}

#[tokio::test]
#[serial]
async fn test_admin_dashboard() {
    let Some(app) = setup_test_app().await else { return };
    let admin = app.admin_token().await;
    app.access_token_for("counted", "JOBSEEKER").await;

    let response = app.get("/api/dashboard/admin").bearer(&admin).send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    let data = &body["data"];

    assert!(data["admins"].as_i64().unwrap() >= 1);
    assert!(data["jobSeekers"].as_i64().unwrap() >= 1);
    assert_eq!(
        data["totalUsers"].as_i64().unwrap(),
        data["admins"].as_i64().unwrap()
            + data["jobSeekers"].as_i64().unwrap()
            + data["employers"].as_i64().unwrap()
    );
}

#[tokio::test]
#[serial]
async fn test_health_endpoint() {
    let Some(app) = setup_test_app().await else { return };

    let response = app.get("/health").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["postgresql"]["status"], "healthy");
}
