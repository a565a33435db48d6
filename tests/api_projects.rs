//! Integration tests for the project endpoints
//!
//! Covered here:
//! - GET / (health)
//! - GET/POST /projects
//! - GET/PATCH/DELETE /projects/{id}
//! - GET /projects/{id}/members
//! - DELETE /projects/{id}/members/{user_id}

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{create_test_server, create_test_state, session_token};
use serde_json::json;
use tasklink_server::dtos::{ProjectDTO, TeamMemberDTO, UserDTO};

async fn sign_in(server: &TestServer, token: &str) -> UserDTO {
    server.get("/users/me").authorization_bearer(token).await.json()
}

async fn create_project(server: &TestServer, token: &str, name: &str) -> ProjectDTO {
    let response = server
        .post("/projects")
        .authorization_bearer(token)
        .json(&json!({ "name": name }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
async fn root_health_check_is_public() {
    let (state, _dispatcher) = create_test_state();
    let server = create_test_server(state);

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn project_routes_require_a_session() {
    let (state, _dispatcher) = create_test_state();
    let server = create_test_server(state);

    let response = server.get("/projects").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creating_a_project_also_creates_the_owner_membership() {
    let (state, _dispatcher) = create_test_state();
    let server = create_test_server(state);
    let token = session_token("oauth|owner", "owner@example.com", Some("Owner"));
    let me = sign_in(&server, &token).await;

    let project = create_project(&server, &token, "Website Redesign").await;
    assert_eq!(project.owner_id, me.user_id);

    let members: Vec<TeamMemberDTO> = server
        .get(&format!("/projects/{}/members", project.project_id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, me.user_id);
    assert_eq!(members[0].email, "owner@example.com");
}

#[tokio::test]
async fn projects_are_listed_per_member() {
    let (state, _dispatcher) = create_test_state();
    let server = create_test_server(state);
    let alice = session_token("oauth|alice", "alice@example.com", Some("Alice"));
    let bob = session_token("oauth|bob", "bob@example.com", Some("Bob"));
    sign_in(&server, &alice).await;
    sign_in(&server, &bob).await;

    create_project(&server, &alice, "Alice's Plan").await;
    create_project(&server, &bob, "Bob's Plan").await;

    let alice_projects: Vec<ProjectDTO> = server
        .get("/projects")
        .authorization_bearer(&alice)
        .await
        .json();
    assert_eq!(alice_projects.len(), 1);
    assert_eq!(alice_projects[0].name, "Alice's Plan");
}

#[tokio::test]
async fn non_members_cannot_access_a_project() {
    let (state, _dispatcher) = create_test_state();
    let server = create_test_server(state);
    let owner = session_token("oauth|owner", "owner@example.com", None);
    let stranger = session_token("oauth|stranger", "stranger@example.com", None);
    sign_in(&server, &owner).await;
    sign_in(&server, &stranger).await;

    let project = create_project(&server, &owner, "Private Plan").await;

    let response = server
        .get(&format!("/projects/{}", project.project_id))
        .authorization_bearer(&stranger)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn empty_project_name_fails_validation() {
    let (state, _dispatcher) = create_test_state();
    let server = create_test_server(state);
    let token = session_token("oauth|owner", "owner@example.com", None);
    sign_in(&server, &token).await;

    let response = server
        .post("/projects")
        .authorization_bearer(&token)
        .json(&json!({ "name": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn members_can_update_but_only_the_owner_deletes() {
    let (state, _dispatcher) = create_test_state();
    let server = create_test_server(state);
    let owner = session_token("oauth|owner", "owner@example.com", Some("Owner"));
    let member = session_token("oauth|member", "member@example.com", Some("Member"));
    sign_in(&server, &owner).await;
    sign_in(&server, &member).await;

    let project = create_project(&server, &owner, "Launch Plan").await;

    // Direct-add the second account to the team.
    server
        .post(&format!("/projects/{}/invites", project.project_id))
        .authorization_bearer(&owner)
        .json(&json!({ "emails": ["member@example.com"] }))
        .await;

    let updated: ProjectDTO = server
        .patch(&format!("/projects/{}", project.project_id))
        .authorization_bearer(&member)
        .json(&json!({ "description": "Now with a description" }))
        .await
        .json();
    assert_eq!(updated.description.as_deref(), Some("Now with a description"));

    let forbidden = server
        .delete(&format!("/projects/{}", project.project_id))
        .authorization_bearer(&member)
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    let deleted = server
        .delete(&format!("/projects/{}", project.project_id))
        .authorization_bearer(&owner)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn owner_can_remove_a_member_but_not_themselves() {
    let (state, _dispatcher) = create_test_state();
    let server = create_test_server(state);
    let owner = session_token("oauth|owner", "owner@example.com", Some("Owner"));
    let member = session_token("oauth|member", "member@example.com", Some("Member"));
    let owner_me = sign_in(&server, &owner).await;
    let member_me = sign_in(&server, &member).await;

    let project = create_project(&server, &owner, "Launch Plan").await;
    server
        .post(&format!("/projects/{}/invites", project.project_id))
        .authorization_bearer(&owner)
        .json(&json!({ "emails": ["member@example.com"] }))
        .await;

    // Members cannot remove anyone.
    let forbidden = server
        .delete(&format!(
            "/projects/{}/members/{}",
            project.project_id, owner_me.user_id
        ))
        .authorization_bearer(&member)
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    // The owner's own row is not removable.
    let self_removal = server
        .delete(&format!(
            "/projects/{}/members/{}",
            project.project_id, owner_me.user_id
        ))
        .authorization_bearer(&owner)
        .await;
    assert_eq!(self_removal.status_code(), StatusCode::FORBIDDEN);

    let removed = server
        .delete(&format!(
            "/projects/{}/members/{}",
            project.project_id, member_me.user_id
        ))
        .authorization_bearer(&owner)
        .await;
    assert_eq!(removed.status_code(), StatusCode::OK);

    let members: Vec<TeamMemberDTO> = server
        .get(&format!("/projects/{}/members", project.project_id))
        .authorization_bearer(&owner)
        .await
        .json();
    assert_eq!(members.len(), 1);
}
