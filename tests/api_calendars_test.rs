//! Integration tests for the calendars API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::Router;
    use http::StatusCode;
    use serde_json::json;
    use tower::util::ServiceExt;

    use crate::test_utils::{TestApp, body_to_json, request, test_app};

    async fn create_calendar(app: &Router, token: &str, name: &str) -> String {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/calendars",
                Some(token),
                Some(json!({ "name": name })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_to_json(response.into_body()).await;
        body["calendar"]["id"].as_str().unwrap().to_string()
    }

    async fn sync_profile(app: &Router, token: &str) {
        let response = app
            .clone()
            .oneshot(request("POST", "/api/profile", Some(token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn invite(app: &Router, token: &str, calendar_id: &str, email: &str, role: &str) {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/calendars/{}/invite", calendar_id),
                Some(token),
                Some(json!({ "email": email, "role": role })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    /// Two users known to the identity provider, the second with a
    /// synced profile so they can be invited.
    async fn two_user_app() -> TestApp {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;
        ctx.register_user("t2", "u2", "u2@example.com", "User Two").await;
        sync_profile(&ctx.app, "t2").await;
        ctx
    }

    /// Tests that anonymous callers get an empty list, not an error
    #[tokio::test]
    async fn it_returns_empty_list_for_anonymous_callers() {
        let ctx = test_app().await;

        let response = ctx
            .app
            .oneshot(request("GET", "/api/calendars", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body, json!({ "calendars": [] }));
    }

    /// Tests that creating a calendar reports the owner role
    #[tokio::test]
    async fn it_creates_a_calendar_with_owner_role() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;

        let response = ctx
            .app
            .clone()
            .oneshot(request(
                "POST",
                "/api/calendars",
                Some("t1"),
                Some(json!({ "name": "Trips" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["calendar"]["name"], "Trips");
        assert_eq!(body["calendar"]["role"], "owner");
    }

    /// Tests that the owner's implicit membership row does not produce
    /// a duplicate listing entry
    #[tokio::test]
    async fn it_lists_each_calendar_once_for_the_owner() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;
        create_calendar(&ctx.app, "t1", "Trips").await;

        let response = ctx
            .app
            .oneshot(request("GET", "/api/calendars", Some("t1"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        let calendars = body["calendars"].as_array().unwrap();
        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0]["name"], "Trips");
        assert_eq!(calendars[0]["role"], "owner");
    }

    /// Tests that creating without a name fails
    #[tokio::test]
    async fn it_requires_a_name_to_create() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;

        let response = ctx
            .app
            .oneshot(request(
                "POST",
                "/api/calendars",
                Some("t1"),
                Some(json!({})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["error"], "name required");
    }

    /// Tests that unauthenticated creation is rejected
    #[tokio::test]
    async fn it_rejects_unauthenticated_creation() {
        let ctx = test_app().await;

        let response = ctx
            .app
            .oneshot(request(
                "POST",
                "/api/calendars",
                None,
                Some(json!({ "name": "Trips" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    /// Tests that a whitespace-only rename fails regardless of role
    #[tokio::test]
    async fn it_rejects_renames_with_empty_names() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;

        let response = ctx
            .app
            .oneshot(request(
                "PATCH",
                &format!("/api/calendars/{}", calendar_id),
                Some("t1"),
                Some(json!({ "name": "   " })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// Tests that renaming an unknown calendar is a 404
    #[tokio::test]
    async fn it_returns_not_found_renaming_missing_calendars() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;

        let response = ctx
            .app
            .oneshot(request(
                "PATCH",
                "/api/calendars/does-not-exist",
                Some("t1"),
                Some(json!({ "name": "Trips" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Tests that invited editors may rename the calendar
    #[tokio::test]
    async fn it_allows_editors_to_rename() {
        let ctx = two_user_app().await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;
        invite(&ctx.app, "t1", &calendar_id, "u2@example.com", "editor").await;

        let response = ctx
            .app
            .clone()
            .oneshot(request(
                "PATCH",
                &format!("/api/calendars/{}", calendar_id),
                Some("t2"),
                Some(json!({ "name": "Road Trips" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body, json!({ "ok": true, "name": "Road Trips" }));

        let response = ctx
            .app
            .oneshot(request("GET", "/api/calendars", Some("t2"), None))
            .await
            .unwrap();
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["calendars"][0]["name"], "Road Trips");
        assert_eq!(body["calendars"][0]["role"], "editor");
    }

    /// Tests that viewers may not rename
    #[tokio::test]
    async fn it_forbids_viewers_from_renaming() {
        let ctx = two_user_app().await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;
        invite(&ctx.app, "t1", &calendar_id, "u2@example.com", "viewer").await;

        let response = ctx
            .app
            .oneshot(request(
                "PATCH",
                &format!("/api/calendars/{}", calendar_id),
                Some("t2"),
                Some(json!({ "name": "Mine Now" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    /// Tests that editors may not delete; only the owner can
    #[tokio::test]
    async fn it_forbids_non_owners_from_deleting() {
        let ctx = two_user_app().await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;
        invite(&ctx.app, "t1", &calendar_id, "u2@example.com", "editor").await;

        let response = ctx
            .app
            .oneshot(request(
                "DELETE",
                &format!("/api/calendars/{}", calendar_id),
                Some("t2"),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    /// Tests that the owner can delete and the calendar disappears
    #[tokio::test]
    async fn it_allows_owners_to_delete() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;

        let response = ctx
            .app
            .clone()
            .oneshot(request(
                "DELETE",
                &format!("/api/calendars/{}", calendar_id),
                Some("t1"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = ctx
            .app
            .oneshot(request("GET", "/api/calendars", Some("t1"), None))
            .await
            .unwrap();
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body, json!({ "calendars": [] }));
    }

    /// Tests that inviting without an email fails
    #[tokio::test]
    async fn it_requires_an_email_to_invite() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;

        let response = ctx
            .app
            .oneshot(request(
                "POST",
                &format!("/api/calendars/{}/invite", calendar_id),
                Some("t1"),
                Some(json!({})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["error"], "email required");
    }

    /// Tests that inviting an email without a profile is a 404
    #[tokio::test]
    async fn it_rejects_invites_to_unknown_users() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;

        let response = ctx
            .app
            .oneshot(request(
                "POST",
                &format!("/api/calendars/{}/invite", calendar_id),
                Some("t1"),
                Some(json!({ "email": "nobody@example.com" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["error"], "user not found");
    }

    /// Tests that an unknown role value is rejected
    #[tokio::test]
    async fn it_rejects_invalid_invite_roles() {
        let ctx = two_user_app().await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;

        let response = ctx
            .app
            .oneshot(request(
                "POST",
                &format!("/api/calendars/{}/invite", calendar_id),
                Some("t1"),
                Some(json!({ "email": "u2@example.com", "role": "admin" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// Tests that re-inviting updates the role in place: a viewer who
    /// is re-invited as editor gains rename rights
    #[tokio::test]
    async fn it_updates_role_on_repeat_invites() {
        let ctx = two_user_app().await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;
        invite(&ctx.app, "t1", &calendar_id, "u2@example.com", "viewer").await;

        let response = ctx
            .app
            .clone()
            .oneshot(request(
                "PATCH",
                &format!("/api/calendars/{}", calendar_id),
                Some("t2"),
                Some(json!({ "name": "Nope" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        invite(&ctx.app, "t1", &calendar_id, "u2@example.com", "editor").await;

        let response = ctx
            .app
            .clone()
            .oneshot(request(
                "PATCH",
                &format!("/api/calendars/{}", calendar_id),
                Some("t2"),
                Some(json!({ "name": "Renamed" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Exactly one membership row: the listing shows one entry with
        // the latest role
        let response = ctx
            .app
            .oneshot(request("GET", "/api/calendars", Some("t2"), None))
            .await
            .unwrap();
        let body = body_to_json(response.into_body()).await;
        let calendars = body["calendars"].as_array().unwrap();
        assert_eq!(calendars.len(), 1);
        assert_eq!(calendars[0]["role"], "editor");
    }

    /// Tests that invite emails are matched case-insensitively
    #[tokio::test]
    async fn it_matches_invite_emails_case_insensitively() {
        let ctx = two_user_app().await;
        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;
        invite(&ctx.app, "t1", &calendar_id, "  U2@Example.COM ", "editor").await;

        let response = ctx
            .app
            .oneshot(request("GET", "/api/calendars", Some("t2"), None))
            .await
            .unwrap();
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["calendars"][0]["name"], "Trips");
    }

    /// Tests that viewers may not invite others
    #[tokio::test]
    async fn it_forbids_viewers_from_inviting() {
        let mut ctx = test_app().await;
        ctx.register_user("t1", "u1", "u1@example.com", "User One").await;
        ctx.register_user("t2", "u2", "u2@example.com", "User Two").await;
        ctx.register_user("t3", "u3", "u3@example.com", "User Three").await;
        sync_profile(&ctx.app, "t2").await;
        sync_profile(&ctx.app, "t3").await;

        let calendar_id = create_calendar(&ctx.app, "t1", "Trips").await;
        invite(&ctx.app, "t1", &calendar_id, "u2@example.com", "viewer").await;

        let response = ctx
            .app
            .oneshot(request(
                "POST",
                &format!("/api/calendars/{}/invite", calendar_id),
                Some("t2"),
                Some(json!({ "email": "u3@example.com" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
