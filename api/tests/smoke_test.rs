use serde_json::{json, Value};

use crate::common::run_app_test;

#[tokio::test]
async fn health_reports_database() {
    run_app_test(|app| async move {
        let response = app.anonymous.get("health").send().await?;

        assert_eq!(response.status().as_u16(), 200);
        assert!(
            response.headers().contains_key("x-request-id"),
            "every response carries a request id"
        );
        let body = response.json::<Value>().await?;
        assert_eq!(body, json!({ "database": true, "healthy": true }));
        Ok(())
    })
    .await
}

#[tokio::test]
async fn unauthenticated_error_body() {
    run_app_test(|app| async move {
        let path = format!("users/{}/projects", app.info.admin_user_id);
        let response = app.anonymous.get(&path).send().await?;

        assert_eq!(response.status().as_u16(), 401);
        let body = response.json::<Value>().await?;
        assert_eq!(body["error"]["kind"], "authn");
        Ok(())
    })
    .await
}
