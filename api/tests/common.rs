use std::time::Duration;

use anyhow::Result;
use futures::Future;

use dms_api::{auth::USER_ID_HEADER, Server};
use dms_db::object_id::UserId;
use dms_db::test::{create_database, DatabaseInfo, TestDatabase};

#[derive(Clone)]
pub struct TestClient {
    pub base: String,
    pub client: reqwest::Client,
    pub user_id: Option<UserId>,
}

impl TestClient {
    pub fn as_user(&self, user_id: UserId) -> TestClient {
        TestClient {
            base: self.base.clone(),
            client: self.client.clone(),
            user_id: Some(user_id),
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let req = self.client.get(format!("{}/{}", self.base, path));
        match self.user_id {
            Some(user_id) => req.header(USER_ID_HEADER, user_id.to_string()),
            None => req,
        }
    }
}

pub struct TestApp {
    pub database: TestDatabase,
    pub info: DatabaseInfo,
    /// A client that sends the id of the instance administrator.
    pub admin: TestClient,
    /// A client that sends no user id.
    pub anonymous: TestClient,
}

async fn start_app(database: TestDatabase, info: DatabaseInfo) -> Result<TestApp> {
    let config = dms_api::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0, // Bind to random port
        env: "test".to_string(),
        database: dms_api::config::DatabaseConfig {
            database_url: database.url.clone(),
            max_connections: 4,
            query_timeout_ms: 5000,
        },
        admin_permission: Some(info.admin_permission),
        honeycomb_team: None,
        honeycomb_dataset: String::new(),
    };

    dms_test::init();
    let Server { server, host, port } = dms_api::run_server(config).await?;
    tokio::task::spawn(server);

    let anonymous = TestClient {
        base: format!("http://{}:{}/api", host, port),
        client: reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()?,
        user_id: None,
    };

    Ok(TestApp {
        database,
        admin: anonymous.as_user(info.admin_user_id),
        anonymous,
        info,
    })
}

pub async fn run_app_test<F, R>(f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    let (database, info) = create_database().await.expect("Creating database");
    let app = start_app(database.clone(), info)
        .await
        .expect("Starting app");
    f(app).await.unwrap();
    database.drop_db().expect("Cleaning up");
}
