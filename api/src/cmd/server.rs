use dms_api::tracing_config::{self, HoneycombConfig};

pub async fn run(mut config: dms_api::config::Config) -> Result<(), anyhow::Error> {
    let honeycomb_config = HoneycombConfig::from_config(&mut config);
    tracing_config::configure("dms-perm", std::io::stdout, honeycomb_config)?;

    let server = dms_api::run_server(config).await?;
    let result = server.server.await;

    tracing_config::teardown();

    result?;
    Ok(())
}
