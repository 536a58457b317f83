use clap::Parser as _;
use k8s_remediator::Remediator;
use k8s_remediator::Settings;
use k8s_remediator_kubeapi::KubeApi;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(dry_run = settings.dry_run, "Starting k8s-remediator");

    let kubeapi = KubeApi::new().await?;
    let remediator = Remediator::new(kubeapi, settings);
    remediator.scan_and_remediate().await?;

    Ok(())
}
