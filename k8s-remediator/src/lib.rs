use k8s_remediator_ext as k8s;
use k8s_remediator_kubeapi::PodApi;
use kube::ResourceExt as _;

use k8s::PodExt as _;

pub use settings::DRY_RUN_ENV;
pub use settings::Settings;

mod settings;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to list pods: {0}")]
    List(#[source] kube::Error),
}

/// What happened to a single crash looping pod.
#[derive(Debug)]
pub enum RemediationOutcome {
    Deleted,
    DeleteFailed(kube::Error),
    DryRun,
}

impl RemediationOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::DeleteFailed(_))
    }
}

#[derive(Debug)]
pub struct Remediation {
    pub namespace: String,
    pub name: String,
    pub outcome: RemediationOutcome,
}

/// Result of one pass over the cluster.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub scanned: usize,
    pub remediations: Vec<Remediation>,
}

impl ScanReport {
    pub fn crash_looping(&self) -> usize {
        self.remediations.len()
    }

    pub fn deleted(&self) -> usize {
        self.count(RemediationOutcome::is_deleted)
    }

    pub fn failed(&self) -> usize {
        self.count(RemediationOutcome::is_failed)
    }

    fn count(&self, f: impl Fn(&RemediationOutcome) -> bool) -> usize {
        self.remediations
            .iter()
            .filter(|remediation| f(&remediation.outcome))
            .count()
    }
}

/// Deletes pods with a container waiting in `CrashLoopBackOff`.
///
/// Every call to [`Remediator::scan_and_remediate`] lists the whole cluster again;
/// nothing is remembered between passes.
#[derive(Debug)]
pub struct Remediator<A> {
    api: A,
    settings: Settings,
}

impl<A> Remediator<A>
where
    A: PodApi,
{
    pub fn new(api: A, settings: Settings) -> Self {
        Self { api, settings }
    }

    /// Runs a single list and delete pass.
    ///
    /// Failing to list pods aborts the pass before anything is deleted.
    /// A failed delete is logged and recorded in the report, and the pass
    /// carries on with the remaining pods.
    pub async fn scan_and_remediate(&self) -> Result<ScanReport, Error> {
        let pods = self.api.list_pods().await.map_err(Error::List)?;
        let mut report = ScanReport {
            scanned: pods.len(),
            ..k8s::default()
        };

        for pod in pods.iter().filter(|pod| pod.is_crash_looping()) {
            let name = pod.name_any();
            let Some(namespace) = pod.namespace() else {
                tracing::warn!(name, "Skipping crash looping pod without namespace");
                continue;
            };
            let outcome = self.remediate(&namespace, &name).await;
            report.remediations.push(Remediation {
                namespace,
                name,
                outcome,
            });
        }

        tracing::info!(
            scanned = report.scanned,
            crash_looping = report.crash_looping(),
            deleted = report.deleted(),
            failed = report.failed(),
            "Scan complete"
        );
        Ok(report)
    }

    async fn remediate(&self, namespace: &str, name: &str) -> RemediationOutcome {
        if self.settings.dry_run {
            tracing::info!(namespace, name, "Dry run, not deleting crash looping pod");
            return RemediationOutcome::DryRun;
        }

        tracing::info!(namespace, name, "Deleting crash looping pod");
        self.api
            .delete_pod(namespace, name)
            .await
            .inspect_err(|err| tracing::error!(namespace, name, %err, "Failed to delete pod"))
            .map_or_else(RemediationOutcome::DeleteFailed, |()| {
                RemediationOutcome::Deleted
            })
    }
}
