use std::fmt;
use std::future::Future;

use kube::config::KubeConfigOptions;

/// A way of obtaining cluster credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// The pod's service account token and the `KUBERNETES_SERVICE_*` environment.
    InCluster,
    /// The local kubeconfig (`KUBECONFIG` or `~/.kube/config`), current context.
    Kubeconfig,
}

impl CredentialSource {
    pub const DEFAULT_ORDER: [Self; 2] = [Self::InCluster, Self::Kubeconfig];

    async fn load(self) -> Result<kube::Config, String> {
        match self {
            Self::InCluster => kube::Config::incluster().map_err(|err| err.to_string()),
            Self::Kubeconfig => kube::Config::from_kubeconfig(&KubeConfigOptions::default())
                .await
                .map_err(|err| err.to_string()),
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InCluster => f.write_str("in-cluster"),
            Self::Kubeconfig => f.write_str("kubeconfig"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialFailure {
    pub source: CredentialSource,
    pub reason: String,
}

impl fmt::Display for CredentialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.reason)
    }
}

/// Every attempted credential source failed.
#[derive(Debug, thiserror::Error)]
#[error("unable to resolve cluster credentials ({})", describe(.failures))]
pub struct CredentialError {
    pub failures: Vec<CredentialFailure>,
}

fn describe(failures: &[CredentialFailure]) -> String {
    if failures.is_empty() {
        return "no credential sources configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) async fn resolve(sources: &[CredentialSource]) -> Result<kube::Config, CredentialError> {
    first_success(sources, CredentialSource::load)
        .await
        .map(|(source, config)| {
            tracing::info!(%source, cluster_url = %config.cluster_url, "Resolved cluster credentials");
            config
        })
}

async fn first_success<T, F, Fut>(
    sources: &[CredentialSource],
    mut load: F,
) -> Result<(CredentialSource, T), CredentialError>
where
    F: FnMut(CredentialSource) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut failures = Vec::with_capacity(sources.len());
    for &source in sources {
        let loaded = load(source).await;
        match loaded {
            Ok(value) => return Ok((source, value)),
            Err(reason) => {
                tracing::warn!(%source, %reason, "Credential source unavailable");
                failures.push(CredentialFailure { source, reason });
            }
        }
    }
    Err(CredentialError { failures })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn unavailable(source: CredentialSource) -> Result<&'static str, String> {
        Err(format!("{source} not available"))
    }

    #[tokio::test]
    async fn first_source_wins() {
        let (source, value) = first_success(&CredentialSource::DEFAULT_ORDER, |source| async move {
            Ok::<_, String>(source)
        })
        .await
        .unwrap();

        assert_eq!(source, CredentialSource::InCluster);
        assert_eq!(value, CredentialSource::InCluster);
    }

    #[tokio::test]
    async fn falls_back_to_kubeconfig() {
        let mut attempted = Vec::new();
        let (source, value) = first_success(&CredentialSource::DEFAULT_ORDER, |source| {
            attempted.push(source);
            async move {
                match source {
                    CredentialSource::InCluster => Err("not running in a pod".to_string()),
                    CredentialSource::Kubeconfig => Ok("kind-dev"),
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(source, CredentialSource::Kubeconfig);
        assert_eq!(value, "kind-dev");
        assert_eq!(attempted, CredentialSource::DEFAULT_ORDER);
    }

    #[tokio::test]
    async fn stops_after_first_success() {
        let mut attempted = Vec::new();
        first_success(&CredentialSource::DEFAULT_ORDER, |source| {
            attempted.push(source);
            async { Ok::<_, String>(()) }
        })
        .await
        .unwrap();

        assert_eq!(attempted, [CredentialSource::InCluster]);
    }

    #[tokio::test]
    async fn all_sources_fail() {
        let err = first_success(&CredentialSource::DEFAULT_ORDER, unavailable)
            .await
            .unwrap_err();

        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[0].source, CredentialSource::InCluster);
        assert_eq!(err.failures[1].source, CredentialSource::Kubeconfig);
        assert_eq!(
            err.to_string(),
            "unable to resolve cluster credentials (in-cluster: in-cluster not available; kubeconfig: kubeconfig not available)"
        );
    }

    #[tokio::test]
    async fn no_sources() {
        let err = first_success(&[], unavailable).await.unwrap_err();

        assert!(err.failures.is_empty());
        assert_eq!(
            err.to_string(),
            "unable to resolve cluster credentials (no credential sources configured)"
        );
    }
}
