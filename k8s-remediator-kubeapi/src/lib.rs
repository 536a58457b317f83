use std::fmt::Debug;
use std::future::Future;

use k8s_remediator_ext as k8s;
use kube::api;

use k8s::corev1;

pub use credentials::CredentialError;
pub use credentials::CredentialFailure;
pub use credentials::CredentialSource;

mod credentials;

/// Cluster operations the remediator depends on.
pub trait PodApi {
    /// Lists every pod in every namespace as a one-off snapshot.
    fn list_pods(&self) -> impl Future<Output = kube::Result<Vec<corev1::Pod>>> + Send;

    /// Deletes the pod `name` in `namespace`.
    fn delete_pod(&self, namespace: &str, name: &str)
        -> impl Future<Output = kube::Result<()>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("failed to create Kubernetes client: {0}")]
    Client(#[source] kube::Error),
}

pub struct KubeApi {
    list_params: api::ListParams,
    delete_params: api::DeleteParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi from the first credential source that resolves,
    /// trying in-cluster service account credentials before the local kubeconfig.
    pub async fn new() -> Result<Self, Error> {
        Self::from_sources(&CredentialSource::DEFAULT_ORDER).await
    }

    /// Create a KubeApi from the first of `sources` that resolves.
    pub async fn from_sources(sources: &[CredentialSource]) -> Result<Self, Error> {
        let config = credentials::resolve(sources).await?;
        let client = kube::Client::try_from(config).map_err(Error::Client)?;
        Ok(Self::with_client(client))
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    ///
    /// Lists and deletes are issued with default `ListParams` and `DeleteParams`.
    pub fn with_client(client: kube::Client) -> Self {
        Self {
            list_params: api::ListParams::default(),
            delete_params: api::DeleteParams::default(),
            client,
        }
    }

    fn pods(&self) -> api::Api<corev1::Pod> {
        api::Api::all(self.client.clone())
    }

    fn namespaced_pods(&self, namespace: &str) -> api::Api<corev1::Pod> {
        api::Api::namespaced(self.client.clone(), namespace)
    }

    fn list_params(&self) -> &api::ListParams {
        &self.list_params
    }

    fn delete_params(&self) -> &api::DeleteParams {
        &self.delete_params
    }
}

impl PodApi for KubeApi {
    async fn list_pods(&self) -> kube::Result<Vec<corev1::Pod>> {
        let lp = self.list_params();
        self.pods().list(lp).await.map(|list| list.items)
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> kube::Result<()> {
        let dp = self.delete_params();
        self.namespaced_pods(namespace)
            .delete(name, dp)
            .await
            .map(|deleted| {
                if deleted.is_left() {
                    tracing::debug!(namespace, name, "Pod deletion started");
                } else {
                    tracing::debug!(namespace, name, "Pod deleted");
                }
            })
    }
}

impl Debug for KubeApi {
    /// Formats the `KubeApi` for debugging, redacting the `client`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("list_params", &self.list_params)
            .field("delete_params", &self.delete_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
