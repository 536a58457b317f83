pub use k8s_openapi as openapi;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

/// Waiting reason the kubelet reports for a container it keeps restarting.
pub const CRASH_LOOP_BACK_OFF: &str = "CrashLoopBackOff";

pub trait ContainerStatusExt {
    fn waiting(name: impl ToString, reason: impl ToString) -> Self;
    fn running(name: impl ToString) -> Self;
    fn waiting_reason(&self) -> Option<&str>;
    fn is_crash_looping(&self) -> bool;
}

impl ContainerStatusExt for corev1::ContainerStatus {
    fn waiting(name: impl ToString, reason: impl ToString) -> Self {
        let waiting = corev1::ContainerStateWaiting {
            reason: Some(reason.to_string()),
            ..default()
        };
        let state = corev1::ContainerState {
            waiting: Some(waiting),
            ..default()
        };
        Self {
            name: name.to_string(),
            state: Some(state),
            ..default()
        }
    }

    fn running(name: impl ToString) -> Self {
        let state = corev1::ContainerState {
            running: Some(default()),
            ..default()
        };
        Self {
            name: name.to_string(),
            ready: true,
            started: Some(true),
            state: Some(state),
            ..default()
        }
    }

    /// Reason of the current waiting state, if the container is waiting at all.
    fn waiting_reason(&self) -> Option<&str> {
        self.state.as_ref()?.waiting.as_ref()?.reason.as_deref()
    }

    fn is_crash_looping(&self) -> bool {
        self.waiting_reason() == Some(CRASH_LOOP_BACK_OFF)
    }
}

pub trait PodExt {
    fn new(name: impl ToString, namespace: impl ToString) -> Self;
    fn with_container_statuses(
        self,
        statuses: impl IntoIterator<Item = corev1::ContainerStatus>,
    ) -> Self;
    fn container_statuses(&self) -> &[corev1::ContainerStatus];
    fn is_crash_looping(&self) -> bool;
}

impl PodExt for corev1::Pod {
    fn new(name: impl ToString, namespace: impl ToString) -> Self {
        let metadata = metav1::ObjectMeta::with_namespace(name, namespace);
        Self {
            metadata,
            ..default()
        }
    }

    fn with_container_statuses(
        self,
        statuses: impl IntoIterator<Item = corev1::ContainerStatus>,
    ) -> Self {
        let status = corev1::PodStatus {
            container_statuses: Some(statuses.into_iter().collect()),
            ..self.status.unwrap_or_default()
        };
        Self {
            status: Some(status),
            ..self
        }
    }

    /// Regular container statuses; an absent status or list is empty.
    fn container_statuses(&self) -> &[corev1::ContainerStatus] {
        self.status
            .as_ref()
            .and_then(|status| status.container_statuses.as_deref())
            .unwrap_or_default()
    }

    /// True when any container is waiting with reason `CrashLoopBackOff`.
    fn is_crash_looping(&self) -> bool {
        self.container_statuses()
            .iter()
            .any(|status| status.is_crash_looping())
    }
}

pub trait ObjectMetaExt {
    fn new(name: impl ToString) -> Self;
    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self;
}

impl ObjectMetaExt for metav1::ObjectMeta {
    fn new(name: impl ToString) -> Self {
        let name = Some(name.to_string());
        Self { name, ..default() }
    }

    fn with_namespace(name: impl ToString, namespace: impl ToString) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Self::new(name)
        }
    }
}

pub fn default<T: Default>() -> T {
    T::default()
}
