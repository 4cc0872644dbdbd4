//! Readiness waits built on [`ReadinessPoller`].

use aci_core::{ContainerGroup, ResourceGroup};
use aci_poller::{PollError, Polled, Probe, ReadinessPoller};
use tracing::{debug, instrument};

use crate::directory::{ContainerGroupDirectory, ResourceGroupDirectory};
use crate::error::AzureError;

/// Wait until a container group is visible.
#[instrument(skip(directory, poller))]
pub async fn wait_for_container_group<D: ContainerGroupDirectory>(
    directory: &D,
    resource_group: &str,
    name: &str,
    poller: &ReadinessPoller,
) -> Result<Polled<ContainerGroup>, PollError<AzureError>> {
    let resource = format!("{resource_group}/{name}");
    poller
        .wait_for(
            &resource,
            || directory.get_container_group(resource_group, name),
            |_| true,
        )
        .await
}

/// Wait until a container group reports [`aci_core::LifecycleState::Running`].
///
/// A group whose provisioning failed, or whose lifecycle state can no longer
/// reach `Running` on its own (`Failed`, `Stopped`, `Terminated`, `Succeeded`),
/// ends the wait with [`AzureError::ProvisioningFailed`]. A group that has
/// vanished is treated as not yet visible.
#[instrument(skip(directory, handle, poller), fields(resource = %handle.resource_id()))]
pub async fn wait_until_running<D: ContainerGroupDirectory>(
    directory: &D,
    handle: &ContainerGroup,
    poller: &ReadinessPoller,
) -> Result<Polled<ContainerGroup>, PollError<AzureError>> {
    let resource = handle.resource_id().to_string();
    poller
        .poll(&resource, move || async move {
            match directory.refresh_container_group(handle).await {
                Ok(group) if group.is_running() => Ok(Probe::Ready(group)),
                Ok(group) if group.state.is_terminal() || group.provisioning_state.is_failure() => {
                    let state = if group.state.is_terminal() {
                        group.state.as_str().to_owned()
                    } else {
                        group.provisioning_state.as_str().to_owned()
                    };
                    Err(AzureError::ProvisioningFailed {
                        resource: group.resource_id().to_string(),
                        state,
                    })
                }
                Ok(group) => Ok(Probe::NotReady(group)),
                Err(err) if err.is_not_found() => Ok(Probe::Absent),
                Err(err) => Err(err),
            }
        })
        .await
}

/// Wait until a resource group no longer exists.
#[instrument(skip(directory, poller))]
pub async fn wait_for_resource_group_deletion<D: ResourceGroupDirectory>(
    directory: &D,
    name: &str,
    poller: &ReadinessPoller,
) -> Result<Polled<()>, PollError<AzureError>> {
    poller
        .poll(name, move || async move {
            let found: Option<ResourceGroup> = directory.get_resource_group(name).await?;
            Ok::<_, AzureError>(match found {
                Some(group) => {
                    debug!(state = %group.provisioning_state, "resource group still present");
                    Probe::NotReady(())
                }
                None => Probe::Ready(()),
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aci_core::{
        ContainerDefinition, ContainerGroupDefinition, LifecycleState, ResourceGroupDefinition,
    };
    use aci_poller::{CancellationToken, Observation, PollConfig, progress_channel};
    use tokio::time::Instant;

    use super::*;
    use crate::memory::MemoryCloud;

    const RG: &str = "rg-aci-demo01";
    const CG: &str = "aci-demo01";

    async fn seeded(cloud: MemoryCloud) -> (MemoryCloud, ContainerGroup) {
        cloud
            .create_resource_group(&ResourceGroupDefinition::new(RG))
            .await
            .unwrap();
        let handle = cloud
            .create_container_group(
                &ContainerGroupDefinition::new(CG)
                    .with_existing_resource_group(RG)
                    .define_container(
                        ContainerDefinition::new("aci-demo01-1")
                            .with_image("mcr.microsoft.com/azuredocs/aci-helloworld")
                            .with_external_tcp_port(80),
                    )
                    .with_dns_prefix(CG),
            )
            .await
            .unwrap();
        (cloud, handle)
    }

    fn assert_elapsed(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual <= expected + Duration::from_millis(5),
            "elapsed {actual:?}, expected {expected:?}"
        );
    }

    fn poller() -> ReadinessPoller {
        ReadinessPoller::new(PollConfig::fixed(Duration::from_secs(1)))
    }

    #[tokio::test(start_paused = true)]
    async fn existence_then_running() {
        let (cloud, handle) = seeded(
            MemoryCloud::new()
                .with_visible_after(2)
                .with_running_after(1),
        )
        .await;
        let start = Instant::now();

        let visible = wait_for_container_group(&cloud, RG, CG, &poller())
            .await
            .unwrap();
        assert_eq!(visible.attempts, 3);
        assert_eq!(visible.value.state, LifecycleState::Pending);

        let running = wait_until_running(&cloud, &handle, &poller()).await.unwrap();
        assert_eq!(running.attempts, 1);
        assert!(running.value.is_running());
        assert!(running.value.ip_address.is_some());
        assert_elapsed(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn running_wait_reports_progress() {
        let (cloud, handle) = seeded(
            MemoryCloud::new()
                .with_visible_after(2)
                .with_running_after(1),
        )
        .await;
        let (tx, mut rx) = progress_channel();

        let running = wait_until_running(&cloud, &handle, &poller().with_progress(tx))
            .await
            .unwrap();
        assert_eq!(running.attempts, 4);
        assert_elapsed(running.elapsed, Duration::from_secs(3));

        let mut observations = Vec::new();
        while let Ok(event) = rx.try_recv() {
            observations.push(event.observation);
        }
        assert_eq!(
            observations,
            vec![
                Observation::Absent,
                Observation::Absent,
                Observation::NotReady,
                Observation::Ready,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failed_group_ends_the_wait() {
        let (cloud, handle) = seeded(MemoryCloud::new().with_running_after(10)).await;
        cloud.set_lifecycle_state(RG, CG, LifecycleState::Failed);

        let err = wait_until_running(&cloud, &handle, &poller())
            .await
            .unwrap_err();
        assert!(matches!(
            err.lookup_error(),
            Some(AzureError::ProvisioningFailed { state, .. }) if state == "Failed"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_or_terminated_group_ends_the_wait() {
        for state in [LifecycleState::Stopped, LifecycleState::Terminated] {
            let (cloud, handle) = seeded(MemoryCloud::new().with_running_after(10)).await;
            cloud.set_lifecycle_state(RG, CG, state.clone());
            let poller = ReadinessPoller::new(
                PollConfig::fixed(Duration::from_secs(1)).with_max_attempts(500),
            );

            let err = wait_until_running(&cloud, &handle, &poller)
                .await
                .unwrap_err();
            assert!(
                matches!(
                    err.lookup_error(),
                    Some(AzureError::ProvisioningFailed { state: label, .. }) if label == state.as_str()
                ),
                "{err:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_group_times_out() {
        let (cloud, handle) = seeded(MemoryCloud::new().with_running_after(u32::MAX)).await;
        let poller = ReadinessPoller::new(
            PollConfig::fixed(Duration::from_secs(1)).with_timeout(Duration::from_secs(10)),
        );

        let err = wait_until_running(&cloud, &handle, &poller)
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::TimedOut { .. }));
        assert!(err.is_exhausted());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_wait_returns_promptly() {
        let (cloud, _) = seeded(MemoryCloud::new().with_visible_after(u32::MAX)).await;
        let token = CancellationToken::new();
        let poller = poller().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            token.cancel();
        });
        let err = wait_for_container_group(&cloud, RG, CG, &poller)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, PollError::Cancelled { attempts: 3, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn resource_group_deletion_completes() {
        let (cloud, _) = seeded(MemoryCloud::new().with_visible_after(2)).await;
        cloud.delete_resource_group(RG).await.unwrap();

        let deleted = wait_for_resource_group_deletion(&cloud, RG, &poller())
            .await
            .unwrap();
        assert_eq!(deleted.attempts, 3);
        assert_eq!(deleted.sleeps(), 2);
    }
}
