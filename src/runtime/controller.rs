use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use super::persist::SettingsSink;
use crate::{
    catalog::{AppRecord, ListEntry, visible_entries},
    error::RouteError,
    policy::{
        DefaultMode, Mutation, PolicyStore, Resolution, Resolver, clear_override,
        set_default_mode, set_override, set_show_system_apps,
    },
};

const COMMAND_QUEUE_DEPTH: usize = 32;

type Reply<T> = oneshot::Sender<T>;

/// Requests understood by the policy controller
#[derive(Debug)]
pub enum PolicyCommand {
    ToggleOverride {
        package_id: String,
        route_on_vpn: bool,
        reply: Reply<Result<Mutation, RouteError>>,
    },
    ClearOverride {
        package_id: String,
        reply: Reply<Result<Mutation, RouteError>>,
    },
    SetDefaultMode {
        mode: DefaultMode,
        reply: Reply<Result<Mutation, RouteError>>,
    },
    SetShowSystemApps {
        show: bool,
        reply: Reply<Result<Mutation, RouteError>>,
    },
    Resolve {
        catalog: Vec<AppRecord>,
        reply: Reply<Resolution>,
    },
    Listing {
        catalog: Vec<AppRecord>,
        reply: Reply<Listing>,
    },
    Snapshot {
        reply: Reply<PolicyStore>,
    },
}

/// Resolution plus the rows to present, computed against one store state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    pub resolution: Resolution,
    pub entries: Vec<ListEntry>,
}

/// Sole owner and writer of the policy store
///
/// Commands are applied one at a time in arrival order. Every mutation that
/// changes the store is persisted before the reply is sent; a failed write
/// is reported to the caller while the in-memory change stays applied.
pub struct PolicyController<S: SettingsSink> {
    store: PolicyStore,
    sink: S,
    resolver: Resolver,
    receiver: mpsc::Receiver<PolicyCommand>,
}

impl<S: SettingsSink> PolicyController<S> {
    /// Start the controller task; it stops once every handle is dropped
    pub fn spawn(
        store: PolicyStore,
        sink: S,
        resolver: Resolver,
    ) -> (PolicyHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let controller = Self {
            store,
            sink,
            resolver,
            receiver,
        };
        let task = tokio::spawn(controller.run());
        (PolicyHandle { sender }, task)
    }

    async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            self.handle(command).await;
        }
        log::debug!("Policy controller stopped");
    }

    async fn handle(&mut self, command: PolicyCommand) {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            PolicyCommand::ToggleOverride {
                package_id,
                route_on_vpn,
                reply,
            } => {
                let mutation = set_override(&mut self.store, &package_id, route_on_vpn);
                let _ = reply.send(self.commit(mutation).await);
            }
            PolicyCommand::ClearOverride { package_id, reply } => {
                let mutation = clear_override(&mut self.store, &package_id);
                let _ = reply.send(self.commit(mutation).await);
            }
            PolicyCommand::SetDefaultMode { mode, reply } => {
                let mutation = set_default_mode(&mut self.store, mode);
                let _ = reply.send(self.commit(mutation).await);
            }
            PolicyCommand::SetShowSystemApps { show, reply } => {
                let mutation = set_show_system_apps(&mut self.store, show);
                let _ = reply.send(self.commit(mutation).await);
            }
            PolicyCommand::Resolve { catalog, reply } => {
                let _ = reply.send(self.resolver.resolve(&catalog, &self.store));
            }
            PolicyCommand::Listing { catalog, reply } => {
                let resolution = self.resolver.resolve(&catalog, &self.store);
                let entries = visible_entries(
                    &catalog,
                    &self.store,
                    &resolution,
                    self.resolver.host_package(),
                );
                let _ = reply.send(Listing {
                    resolution,
                    entries,
                });
            }
            PolicyCommand::Snapshot { reply } => {
                let _ = reply.send(self.store.clone());
            }
        }
    }

    async fn commit(&self, mutation: Mutation) -> Result<Mutation, RouteError> {
        if !mutation.is_changed() {
            return Ok(mutation);
        }
        if let Err(err) = self.sink.persist(&self.store).await {
            log::error!("Failed to persist policy store: {err}");
            return Err(err);
        }
        Ok(mutation)
    }
}

/// Cloneable front end to a running [`PolicyController`]
#[derive(Debug, Clone)]
pub struct PolicyHandle {
    sender: mpsc::Sender<PolicyCommand>,
}

impl PolicyHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> PolicyCommand,
    ) -> Result<T, RouteError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| RouteError::ControllerClosed)?;
        response.await.map_err(|_| RouteError::ControllerClosed)
    }

    pub async fn toggle_override(
        &self,
        package_id: impl Into<String>,
        route_on_vpn: bool,
    ) -> Result<Mutation, RouteError> {
        let package_id = package_id.into();
        self.request(|reply| PolicyCommand::ToggleOverride {
            package_id,
            route_on_vpn,
            reply,
        })
        .await?
    }

    pub async fn clear_override(
        &self,
        package_id: impl Into<String>,
    ) -> Result<Mutation, RouteError> {
        let package_id = package_id.into();
        self.request(|reply| PolicyCommand::ClearOverride { package_id, reply })
            .await?
    }

    pub async fn set_default_mode(&self, mode: DefaultMode) -> Result<Mutation, RouteError> {
        self.request(|reply| PolicyCommand::SetDefaultMode { mode, reply })
            .await?
    }

    pub async fn set_show_system_apps(&self, show: bool) -> Result<Mutation, RouteError> {
        self.request(|reply| PolicyCommand::SetShowSystemApps { show, reply })
            .await?
    }

    pub async fn resolve(&self, catalog: Vec<AppRecord>) -> Result<Resolution, RouteError> {
        self.request(|reply| PolicyCommand::Resolve { catalog, reply })
            .await
    }

    pub async fn listing(&self, catalog: Vec<AppRecord>) -> Result<Listing, RouteError> {
        self.request(|reply| PolicyCommand::Listing { catalog, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<PolicyStore, RouteError> {
        self.request(|reply| PolicyCommand::Snapshot { reply }).await
    }
}
