//! The four lifecycle verbs for one managed resource.

use crate::cancel::CancelToken;
use crate::client::RemoteClient;
use crate::clock::{Clock, SystemClock};
use crate::config::{ReconcilerConfig, RetryConfig};
use crate::error::{Error, RemoteError, Result};
use crate::retry::{LogCallback, RetryCallback, retry_until};
use crate::types::{ManagedResource, OperationHandle, ResourceStatus, Submitted};
use crate::waiter::OperationWaiter;
use attrtree::{AttributeChange, AttributeTree, RemoteModel, ResourceSchema, diff, expand, flatten};
use std::sync::Arc;

/// Reconciles one remote object against its declared attributes.
///
/// Lifecycle: `Absent → Creating → Present → Deleting → Absent`. If a remote
/// mutation succeeds but the wait or read that follows fails, the status
/// becomes [`ResourceStatus::Unknown`] and the identifier is kept so a later
/// [`read`](Self::read) can recover.
pub struct Reconciler<C> {
    client: C,
    schema: Arc<ResourceSchema>,
    config: ReconcilerConfig,
    clock: Arc<dyn Clock>,
    cancel: CancelToken,
    resource: ManagedResource,
}

impl<C: RemoteClient> Reconciler<C> {
    /// Create a reconciler for an absent resource.
    ///
    /// Fails with a contract violation if the schema is invalid.
    pub fn new(
        client: C,
        schema: impl Into<Arc<ResourceSchema>>,
        config: ReconcilerConfig,
    ) -> Result<Self> {
        let schema = schema.into();
        schema.validate()?;
        Ok(Self {
            client,
            schema,
            config,
            clock: Arc::new(SystemClock),
            cancel: CancelToken::new(),
            resource: ManagedResource::new(),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Share a cancellation token with an enclosing orchestrator
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn external_id(&self) -> Option<&str> {
        self.resource.external_id()
    }

    pub fn observed(&self) -> &AttributeTree {
        self.resource.observed()
    }

    pub fn status(&self) -> ResourceStatus {
        self.resource.status()
    }

    pub fn resource(&self) -> &ManagedResource {
        &self.resource
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Create the remote object and read it back.
    pub fn create(&mut self, declared: AttributeTree) -> Result<()> {
        if let Some(id) = self.resource.external_id() {
            return Err(Error::contract(format!(
                "{} {id} already exists; update or delete it instead",
                self.schema.type_name
            )));
        }

        let request = expand(&declared, &self.schema.block)?;
        let context = format!("creating {}", self.schema.type_name);

        log::info!("Creating {}", self.schema.type_name);
        self.resource.set_status(ResourceStatus::Creating);

        let submitted = match self.retry(&context, &self.config.create, || self.client.create(&request)) {
            Ok(submitted) => submitted,
            Err(e) => {
                self.resource.set_status(ResourceStatus::Absent);
                return Err(e);
            }
        };

        let (id, pending) = match submitted {
            Submitted::Complete(model) => match self.schema.identifier(&model) {
                Some(id) => (id, None),
                None => {
                    self.resource.mark_unknown();
                    return Err(Error::malformed(format!(
                        "create response for {} lacks identifier field {:?}",
                        self.schema.type_name, self.schema.id_field
                    )));
                }
            },
            Submitted::Pending(handle) => {
                let Some(id) = handle.target.clone().filter(|id| !id.is_empty()) else {
                    self.resource.mark_unknown();
                    return Err(Error::malformed(format!(
                        "create operation {} for {} does not name its object",
                        handle.token, self.schema.type_name
                    )));
                };
                (id, Some(handle))
            }
        };

        // Exists remotely from here on; later failures leave it Unknown.
        self.resource.assign_id(id.clone());
        self.resource.set_declared(declared);

        if let Some(handle) = pending
            && let Err(e) = self.wait(&handle)
        {
            self.resource.mark_unknown();
            return Err(e);
        }

        let budget = self.config.create.clone();
        if let Err(e) = self.read_after_write(&id, &budget) {
            self.resource.mark_unknown();
            return Err(e);
        }
        log::info!("Created {} {id}", self.schema.type_name);
        Ok(())
    }

    /// Refresh `observed` from the remote object.
    ///
    /// A remote not-found means the object disappeared out of band: the
    /// resource becomes absent and no error is returned.
    pub fn read(&mut self) -> Result<()> {
        let id = self.require_id("read")?;

        log::debug!("Reading {} {id}", self.schema.type_name);
        match self.client.get(&id) {
            Ok(model) => self.record(&model),
            Err(e) if e.is_not_found() => {
                log::info!(
                    "{} {id} no longer exists; treating it as absent",
                    self.schema.type_name
                );
                self.resource.forget();
                Ok(())
            }
            Err(e) => Err(Error::Remote {
                context: format!("reading {} {id}", self.schema.type_name),
                source: e,
            }),
        }
    }

    /// Update the remote object in place and read it back.
    ///
    /// Changes to immutable attributes are rejected before any remote call.
    pub fn update(&mut self, declared: AttributeTree) -> Result<()> {
        let id = self.require_id("update")?;

        let changes = diff(&self.baseline(), &declared, &self.schema.block);
        if let Some(change) = changes.iter().find(|c| c.requires_replacement) {
            return Err(Error::ImmutableAttribute {
                attribute: change.path.clone(),
                id,
            });
        }

        let request = expand(&declared, &self.schema.block)?;
        let context = format!("updating {} {id}", self.schema.type_name);

        log::info!(
            "Updating {} {id} ({} changed attributes)",
            self.schema.type_name,
            changes.len()
        );
        let submitted = self.retry(&context, &self.config.update, || self.client.update(&id, &request))?;

        if let Submitted::Pending(handle) = &submitted {
            if let Err(e) = self.wait(handle) {
                self.resource.mark_unknown();
                return Err(e);
            }
        }

        self.resource.set_declared(declared);

        let budget = self.config.update.clone();
        if let Err(e) = self.read_after_write(&id, &budget) {
            self.resource.mark_unknown();
            return Err(e);
        }
        Ok(())
    }

    /// Delete the remote object.
    ///
    /// Idempotent: an object that is already gone, remotely or locally,
    /// counts as deleted. When the schema's retain flag is set in the
    /// declared tree the object is forgotten without a remote call.
    pub fn delete(&mut self) -> Result<()> {
        let Some(id) = self.resource.external_id().map(str::to_string) else {
            log::debug!("{} is already absent; nothing to delete", self.schema.type_name);
            self.resource.forget();
            return Ok(());
        };

        if self.retained() {
            log::warn!(
                "{} {id} is marked retain-on-delete; removing it from management only",
                self.schema.type_name
            );
            self.resource.forget();
            return Ok(());
        }

        let context = format!("deleting {} {id}", self.schema.type_name);
        let prior = self.resource.status();

        log::info!("Deleting {} {id}", self.schema.type_name);
        self.resource.set_status(ResourceStatus::Deleting);

        let outcome = self.retry(&context, &self.config.delete, || match self.client.delete(&id) {
            Err(e) if e.is_not_found() => {
                log::debug!("{id} was already deleted");
                Ok(None)
            }
            other => other,
        });
        let handle = match outcome {
            Ok(handle) => handle,
            Err(e) => {
                self.resource.set_status(prior);
                return Err(e);
            }
        };

        if let Some(handle) = handle {
            if let Err(e) = self.wait(&handle) {
                self.resource.mark_unknown();
                return Err(e);
            }
        }

        self.resource.forget();
        log::info!("Deleted {} {id}", self.schema.type_name);
        Ok(())
    }

    /// Adopt an existing remote object by identifier.
    pub fn import(&mut self, id: &str) -> Result<()> {
        if let Some(existing) = self.resource.external_id() {
            return Err(Error::contract(format!(
                "cannot import {id}: already managing {} {existing}",
                self.schema.type_name
            )));
        }

        log::info!("Importing {} {id}", self.schema.type_name);
        let model = self.client.get(id).map_err(|e| Error::Remote {
            context: format!("importing {} {id}", self.schema.type_name),
            source: e,
        })?;

        let observed = self.flatten_observed(&model)?;
        self.resource.assign_id(id.to_string());
        self.resource.observe(observed);
        Ok(())
    }

    /// Changes needed to bring the last observed state to `declared`.
    pub fn plan(&self, declared: &AttributeTree) -> Vec<AttributeChange> {
        diff(self.resource.observed(), declared, &self.schema.block)
    }

    fn require_id(&self, verb: &str) -> Result<String> {
        self.resource
            .external_id()
            .map(str::to_string)
            .ok_or_else(|| {
                Error::contract(format!(
                    "cannot {verb} {}: it has not been created",
                    self.schema.type_name
                ))
            })
    }

    /// Last declared tree, with attributes it does not mention taken from `observed`.
    fn baseline(&self) -> AttributeTree {
        let mut baseline = self.resource.declared().clone();
        for (name, value) in self.resource.observed().iter() {
            if !baseline.contains(name) {
                baseline.insert(name, value.clone());
            }
        }
        baseline
    }

    fn retained(&self) -> bool {
        match &self.schema.retain_flag {
            Some(flag) => matches!(self.resource.declared().get_bool(flag), Ok(Some(true))),
            None => false,
        }
    }

    fn retry<T, F>(&self, context: &str, config: &RetryConfig, operation: F) -> Result<T>
    where
        F: FnMut() -> std::result::Result<T, RemoteError>,
    {
        let callback: &dyn RetryCallback = &LogCallback;
        retry_until(
            context,
            config,
            self.clock.as_ref(),
            &self.cancel,
            Some(callback),
            operation,
        )
    }

    fn wait(&self, handle: &OperationHandle) -> Result<String> {
        log::debug!("Waiting for operation {}", handle.token);
        OperationWaiter::new(&self.config.wait, self.clock.as_ref(), &self.cancel)
            .wait(handle, |h| self.client.operation_status(h))
    }

    /// Read back after a mutation; not-found is retried as eventual consistency.
    fn read_after_write(&mut self, id: &str, budget: &RetryConfig) -> Result<()> {
        let context = format!("reading {} {id}", self.schema.type_name);
        let model = self.retry(&context, budget, || {
            self.client
                .get(id)
                .map_err(|e| if e.is_not_found() { e.as_eventual() } else { e })
        })?;
        self.record(&model)
    }

    fn record(&mut self, model: &RemoteModel) -> Result<()> {
        match self.flatten_observed(model) {
            Ok(observed) => {
                self.resource.observe(observed);
                Ok(())
            }
            Err(e) => {
                self.resource.mark_unknown();
                Err(e)
            }
        }
    }

    /// Flatten a response and carry over local-only attributes from `declared`.
    fn flatten_observed(&self, model: &RemoteModel) -> Result<AttributeTree> {
        let mut observed = flatten(model, &self.schema.block)?;
        for attr in self.schema.local_attrs() {
            if let Some(value) = self.resource.declared().get(&attr.name) {
                observed.insert(&attr.name, value.clone());
            }
        }
        Ok(observed)
    }
}
