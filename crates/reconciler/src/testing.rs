//! Test support: an in-memory remote client and a sample resource schema.

use crate::client::RemoteClient;
use crate::error::{RemoteError, RemoteErrorKind};
use crate::types::{OperationHandle, Submitted};
use attrtree::{AttrSchema, BlockSchema, RemoteModel, ResourceSchema};
use serde_json::{Map, Value as Json, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// A recorded client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Create,
    Get(String),
    Update(String),
    Delete(String),
    Status(String),
}

impl Call {
    pub(crate) fn is_mutation(&self) -> bool {
        matches!(self, Call::Create | Call::Update(_) | Call::Delete(_))
    }
}

#[derive(Debug, Default)]
struct FakeState {
    objects: HashMap<String, RemoteModel>,
    calls: Vec<Call>,
    failures: HashMap<&'static str, VecDeque<RemoteError>>,
    statuses: VecDeque<String>,
    defaults: Map<String, Json>,
    hidden_reads: u32,
    omit_id: bool,
    next_op: u32,
}

/// In-memory remote API with scripted failures.
#[derive(Debug)]
pub(crate) struct FakeClient {
    id_field: String,
    asynchronous: bool,
    state: Mutex<FakeState>,
}

impl FakeClient {
    pub(crate) fn new(id_field: &str) -> Self {
        Self {
            id_field: id_field.to_string(),
            asynchronous: false,
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Mutations return operation handles instead of completing inline
    pub(crate) fn asynchronous(mut self) -> Self {
        self.asynchronous = true;
        self
    }

    /// Field the remote fills in on create and keeps across updates
    pub(crate) fn with_default(self, field: &str, value: Json) -> Self {
        self.lock().defaults.insert(field.to_string(), value);
        self
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Queue an error for the next call of `verb` (create/get/update/delete/status)
    pub(crate) fn fail_next(&self, verb: &'static str, error: RemoteError) {
        self.lock().failures.entry(verb).or_default().push_back(error);
    }

    /// Statuses returned by successive operation polls; "DONE" once exhausted
    pub(crate) fn script_statuses(&self, statuses: &[&str]) {
        self.lock()
            .statuses
            .extend(statuses.iter().map(|s| (*s).to_string()));
    }

    /// Make the next `n` reads report not-found even if the object exists
    pub(crate) fn hide_reads(&self, n: u32) {
        self.lock().hidden_reads = n;
    }

    /// Drop the identifier from create responses
    pub(crate) fn omit_id(&self) {
        self.lock().omit_id = true;
    }

    pub(crate) fn insert(&self, model: RemoteModel) {
        let id = model
            .get(&self.id_field)
            .and_then(Json::as_str)
            .unwrap()
            .to_string();
        self.lock().objects.insert(id, model);
    }

    /// Delete an object behind the reconciler's back
    pub(crate) fn remove(&self, id: &str) {
        self.lock().objects.remove(id);
    }

    pub(crate) fn object(&self, id: &str) -> Option<RemoteModel> {
        self.lock().objects.get(id).cloned()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub(crate) fn mutation_count(&self) -> usize {
        self.lock().calls.iter().filter(|c| c.is_mutation()).count()
    }

    fn begin(&self, call: Call, verb: &'static str) -> Result<MutexGuard<'_, FakeState>, RemoteError> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(err) = state.failures.get_mut(verb).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        Ok(state)
    }

    fn stored(&self, state: &FakeState, id: &str, request: &RemoteModel, previous: Option<&RemoteModel>) -> RemoteModel {
        let mut model = request.clone();
        model.insert(&self.id_field, json!(id));
        for (field, value) in &state.defaults {
            if !model.contains(field) {
                let kept = previous.and_then(|p| p.get(field)).cloned();
                model.insert(field, kept.unwrap_or_else(|| value.clone()));
            }
        }
        model
    }

    fn handle(&self, state: &mut FakeState, id: &str) -> OperationHandle {
        state.next_op += 1;
        OperationHandle::new(format!("op-{}", state.next_op), ["PENDING", "RUNNING"], ["DONE"])
            .for_object(id)
            .with_initial_status("PENDING")
    }
}

impl RemoteClient for FakeClient {
    fn create(&self, request: &RemoteModel) -> Result<Submitted, RemoteError> {
        let mut state = self.begin(Call::Create, "create")?;
        let id = request
            .get(&self.id_field)
            .and_then(Json::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("obj-{}", state.objects.len() + 1));
        if state.objects.contains_key(&id) {
            return Err(RemoteError::new(RemoteErrorKind::Invalid, format!("{id} already exists")));
        }

        let model = self.stored(&state, &id, request, None);
        state.objects.insert(id.clone(), model.clone());

        if self.asynchronous {
            return Ok(Submitted::Pending(self.handle(&mut state, &id)));
        }
        let mut response = model;
        if state.omit_id {
            response.remove(&self.id_field);
        }
        Ok(Submitted::Complete(response))
    }

    fn get(&self, id: &str) -> Result<RemoteModel, RemoteError> {
        let mut state = self.begin(Call::Get(id.to_string()), "get")?;
        if state.hidden_reads > 0 {
            state.hidden_reads -= 1;
            return Err(RemoteError::from_status(404, "not visible yet"));
        }
        state
            .objects
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::from_status(404, &format!("{id} not found")))
    }

    fn update(&self, id: &str, request: &RemoteModel) -> Result<Submitted, RemoteError> {
        let mut state = self.begin(Call::Update(id.to_string()), "update")?;
        let Some(previous) = state.objects.get(id).cloned() else {
            return Err(RemoteError::from_status(404, &format!("{id} not found")));
        };
        let model = self.stored(&state, id, request, Some(&previous));
        state.objects.insert(id.to_string(), model.clone());

        if self.asynchronous {
            return Ok(Submitted::Pending(self.handle(&mut state, id)));
        }
        Ok(Submitted::Complete(model))
    }

    fn delete(&self, id: &str) -> Result<Option<OperationHandle>, RemoteError> {
        let mut state = self.begin(Call::Delete(id.to_string()), "delete")?;
        if state.objects.remove(id).is_none() {
            return Err(RemoteError::from_status(404, &format!("{id} not found")));
        }
        if self.asynchronous {
            return Ok(Some(self.handle(&mut state, id)));
        }
        Ok(None)
    }

    fn operation_status(&self, handle: &OperationHandle) -> Result<String, RemoteError> {
        let mut state = self.begin(Call::Status(handle.token.clone()), "status")?;
        Ok(state.statuses.pop_front().unwrap_or_else(|| "DONE".to_string()))
    }
}

/// A build-project-like schema exercising every attribute flavour.
pub(crate) fn project_schema() -> ResourceSchema {
    ResourceSchema::new(
        "test_project",
        "Name",
        BlockSchema::new(vec![
            AttrSchema::string("name").wire("Name").required().immutable(),
            AttrSchema::string("description")
                .wire("Description")
                .optional_computed(),
            AttrSchema::string("arn").wire("Arn").computed(),
            AttrSchema::int("timeout").wire("TimeoutInMinutes"),
            AttrSchema::map("tags").wire("Tags"),
            AttrSchema::single_set(
                "artifacts",
                BlockSchema::new(vec![
                    AttrSchema::string("type").wire("Type").required(),
                    AttrSchema::string("location").wire("Location"),
                ]),
                &["type"],
            )
            .wire("Artifacts")
            .required(),
            AttrSchema::bool("retain_on_delete").local(),
        ]),
    )
    .with_retain_flag("retain_on_delete")
}
