//! Per-resource service: the request pipeline.
//!
//! ## Pipeline
//!
//! ```text
//! Request
//!   ↓
//! 1. Authorize        (token permissions vs. the operation's permission)   → 403
//!   ↓
//! 2. Validate         (validator → Normalized)                              → 400
//!   ↓
//! 3. Resolve parent   (repository.find_by_pk)       rejected → 500/502, None → 404
//!   ↓
//! 4. Resolve child    (association.get)             rejected → 500/502, None → 404
//!   ↓
//! 5. Action           (find_all / create / update / destroy / association call) → 500/502
//!   ↓
//! Envelope { success: true, data }
//! ```
//!
//! Steps 3 and 4 only run for operations scoped to a parent / a single child.
//! Each step starts after the previous one settled and a failure stops the
//! pipeline. Nothing escapes [`Service::execute`] except the envelope.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::Instrument;

use depot_core::{Association, Linked, Record, RecordId, Resource};

use crate::{
    AssociationRepository, ConfigError, Envelope, ErrorCode, ErrorInfo, ErrorKind, Normalized, Operation,
    Payload, Repository, RepositoryError, Request, Step, ValidationError, Validator,
};

/// Operations of one resource, closed over their collaborators.
pub struct Service {
    resource: Resource,
    repository: Option<Arc<dyn Repository>>,
    validator: Option<Arc<dyn Validator>>,
    associations: HashMap<Association, Arc<dyn AssociationRepository>>,
}

/// Wiring for a [`Service`]. Every collaborator is optional, but at least one
/// must be supplied.
pub struct ServiceBuilder {
    resource: Resource,
    repository: Option<Arc<dyn Repository>>,
    validator: Option<Arc<dyn Validator>>,
    associations: HashMap<Association, Arc<dyn AssociationRepository>>,
}

impl ServiceBuilder {
    pub fn repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn association(mut self, association: Association, repository: Arc<dyn AssociationRepository>) -> Self {
        self.associations.insert(association, repository);
        self
    }

    pub fn build(self) -> Result<Service, ConfigError> {
        if self.repository.is_none() && self.validator.is_none() && self.associations.is_empty() {
            return Err(ConfigError::NoCollaborators(self.resource));
        }
        if let Some(&association) = self.associations.keys().find(|a| a.parent() != self.resource) {
            return Err(ConfigError::ForeignAssociation {
                resource: self.resource,
                association,
            });
        }

        Ok(Service {
            resource: self.resource,
            repository: self.repository,
            validator: self.validator,
            associations: self.associations,
        })
    }
}

/// Why a pipeline stopped, before it is turned into an [`ErrorInfo`].
#[derive(Debug)]
struct Failure {
    kind: ErrorKind,
    step: Step,
    message: String,
}

impl Failure {
    fn denied() -> Self {
        Self {
            kind: ErrorKind::AccessDenied,
            step: Step::Authorize,
            message: "access denied".to_string(),
        }
    }

    fn invalid(err: ValidationError) -> Self {
        Self {
            kind: ErrorKind::ValidationFailed,
            step: Step::Validate,
            message: err.message,
        }
    }

    fn missing_param(name: &str) -> Self {
        Self {
            kind: ErrorKind::ValidationFailed,
            step: Step::Validate,
            message: format!("params.{name} is required"),
        }
    }

    fn not_found(step: Step, what: &str) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            step,
            message: format!("{what} not found"),
        }
    }

    fn repository(step: Step, err: RepositoryError) -> Self {
        let kind = if err.is_unavailable() {
            ErrorKind::UpstreamUnavailable
        } else {
            ErrorKind::Repository
        };
        Self {
            kind,
            step,
            message: err.to_string(),
        }
    }

    fn not_wired(what: impl core::fmt::Display) -> Self {
        Self {
            kind: ErrorKind::NotWired,
            step: Step::Wiring,
            message: format!("{what} is not wired"),
        }
    }

    fn into_error_info(self, resource: Resource, operation: Operation) -> ErrorInfo {
        ErrorInfo::new(
            self.kind,
            self.message,
            Some(ErrorCode::new(resource, operation, self.step)),
        )
    }
}

impl Service {
    pub fn builder(resource: Resource) -> ServiceBuilder {
        ServiceBuilder {
            resource,
            repository: None,
            validator: None,
            associations: HashMap::new(),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Associations that have a repository wired in.
    pub fn associations(&self) -> impl Iterator<Item = Association> + '_ {
        self.associations.keys().copied()
    }

    /// Run one operation. Always settles to an envelope.
    pub async fn execute(&self, operation: Operation, request: &Request) -> Envelope<Payload> {
        let name = operation.name(self.resource);
        let span = tracing::info_span!("service", resource = %self.resource, operation = %name);

        match self.run(operation, request).instrument(span).await {
            Ok(payload) => Envelope::ok(payload),
            Err(failure) => {
                match failure.kind {
                    ErrorKind::Repository | ErrorKind::UpstreamUnavailable | ErrorKind::NotWired => {
                        tracing::warn!(operation = %name, step = ?failure.step, "{}", failure.message)
                    }
                    _ => tracing::debug!(operation = %name, step = ?failure.step, "{}", failure.message),
                }
                Envelope::err(failure.into_error_info(self.resource, operation))
            }
        }
    }

    pub async fn list(&self, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::List, request).await
    }

    pub async fn create(&self, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::Create, request).await
    }

    pub async fn get(&self, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::Get, request).await
    }

    pub async fn update(&self, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::Update, request).await
    }

    pub async fn delete(&self, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::Delete, request).await
    }

    pub async fn list_children(&self, association: Association, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::ListChildren(association), request).await
    }

    pub async fn add_children(&self, association: Association, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::AddChildren(association), request).await
    }

    pub async fn get_child(&self, association: Association, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::GetChild(association), request).await
    }

    pub async fn update_child(&self, association: Association, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::UpdateChild(association), request).await
    }

    pub async fn remove_child(&self, association: Association, request: &Request) -> Envelope<Payload> {
        self.execute(Operation::RemoveChild(association), request).await
    }

    async fn run(&self, operation: Operation, request: &Request) -> Result<Payload, Failure> {
        if !request.token.allows(&operation.permission(self.resource)) {
            return Err(Failure::denied());
        }

        let validator = self.validator.as_ref().ok_or_else(|| Failure::not_wired("validator"))?;
        let input = validator
            .validate(operation, request.raw())
            .await
            .map_err(Failure::invalid)?;

        match operation {
            Operation::List => self.find_all(&input).await,
            Operation::Create => self.create_record(input).await,
            Operation::Get => self.parent(&input).await.map(Payload::Record),
            Operation::Update => self.update_record(input).await,
            Operation::Delete => self.destroy_record(&input).await,
            Operation::ListChildren(a) => self.list_linked(a, &input).await,
            Operation::AddChildren(a) => self.add_linked(a, input).await,
            Operation::GetChild(a) => {
                let assoc = self.association(a)?;
                let parent = self.parent(&input).await?;
                let child = self.child(a, assoc, &parent, &input).await?;
                Ok(Payload::Linked(child))
            }
            Operation::UpdateChild(a) => self.update_linked(a, input).await,
            Operation::RemoveChild(a) => self.remove_linked(a, &input).await,
        }
    }

    fn repository(&self) -> Result<&dyn Repository, Failure> {
        self.repository
            .as_deref()
            .ok_or_else(|| Failure::not_wired(format!("{} repository", self.resource)))
    }

    fn association(&self, association: Association) -> Result<&dyn AssociationRepository, Failure> {
        if association.parent() != self.resource {
            return Err(Failure::not_wired(format!("{association} on {}", self.resource)));
        }
        self.associations
            .get(&association)
            .map(|a| a.as_ref())
            .ok_or_else(|| Failure::not_wired(format!("{association} repository")))
    }

    async fn parent(&self, input: &Normalized) -> Result<Record, Failure> {
        let repository = self.repository()?;
        let id = input.params.id.ok_or_else(|| Failure::missing_param("id"))?;

        match repository.find_by_pk(id, &input.query).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(Failure::not_found(Step::ParentMissing, self.resource.singular())),
            Err(e) => Err(Failure::repository(Step::FindParent, e)),
        }
    }

    async fn child(
        &self,
        association: Association,
        repository: &dyn AssociationRepository,
        parent: &Record,
        input: &Normalized,
    ) -> Result<Linked, Failure> {
        let child_id: RecordId = input.params.child_id.ok_or_else(|| Failure::missing_param("child_id"))?;

        match repository.get(parent, child_id, &input.query).await {
            Ok(Some(linked)) => Ok(linked),
            Ok(None) => Err(Failure::not_found(Step::ChildMissing, association.singular())),
            Err(e) => Err(Failure::repository(Step::FindChild, e)),
        }
    }

    async fn find_all(&self, input: &Normalized) -> Result<Payload, Failure> {
        let records = self
            .repository()?
            .find_all(&input.query)
            .await
            .map_err(|e| Failure::repository(Step::Action, e))?;
        Ok(Payload::Records(records))
    }

    async fn create_record(&self, input: Normalized) -> Result<Payload, Failure> {
        let record = self
            .repository()?
            .create(input.body)
            .await
            .map_err(|e| Failure::repository(Step::Action, e))?;
        Ok(Payload::Record(record))
    }

    async fn update_record(&self, input: Normalized) -> Result<Payload, Failure> {
        let parent = self.parent(&input).await?;
        let record = self
            .repository()?
            .update(&parent, input.body)
            .await
            .map_err(|e| Failure::repository(Step::Action, e))?;
        Ok(Payload::Record(record))
    }

    async fn destroy_record(&self, input: &Normalized) -> Result<Payload, Failure> {
        let parent = self.parent(input).await?;
        let record = self
            .repository()?
            .destroy(&parent, &input.query)
            .await
            .map_err(|e| Failure::repository(Step::Action, e))?;
        Ok(Payload::Record(record))
    }

    async fn list_linked(&self, association: Association, input: &Normalized) -> Result<Payload, Failure> {
        let assoc = self.association(association)?;
        let parent = self.parent(input).await?;
        let children = assoc
            .list(&parent, &input.query)
            .await
            .map_err(|e| Failure::repository(Step::Action, e))?;
        Ok(Payload::LinkedMany(children))
    }

    async fn add_linked(&self, association: Association, input: Normalized) -> Result<Payload, Failure> {
        let assoc = self.association(association)?;
        let parent = self.parent(&input).await?;
        // Child existence is left to the store's foreign-key checks.
        let added = assoc
            .add(&parent, &input.ids, input.body)
            .await
            .map_err(|e| Failure::repository(Step::Action, e))?;
        Ok(Payload::LinkedMany(added))
    }

    async fn update_linked(&self, association: Association, input: Normalized) -> Result<Payload, Failure> {
        let assoc = self.association(association)?;
        let parent = self.parent(&input).await?;
        let child = self.child(association, assoc, &parent, &input).await?;

        let updated = match child.link {
            // Many-to-many: the join row is what gets updated, not the child.
            Some(link) => assoc
                .update_link(&link, input.body)
                .await
                .map(|link| Linked::through(child.record, link)),
            None => assoc.update_child(&child.record, input.body).await.map(Linked::direct),
        }
        .map_err(|e| Failure::repository(Step::Action, e))?;

        Ok(Payload::Linked(updated))
    }

    async fn remove_linked(&self, association: Association, input: &Normalized) -> Result<Payload, Failure> {
        let assoc = self.association(association)?;
        let parent = self.parent(input).await?;
        let child = self.child(association, assoc, &parent, input).await?;
        let removed = assoc
            .remove(&parent, &child)
            .await
            .map_err(|e| Failure::repository(Step::Action, e))?;
        Ok(Payload::Linked(removed))
    }
}

impl core::fmt::Debug for Service {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Service")
            .field("resource", &self.resource)
            .field("repository", &self.repository.is_some())
            .field("validator", &self.validator.is_some())
            .field("associations", &self.associations.keys().collect::<Vec<_>>())
            .finish()
    }
}
