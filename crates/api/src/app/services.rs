use std::collections::HashMap;
use std::sync::Arc;

use depot_core::Resource;
use depot_infra::{InMemoryDatabase, SchemaValidator};
use depot_service::{ConfigError, Service};

use crate::config::Environment;

/// Every resource service, sharing one backing store.
#[derive(Debug)]
pub struct AppServices {
    services: HashMap<Resource, Service>,
    environment: Environment,
}

impl AppServices {
    pub fn service(&self, resource: Resource) -> Option<&Service> {
        self.services.get(&resource)
    }

    /// Whether error bodies must be reduced to `{ message, code, status }`.
    pub fn redact_errors(&self) -> bool {
        self.environment.is_production()
    }
}

pub fn build_services(environment: Environment) -> Result<AppServices, ConfigError> {
    build_services_with(Arc::new(InMemoryDatabase::new()), environment)
}

/// Wire every resource over `database`: its repository, its schema
/// validator and a repository per owned association.
pub fn build_services_with(database: Arc<InMemoryDatabase>, environment: Environment) -> Result<AppServices, ConfigError> {
    let mut services = HashMap::new();

    for resource in Resource::ALL {
        let mut builder = Service::builder(resource)
            .repository(Arc::new(database.repository(resource)))
            .validator(Arc::new(SchemaValidator::new(resource)));
        for association in resource.associations() {
            builder = builder.association(association, database.association(association));
        }
        services.insert(resource, builder.build()?);
    }

    tracing::info!(resources = services.len(), ?environment, "services wired");

    Ok(AppServices {
        services,
        environment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_is_wired_with_its_associations() {
        let app = build_services(Environment::Development).unwrap();
        for resource in Resource::ALL {
            let service = app.service(resource).unwrap();
            assert_eq!(service.associations().count(), resource.associations().count());
        }
        assert!(!app.redact_errors());
    }
}
