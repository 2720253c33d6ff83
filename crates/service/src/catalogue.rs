//! Every permission the backend can ask for.

use depot_auth::Permission;
use depot_core::Resource;

use crate::Operation;

/// Sorted, de-duplicated list of all operation permissions.
pub fn permissions() -> Vec<Permission> {
    let mut all: Vec<Permission> = Resource::ALL
        .into_iter()
        .flat_map(|resource| {
            Operation::all_for(resource)
                .into_iter()
                .map(move |op| op.permission(resource))
        })
        .collect();
    all.sort();
    all.dedup();
    all
}

/// Permissions of one resource, in operation order.
pub fn permissions_for(resource: Resource) -> Vec<Permission> {
    Operation::all_for(resource)
        .into_iter()
        .map(|op| op.permission(resource))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_covers_every_operation() {
        let all = permissions();
        for resource in Resource::ALL {
            for p in permissions_for(resource) {
                assert!(all.binary_search(&p).is_ok(), "{p}");
            }
        }
    }

    #[test]
    fn order_has_crud_plus_three_associations() {
        assert_eq!(permissions_for(Resource::Order).len(), 5 + 3 * 5);
        assert_eq!(permissions_for(Resource::Customer).len(), 5);
    }
}
