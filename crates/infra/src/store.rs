//! In-memory persistence for tests and development.
//!
//! One [`InMemoryDatabase`] holds every table behind a single lock; the
//! repositories handed to services are cheap views over it. The store
//! enforces the constraints a relational backend would: unique columns,
//! foreign keys (including the children of an association add), soft
//! deletion and cascading join-row removal on hard deletes.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use depot_core::{Association, AssociationKind, Fields, Link, Linked, Record, RecordId, Resource};
use depot_service::{
    AssociationRepository, QueryOptions, RepoResult, Repository, RepositoryError, RepositoryErrorKind,
};

use crate::schema;

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Resource, Vec<Record>>,
    links: HashMap<Association, Vec<Link>>,
}

/// Shared in-memory backing store.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    inner: RwLock<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository over the table of `resource`.
    pub fn repository(self: &Arc<Self>, resource: Resource) -> InMemoryRepository {
        InMemoryRepository {
            db: Arc::clone(self),
            resource,
        }
    }

    /// Repository for `association`, shaped after its storage kind.
    pub fn association(self: &Arc<Self>, association: Association) -> Arc<dyn AssociationRepository> {
        match association.kind() {
            AssociationKind::HasMany { foreign_key } => Arc::new(InMemoryHasMany {
                db: Arc::clone(self),
                association,
                foreign_key,
            }),
            AssociationKind::BelongsToMany => Arc::new(InMemoryBelongsToMany {
                db: Arc::clone(self),
                association,
            }),
        }
    }

    /// Number of live (not soft-deleted) rows in a table.
    pub fn count(&self, resource: Resource) -> usize {
        self.read()
            .map(|t| t.table(resource).iter().filter(|r| !r.is_deleted()).count())
            .unwrap_or(0)
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| RepositoryError::unavailable("store lock poisoned"))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| RepositoryError::unavailable("store lock poisoned"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Table helpers
// ─────────────────────────────────────────────────────────────────────────────

impl Tables {
    fn table(&self, resource: Resource) -> &[Record] {
        self.rows.get(&resource).map(Vec::as_slice).unwrap_or(&[])
    }

    fn table_mut(&mut self, resource: Resource) -> &mut Vec<Record> {
        self.rows.entry(resource).or_default()
    }

    fn find(&self, resource: Resource, id: RecordId) -> Option<&Record> {
        self.table(resource).iter().find(|r| r.id == id)
    }

    fn find_mut(&mut self, resource: Resource, id: RecordId) -> RepoResult<&mut Record> {
        self.table_mut(resource)
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::new(RepositoryErrorKind::Query, format!("{resource} {id} no longer exists")))
    }

    fn live(&self, resource: Resource, id: RecordId) -> Option<&Record> {
        self.find(resource, id).filter(|r| !r.is_deleted())
    }

    fn links(&self, association: Association) -> &[Link] {
        self.links.get(&association).map(Vec::as_slice).unwrap_or(&[])
    }

    fn links_mut(&mut self, association: Association) -> &mut Vec<Link> {
        self.links.entry(association).or_default()
    }

    /// Reject values that collide with another row on a unique column.
    fn check_unique(&self, resource: Resource, values: &Fields, except: Option<RecordId>) -> RepoResult<()> {
        for column in schema::unique_columns(resource) {
            let Some(value) = values.get(*column).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = self
                .table(resource)
                .iter()
                .any(|r| Some(r.id) != except && r.get(column) == Some(value));
            if taken {
                return Err(RepositoryError::unique(format!("{resource}.{column} {value} already exists")));
            }
        }
        Ok(())
    }

    /// Reject references to rows that do not exist or were soft-deleted.
    fn check_references(&self, resource: Resource, values: &Fields) -> RepoResult<()> {
        for (column, target) in schema::references(resource) {
            let Some(value) = values.get(*column).filter(|v| !v.is_null()) else {
                continue;
            };
            let found = value
                .as_str()
                .and_then(|s| s.parse::<RecordId>().ok())
                .and_then(|id| self.live(*target, id));
            if found.is_none() {
                return Err(RepositoryError::foreign_key(format!(
                    "{resource}.{column} references a missing {target}"
                )));
            }
        }
        Ok(())
    }

    fn require_live(&self, resource: Resource, ids: &[RecordId]) -> RepoResult<()> {
        match ids.iter().find(|id| self.live(resource, **id).is_none()) {
            Some(id) => Err(RepositoryError::foreign_key(format!("{resource} {id} does not exist"))),
            None => Ok(()),
        }
    }

    fn update_row(&mut self, resource: Resource, id: RecordId, values: Fields, now: DateTime<Utc>) -> RepoResult<Record> {
        self.check_unique(resource, &values, Some(id))?;
        self.check_references(resource, &values)?;
        let row = self.find_mut(resource, id)?;
        row.merge(values, now);
        Ok(row.clone())
    }

    /// Remove a row for good, with every join row and reference pointing at it.
    fn purge(&mut self, resource: Resource, id: RecordId, now: DateTime<Utc>) -> RepoResult<Record> {
        let table = self.table_mut(resource);
        let pos = table
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RepositoryError::new(RepositoryErrorKind::Query, format!("{resource} {id} no longer exists")))?;
        let removed = table.remove(pos);

        for association in Association::ALL {
            match association.kind() {
                AssociationKind::BelongsToMany => {
                    let links = self.links_mut(association);
                    if association.parent() == resource {
                        links.retain(|l| l.parent_id != id);
                    }
                    if association.target() == resource {
                        links.retain(|l| l.child_id != id);
                    }
                }
                AssociationKind::HasMany { foreign_key } if association.parent() == resource => {
                    let key = Value::String(id.to_string());
                    for child in self.table_mut(association.target()) {
                        if child.get(foreign_key) == Some(&key) {
                            child.fields.insert(foreign_key.to_string(), Value::Null);
                            child.updated_at = now;
                        }
                    }
                }
                AssociationKind::HasMany { .. } => {}
            }
        }
        Ok(removed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query application
// ─────────────────────────────────────────────────────────────────────────────

fn visible(record: &Record, options: &QueryOptions) -> bool {
    (!options.paranoid || !record.is_deleted())
        && options
            .filters
            .iter()
            .all(|(k, v)| record.get(k).is_some_and(|stored| same_value(stored, v)))
}

/// Numbers compare by value, so `9` matches `9.0`.
fn same_value(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => stored == wanted,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // Missing and null sort first.
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn compare_records(a: &Record, b: &Record, field: &str) -> Ordering {
    match field {
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        _ => compare_values(a.get(field), b.get(field)),
    }
}

/// Filter, sort and page `items` by the record each one carries.
fn select<T>(mut items: Vec<T>, options: &QueryOptions, record: impl Fn(&T) -> &Record) -> Vec<T> {
    items.retain(|item| visible(record(item), options));

    if let Some(sort) = &options.sort {
        items.sort_by(|a, b| {
            let ord = compare_records(record(a), record(b), &sort.field);
            if sort.descending { ord.reverse() } else { ord }
        });
    }

    let limit = options.limit.unwrap_or(usize::MAX);
    items.into_iter().skip(options.offset).take(limit).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource repository
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    db: Arc<InMemoryDatabase>,
    resource: Resource,
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_all(&self, options: &QueryOptions) -> RepoResult<Vec<Record>> {
        let tables = self.db.read()?;
        Ok(select(tables.table(self.resource).to_vec(), options, |r| r))
    }

    async fn create(&self, values: Fields) -> RepoResult<Record> {
        let mut tables = self.db.write()?;
        tables.check_unique(self.resource, &values, None)?;
        tables.check_references(self.resource, &values)?;

        let record = Record::new(values, Utc::now());
        tables.table_mut(self.resource).push(record.clone());
        tracing::debug!(resource = %self.resource, id = %record.id, "row created");
        Ok(record)
    }

    async fn find_by_pk(&self, id: RecordId, options: &QueryOptions) -> RepoResult<Option<Record>> {
        let tables = self.db.read()?;
        Ok(tables
            .find(self.resource, id)
            .filter(|r| !options.paranoid || !r.is_deleted())
            .cloned())
    }

    async fn update(&self, record: &Record, values: Fields) -> RepoResult<Record> {
        let mut tables = self.db.write()?;
        tables.update_row(self.resource, record.id, values, Utc::now())
    }

    async fn destroy(&self, record: &Record, options: &QueryOptions) -> RepoResult<Record> {
        let mut tables = self.db.write()?;
        let now = Utc::now();

        if options.force {
            let removed = tables.purge(self.resource, record.id, now)?;
            tracing::debug!(resource = %self.resource, id = %record.id, "row purged");
            return Ok(removed);
        }

        let row = tables.find_mut(self.resource, record.id)?;
        if row.deleted_at.is_none() {
            row.deleted_at = Some(now);
            row.updated_at = now;
        }
        Ok(row.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-to-many
// ─────────────────────────────────────────────────────────────────────────────

/// Children carry the parent's id in `foreign_key`.
#[derive(Debug, Clone)]
pub struct InMemoryHasMany {
    db: Arc<InMemoryDatabase>,
    association: Association,
    foreign_key: &'static str,
}

impl InMemoryHasMany {
    fn owned_by(&self, child: &Record, parent: &Record) -> bool {
        child.get(self.foreign_key).and_then(Value::as_str) == Some(parent.id.to_string().as_str())
    }
}

#[async_trait]
impl AssociationRepository for InMemoryHasMany {
    async fn list(&self, parent: &Record, options: &QueryOptions) -> RepoResult<Vec<Linked>> {
        let tables = self.db.read()?;
        let children: Vec<Record> = tables
            .table(self.association.target())
            .iter()
            .filter(|c| self.owned_by(c, parent))
            .cloned()
            .collect();
        Ok(select(children, options, |r| r).into_iter().map(Linked::direct).collect())
    }

    async fn add(&self, parent: &Record, ids: &[RecordId], _through: Fields) -> RepoResult<Vec<Linked>> {
        let target = self.association.target();
        let mut tables = self.db.write()?;
        tables.require_live(target, ids)?;

        let now = Utc::now();
        let mut added = Vec::new();
        for id in ids {
            let child = tables.find_mut(target, *id)?;
            if self.owned_by(child, parent) {
                continue;
            }
            child
                .fields
                .insert(self.foreign_key.to_string(), Value::String(parent.id.to_string()));
            child.updated_at = now;
            added.push(Linked::direct(child.clone()));
        }
        Ok(added)
    }

    async fn get(&self, parent: &Record, child_id: RecordId, options: &QueryOptions) -> RepoResult<Option<Linked>> {
        let tables = self.db.read()?;
        Ok(tables
            .find(self.association.target(), child_id)
            .filter(|c| self.owned_by(c, parent))
            .filter(|c| !options.paranoid || !c.is_deleted())
            .cloned()
            .map(Linked::direct))
    }

    async fn update_child(&self, child: &Record, values: Fields) -> RepoResult<Record> {
        let mut tables = self.db.write()?;
        tables.update_row(self.association.target(), child.id, values, Utc::now())
    }

    async fn update_link(&self, _link: &Link, _values: Fields) -> RepoResult<Link> {
        Err(RepositoryError::new(
            RepositoryErrorKind::Query,
            format!("{} has no join rows", self.association),
        ))
    }

    async fn remove(&self, _parent: &Record, child: &Linked) -> RepoResult<Linked> {
        let mut tables = self.db.write()?;
        let row = tables.find_mut(self.association.target(), child.record.id)?;
        row.fields.insert(self.foreign_key.to_string(), Value::Null);
        row.updated_at = Utc::now();
        Ok(Linked::direct(row.clone()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Many-to-many
// ─────────────────────────────────────────────────────────────────────────────

/// Children are connected through join rows that may carry attributes.
#[derive(Debug, Clone)]
pub struct InMemoryBelongsToMany {
    db: Arc<InMemoryDatabase>,
    association: Association,
}

#[async_trait]
impl AssociationRepository for InMemoryBelongsToMany {
    async fn list(&self, parent: &Record, options: &QueryOptions) -> RepoResult<Vec<Linked>> {
        let target = self.association.target();
        let tables = self.db.read()?;
        let joined: Vec<Linked> = tables
            .links(self.association)
            .iter()
            .filter(|l| l.parent_id == parent.id)
            .filter_map(|l| {
                tables
                    .find(target, l.child_id)
                    .map(|r| Linked::through(r.clone(), l.clone()))
            })
            .collect();
        Ok(select(joined, options, |l| &l.record))
    }

    async fn add(&self, parent: &Record, ids: &[RecordId], through: Fields) -> RepoResult<Vec<Linked>> {
        let target = self.association.target();
        if target == self.association.parent() && ids.contains(&parent.id) {
            return Err(RepositoryError::new(
                RepositoryErrorKind::Constraint,
                format!("{} cannot link a {} to itself", self.association, target),
            ));
        }

        let mut tables = self.db.write()?;
        tables.require_live(target, ids)?;

        let now = Utc::now();
        let mut added = Vec::new();
        for id in ids {
            let exists = tables
                .links(self.association)
                .iter()
                .any(|l| l.parent_id == parent.id && l.child_id == *id);
            if exists {
                continue;
            }
            let link = Link::new(self.association, parent.id, *id, through.clone(), now);
            tables.links_mut(self.association).push(link.clone());
            if let Some(child) = tables.find(target, *id) {
                added.push(Linked::through(child.clone(), link));
            }
        }
        Ok(added)
    }

    async fn get(&self, parent: &Record, child_id: RecordId, options: &QueryOptions) -> RepoResult<Option<Linked>> {
        let tables = self.db.read()?;
        let Some(link) = tables
            .links(self.association)
            .iter()
            .find(|l| l.parent_id == parent.id && l.child_id == child_id)
        else {
            return Ok(None);
        };
        Ok(tables
            .find(self.association.target(), child_id)
            .filter(|c| !options.paranoid || !c.is_deleted())
            .map(|c| Linked::through(c.clone(), link.clone())))
    }

    async fn update_child(&self, child: &Record, values: Fields) -> RepoResult<Record> {
        let mut tables = self.db.write()?;
        tables.update_row(self.association.target(), child.id, values, Utc::now())
    }

    async fn update_link(&self, link: &Link, values: Fields) -> RepoResult<Link> {
        let mut tables = self.db.write()?;
        let stored = tables
            .links_mut(self.association)
            .iter_mut()
            .find(|l| l.parent_id == link.parent_id && l.child_id == link.child_id)
            .ok_or_else(|| {
                RepositoryError::new(RepositoryErrorKind::Query, format!("{} join row no longer exists", self.association))
            })?;
        stored.attributes.extend(values);
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn remove(&self, parent: &Record, child: &Linked) -> RepoResult<Linked> {
        let mut tables = self.db.write()?;
        let links = tables.links_mut(self.association);
        let pos = links
            .iter()
            .position(|l| l.parent_id == parent.id && l.child_id == child.record.id)
            .ok_or_else(|| {
                RepositoryError::new(RepositoryErrorKind::Query, format!("{} join row no longer exists", self.association))
            })?;
        let link = links.remove(pos);
        Ok(Linked::through(child.record.clone(), link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_service::Sort;
    use serde_json::json;

    fn fields(v: Value) -> Fields {
        match v {
            Value::Object(m) => m,
            _ => Fields::new(),
        }
    }

    fn db() -> Arc<InMemoryDatabase> {
        Arc::new(InMemoryDatabase::new())
    }

    #[tokio::test]
    async fn soft_delete_hides_rows_unless_not_paranoid() {
        let db = db();
        let repo = db.repository(Resource::Category);
        let row = repo.create(fields(json!({ "name": "Tools" }))).await.unwrap();

        let deleted = repo.destroy(&row, &QueryOptions::default()).await.unwrap();
        assert!(deleted.is_deleted());

        let paranoid = QueryOptions::default();
        assert!(repo.find_by_pk(row.id, &paranoid).await.unwrap().is_none());
        assert!(repo.find_all(&paranoid).await.unwrap().is_empty());

        let all = QueryOptions {
            paranoid: false,
            ..QueryOptions::default()
        };
        assert!(repo.find_by_pk(row.id, &all).await.unwrap().is_some());
        assert_eq!(repo.find_all(&all).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn force_delete_drops_row_and_join_rows() {
        let db = db();
        let roles = db.repository(Resource::Role);
        let perms = db.repository(Resource::Permission);
        let role = roles.create(fields(json!({ "name": "admin" }))).await.unwrap();
        let perm = perms.create(fields(json!({ "name": "get orders" }))).await.unwrap();

        let assoc = db.association(Association::RolePermissions);
        assoc.add(&role, &[perm.id], Fields::new()).await.unwrap();

        let force = QueryOptions {
            force: true,
            ..QueryOptions::default()
        };
        perms.destroy(&perm, &force).await.unwrap();

        assert_eq!(db.count(Resource::Permission), 0);
        assert!(assoc.list(&role, &QueryOptions::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unique_columns_are_enforced() {
        let db = db();
        let repo = db.repository(Resource::Stock);
        repo.create(fields(json!({ "name": "Hammer", "sku": "H-1" }))).await.unwrap();

        let err = repo
            .create(fields(json!({ "name": "Other hammer", "sku": "H-1" })))
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::UniqueViolation);
    }

    #[tokio::test]
    async fn updating_a_row_keeps_its_own_unique_value() {
        let db = db();
        let repo = db.repository(Resource::Role);
        let role = repo.create(fields(json!({ "name": "admin" }))).await.unwrap();

        let updated = repo
            .update(&role, fields(json!({ "name": "admin", "description": "all access" })))
            .await
            .unwrap();
        assert_eq!(updated.get("description"), Some(&json!("all access")));
        assert!(updated.updated_at >= role.updated_at);
    }

    #[tokio::test]
    async fn references_must_exist() {
        let db = db();
        let orders = db.repository(Resource::Order);
        let err = orders
            .create(fields(json!({ "reference": "PO-1", "customer_id": RecordId::new().to_string() })))
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ForeignKey);

        let customer = db
            .repository(Resource::Customer)
            .create(fields(json!({ "name": "Acme" })))
            .await
            .unwrap();
        orders
            .create(fields(json!({ "reference": "PO-1", "customer_id": customer.id.to_string() })))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn find_all_filters_sorts_and_pages() {
        let db = db();
        let repo = db.repository(Resource::Stock);
        for (sku, qty) in [("A", 3), ("B", 1), ("C", 2), ("D", 1)] {
            repo.create(fields(json!({ "name": sku, "sku": sku, "quantity": qty })))
                .await
                .unwrap();
        }

        let by_qty = QueryOptions {
            sort: Some(Sort {
                field: "quantity".to_string(),
                descending: true,
            }),
            limit: Some(2),
            ..QueryOptions::default()
        };
        let page: Vec<_> = repo
            .find_all(&by_qty)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.get("sku").cloned())
            .collect();
        assert_eq!(page, vec![Some(json!("A")), Some(json!("C"))]);

        let ones = QueryOptions {
            filters: fields(json!({ "quantity": 1 })),
            offset: 1,
            ..QueryOptions::default()
        };
        assert_eq!(repo.find_all(&ones).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn number_filters_match_by_value() {
        let db = db();
        let repo = db.repository(Resource::Stock);
        repo.create(fields(json!({ "name": "Hammer", "sku": "H-1", "unit_price": 9 })))
            .await
            .unwrap();
        repo.create(fields(json!({ "name": "Saw", "sku": "S-1", "unit_price": 12.5 })))
            .await
            .unwrap();

        for wanted in [json!(9), json!(9.0)] {
            let options = QueryOptions {
                filters: fields(json!({ "unit_price": wanted })),
                ..QueryOptions::default()
            };
            let rows = repo.find_all(&options).await.unwrap();
            assert_eq!(rows.len(), 1, "{wanted}");
            assert_eq!(rows[0].get("sku"), Some(&json!("H-1")));
        }
    }

    #[tokio::test]
    async fn has_many_add_sets_foreign_key_once() {
        let db = db();
        let category = db
            .repository(Resource::Category)
            .create(fields(json!({ "name": "Tools" })))
            .await
            .unwrap();
        let stock = db
            .repository(Resource::Stock)
            .create(fields(json!({ "name": "Hammer", "sku": "H-1" })))
            .await
            .unwrap();
        let assoc = db.association(Association::CategoryStocks);

        let added = assoc.add(&category, &[stock.id], Fields::new()).await.unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].record.get("category_id"), Some(&json!(category.id.to_string())));
        assert!(added[0].link.is_none());

        let again = assoc.add(&category, &[stock.id], Fields::new()).await.unwrap();
        assert!(again.is_empty());

        let found = assoc.get(&category, stock.id, &QueryOptions::default()).await.unwrap();
        assert!(found.is_some());

        let removed = assoc.remove(&category, &found.unwrap()).await.unwrap();
        assert_eq!(removed.record.get("category_id"), Some(&Value::Null));
        assert!(assoc.list(&category, &QueryOptions::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn adding_unknown_children_is_a_foreign_key_error() {
        let db = db();
        let user = db
            .repository(Resource::User)
            .create(fields(json!({ "username": "ada", "email": "ada@example.com" })))
            .await
            .unwrap();
        let assoc = db.association(Association::UserRoles);

        let err = assoc.add(&user, &[RecordId::new()], Fields::new()).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ForeignKey);
    }

    #[tokio::test]
    async fn join_rows_carry_and_update_attributes() {
        let db = db();
        let customer = db
            .repository(Resource::Customer)
            .create(fields(json!({ "name": "Acme" })))
            .await
            .unwrap();
        let order = db
            .repository(Resource::Order)
            .create(fields(json!({ "reference": "PO-9", "customer_id": customer.id.to_string() })))
            .await
            .unwrap();
        let stock = db
            .repository(Resource::Stock)
            .create(fields(json!({ "name": "Nails", "sku": "N-1" })))
            .await
            .unwrap();
        let items = db.association(Association::OrderItems);

        let added = items
            .add(&order, &[stock.id], fields(json!({ "quantity": 10 })))
            .await
            .unwrap();
        let link = added[0].link.clone().unwrap();
        assert_eq!(link.attributes.get("quantity"), Some(&json!(10)));

        let updated = items.update_link(&link, fields(json!({ "quantity": 12 }))).await.unwrap();
        assert_eq!(updated.attributes.get("quantity"), Some(&json!(12)));

        let fetched = items
            .get(&order, stock.id, &QueryOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.link.unwrap().attributes.get("quantity"), Some(&json!(12)));
    }

    #[tokio::test]
    async fn self_supervision_is_rejected() {
        let db = db();
        let employee = db
            .repository(Resource::Employee)
            .create(fields(json!({ "first_name": "Ada", "last_name": "Lovelace" })))
            .await
            .unwrap();
        let supervisors = db.association(Association::EmployeeSupervisors);

        let err = supervisors.add(&employee, &[employee.id], Fields::new()).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::Constraint);
    }
}
