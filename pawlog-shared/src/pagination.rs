/// Keyset pagination over the admin listings
///
/// Pages are addressed by the identifier of the last item seen rather than by an
/// offset, so the cost of a page does not grow with its depth and rows inserted
/// after the cursor never shift the page boundaries.
///
/// # Algorithm
///
/// 1. Fetch at most `limit` rows with `id > last_id`, ascending (all rows when no cursor)
/// 2. `next_cursor` is the last row's id when the page is full, otherwise `None`
/// 3. An unknown `last_id` yields an empty page
///
/// Chaining `next_cursor` from the first page visits every row exactly once, in
/// ascending order, even when rows are inserted above the cursor between fetches.
///
/// # Projection
///
/// Animal listings embed the owner's [`UserProfile`]; training log listings embed the
/// full [`Animal`] and the author's profile. Related rows for a page are fetched in one
/// batch per collection.

use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    Animal, AnimalListing, RecordId, TrainingLogListing, User, UserProfile, UserSummary,
};
use crate::store::Repositories;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Position and size of a requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    last_id: Option<RecordId>,
    limit: i64,
}

impl PageRequest {
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidArgument` when `limit <= 0`
    pub fn new(last_id: Option<RecordId>, limit: i64) -> ServiceResult<Self> {
        if limit <= 0 {
            return Err(ServiceError::InvalidArgument(
                "limit must be a positive integer".to_string(),
            ));
        }

        Ok(Self { last_id, limit })
    }

    pub fn last_id(&self) -> Option<RecordId> {
        self.last_id
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Cursor for the following page; `None` once the collection is exhausted
    pub next_cursor: Option<RecordId>,
}

impl<T> Page<T> {
    fn from_rows(items: Vec<T>, limit: i64, id_of: impl Fn(&T) -> RecordId) -> Self {
        let next_cursor = if items.len() as i64 == limit {
            items.last().map(id_of)
        } else {
            None
        };

        Self { items, next_cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Collection being listed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Users,
    Animals,
    TrainingLogs,
}

impl FromStr for EntityKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(EntityKind::Users),
            "animals" => Ok(EntityKind::Animals),
            "training" => Ok(EntityKind::TrainingLogs),
            other => Err(ServiceError::NotFound(format!("Unknown listing '{}'", other))),
        }
    }
}

/// Page of any listable collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Users(Page<UserSummary>),
    Animals(Page<AnimalListing>),
    TrainingLogs(Page<TrainingLogListing>),
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        match self {
            Listing::Users(page) => page.is_empty(),
            Listing::Animals(page) => page.is_empty(),
            Listing::TrainingLogs(page) => page.is_empty(),
        }
    }
}

/// Runs listing queries against the repositories
#[derive(Clone)]
pub struct Paginator {
    repos: Repositories,
}

impl Paginator {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Dispatches on the collection kind
    pub async fn list_page(&self, kind: EntityKind, req: PageRequest) -> ServiceResult<Listing> {
        Ok(match kind {
            EntityKind::Users => Listing::Users(self.list_users(req).await?),
            EntityKind::Animals => Listing::Animals(self.list_animals(req).await?),
            EntityKind::TrainingLogs => {
                Listing::TrainingLogs(self.list_training_logs(req).await?)
            }
        })
    }

    pub async fn list_users(&self, req: PageRequest) -> ServiceResult<Page<UserSummary>> {
        let users = self.repos.users.page_users(req.last_id, req.limit).await?;
        let items = users.iter().map(User::summary).collect();

        Ok(Page::from_rows(items, req.limit, |u: &UserSummary| u.id))
    }

    pub async fn list_animals(&self, req: PageRequest) -> ServiceResult<Page<AnimalListing>> {
        let animals = self.repos.animals.page_animals(req.last_id, req.limit).await?;

        let owner_ids: Vec<RecordId> = animals.iter().map(|a| a.owner_id).collect();
        let owners = self.profiles(&owner_ids).await?;

        let items = animals
            .into_iter()
            .map(|animal| {
                let owner = related(&owners, animal.owner_id, "owner")?.clone();
                Ok(AnimalListing::new(animal, owner))
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(Page::from_rows(items, req.limit, |a: &AnimalListing| a.id))
    }

    pub async fn list_training_logs(
        &self,
        req: PageRequest,
    ) -> ServiceResult<Page<TrainingLogListing>> {
        let logs = self
            .repos
            .training_logs
            .page_training_logs(req.last_id, req.limit)
            .await?;

        let animal_ids: Vec<RecordId> = logs.iter().map(|l| l.animal_id).collect();
        let animals: HashMap<RecordId, Animal> = self
            .repos
            .animals
            .find_animals(&animal_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let user_ids: Vec<RecordId> = logs.iter().map(|l| l.user_id).collect();
        let users = self.profiles(&user_ids).await?;

        let items = logs
            .into_iter()
            .map(|log| {
                let animal = related(&animals, log.animal_id, "animal")?.clone();
                let user = related(&users, log.user_id, "user")?.clone();
                Ok(TrainingLogListing::new(log, animal, user))
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(Page::from_rows(items, req.limit, |l: &TrainingLogListing| l.id))
    }

    async fn profiles(&self, ids: &[RecordId]) -> ServiceResult<HashMap<RecordId, UserProfile>> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        Ok(self
            .repos
            .users
            .find_users(&unique)
            .await?
            .iter()
            .map(|u| (u.id, u.profile()))
            .collect())
    }
}

// Foreign keys guarantee the related row exists; a miss means the store is inconsistent.
fn related<'a, T>(
    rows: &'a HashMap<RecordId, T>,
    id: RecordId,
    what: &str,
) -> ServiceResult<&'a T> {
    rows.get(&id)
        .ok_or_else(|| ServiceError::Internal(format!("Missing {} {} for listing", what, id)))
}
