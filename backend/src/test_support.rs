//! In-memory adapters for service and handler tests.
//!
//! [`InMemoryStore`] implements the user, project, and favorite repositories
//! and the upload ledger over one shared state so cascades behave like the
//! database schema.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    BlobStore, BlobStoreError, CredentialHashError, CredentialHasher, FavoritePersistenceError,
    FavoriteRepository, ProjectPersistenceError, ProjectRepository, ProjectSearchQuery,
    ProjectSlice, UploadLedger, UploadLedgerError, UploadRecord, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    AuthorIdentity, Favorite, FileRef, Project, ProjectId, User, UserAccount, UserId,
};

#[derive(Default)]
struct State {
    accounts: Vec<UserAccount>,
    projects: BTreeMap<ProjectId, Project>,
    favorites: Vec<Favorite>,
    uploads: HashMap<FileRef, UploadEntry>,
}

struct UploadEntry {
    uploaded_by: Option<UserId>,
    uploaded_at: DateTime<Utc>,
    claimed: bool,
}

/// Shared in-memory identity, catalog, and favorite store.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store behind an [`Arc`].
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed an account directly.
    pub fn seed_user(&self, user: User, credential_hash: &str) {
        self.lock().accounts.push(UserAccount {
            user,
            credential_hash: credential_hash.to_owned(),
        });
    }

    /// Seed a project directly.
    pub fn seed_project(&self, project: Project) {
        self.lock().projects.insert(project.id, project);
    }

    /// Snapshot of a stored project.
    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.lock().projects.get(id).cloned()
    }

    /// Number of stored favorites.
    pub fn favorite_count(&self) -> usize {
        self.lock().favorites.len()
    }

    /// Record an unclaimed upload directly.
    pub fn seed_upload(
        &self,
        file_ref: FileRef,
        uploaded_by: Option<UserId>,
        uploaded_at: DateTime<Utc>,
    ) {
        self.lock().uploads.insert(
            file_ref,
            UploadEntry {
                uploaded_by,
                uploaded_at,
                claimed: false,
            },
        );
    }

    /// Mark an upload as held by `owner`, recording it if unknown.
    pub fn seed_claim(&self, file_ref: &FileRef, owner: UserId) {
        let mut state = self.lock();
        let entry = state
            .uploads
            .entry(file_ref.clone())
            .or_insert_with(|| UploadEntry {
                uploaded_by: Some(owner),
                uploaded_at: DateTime::<Utc>::default(),
                claimed: true,
            });
        entry.uploaded_by = Some(owner);
        entry.claimed = true;
    }

    /// Uploader and claim flag of a ledger entry.
    pub fn upload_state(&self, file_ref: &FileRef) -> Option<(Option<UserId>, bool)> {
        self.lock()
            .uploads
            .get(file_ref)
            .map(|entry| (entry.uploaded_by, entry.claimed))
    }
}

fn sorted_users(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| {
        a.display_name()
            .as_ref()
            .cmp(b.display_name().as_ref())
            .then_with(|| a.id().cmp(b.id()))
    });
    users
}

fn newest_first(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    projects
}

fn matches_needle(project: &Project, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [&project.title, &project.description, &project.authors_text]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        if state
            .accounts
            .iter()
            .any(|existing| existing.user.email() == account.user.email())
        {
            return Err(UserPersistenceError::duplicate_email(
                account.user.email().as_ref(),
            ));
        }
        state.accounts.push(account.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        user: &User,
        credential_hash: Option<String>,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        if state
            .accounts
            .iter()
            .any(|a| a.user.email() == user.email() && a.user.id() != user.id())
        {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.user.id() == user.id())
            .ok_or_else(|| UserPersistenceError::query(format!("user {} not found", user.id())))?;
        account.user = user.clone();
        if let Some(hash) = credential_hash {
            account.credential_hash = hash;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|a| a.user.id() == id)
            .map(|a| a.user.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|a| a.user.email().as_ref() == email)
            .cloned())
    }

    async fn list_identities(&self) -> Result<Vec<AuthorIdentity>, UserPersistenceError> {
        let users = self.lock().accounts.iter().map(|a| a.user.clone()).collect();
        Ok(sorted_users(users)
            .into_iter()
            .map(|u| AuthorIdentity::new(*u.id(), u.display_name().clone()))
            .collect())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let users = self
            .lock()
            .accounts
            .iter()
            .filter(|a| ids.contains(a.user.id()))
            .map(|a| a.user.clone())
            .collect();
        Ok(sorted_users(users))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let users = self.lock().accounts.iter().map(|a| a.user.clone()).collect();
        Ok(sorted_users(users))
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        self.lock().projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn replace(
        &self,
        project: &Project,
        expected_revision: Option<u32>,
    ) -> Result<u32, ProjectPersistenceError> {
        let mut state = self.lock();
        let stored = state
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| ProjectPersistenceError::not_found(project.id))?;
        if let Some(expected) = expected_revision {
            if stored.revision != expected {
                return Err(ProjectPersistenceError::revision_mismatch(
                    expected,
                    stored.revision,
                ));
            }
        }
        let revision = stored.revision + 1;
        *stored = Project {
            revision,
            created_at: stored.created_at,
            ..project.clone()
        };
        Ok(revision)
    }

    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectPersistenceError> {
        let mut state = self.lock();
        let removed = state.projects.remove(id).is_some();
        state.favorites.retain(|f| f.project_id != *id);
        Ok(removed)
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self.lock().projects.get(id).cloned())
    }

    async fn find_many(&self, ids: &[ProjectId]) -> Result<Vec<Project>, ProjectPersistenceError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.projects.get(id).cloned())
            .collect())
    }

    async fn search(
        &self,
        query: &ProjectSearchQuery,
    ) -> Result<ProjectSlice, ProjectPersistenceError> {
        let matching: Vec<Project> = self
            .lock()
            .projects
            .values()
            .filter(|p| query.needle.as_deref().is_none_or(|n| matches_needle(p, n)))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let items = newest_first(matching)
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect();
        Ok(ProjectSlice { items, total })
    }

    async fn list_all(&self) -> Result<Vec<Project>, ProjectPersistenceError> {
        Ok(newest_first(self.lock().projects.values().cloned().collect()))
    }

    async fn add_authors(
        &self,
        id: &ProjectId,
        authors: &BTreeSet<UserId>,
    ) -> Result<usize, ProjectPersistenceError> {
        let mut state = self.lock();
        let project = state
            .projects
            .get_mut(id)
            .ok_or_else(|| ProjectPersistenceError::not_found(*id))?;
        Ok(authors
            .iter()
            .filter(|author| project.author_ids.insert(**author))
            .count())
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryStore {
    async fn exists(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
    ) -> Result<bool, FavoritePersistenceError> {
        Ok(self
            .lock()
            .favorites
            .iter()
            .any(|f| f.user_id == *user_id && f.project_id == *project_id))
    }

    async fn add(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError> {
        let mut state = self.lock();
        let exists = state
            .favorites
            .iter()
            .any(|f| f.user_id == favorite.user_id && f.project_id == favorite.project_id);
        if !exists {
            state.favorites.push(favorite.clone());
        }
        Ok(())
    }

    async fn remove(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
    ) -> Result<bool, FavoritePersistenceError> {
        let mut state = self.lock();
        let before = state.favorites.len();
        state
            .favorites
            .retain(|f| !(f.user_id == *user_id && f.project_id == *project_id));
        Ok(state.favorites.len() != before)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProjectId>, FavoritePersistenceError> {
        let mut favorites: Vec<Favorite> = self
            .lock()
            .favorites
            .iter()
            .filter(|f| f.user_id == *user_id)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(favorites.into_iter().map(|f| f.project_id).collect())
    }
}

#[async_trait]
impl UploadLedger for InMemoryStore {
    async fn record(&self, upload: &UploadRecord) -> Result<(), UploadLedgerError> {
        let mut state = self.lock();
        if state.uploads.contains_key(&upload.file_ref) {
            return Err(UploadLedgerError::query(format!(
                "upload {} already recorded",
                upload.file_ref
            )));
        }
        state.uploads.insert(
            upload.file_ref.clone(),
            UploadEntry {
                uploaded_by: upload.uploaded_by,
                uploaded_at: upload.uploaded_at,
                claimed: false,
            },
        );
        Ok(())
    }

    async fn claim(
        &self,
        file_ref: &FileRef,
        uploaded_by: Option<UserId>,
        owner: &UserId,
    ) -> Result<bool, UploadLedgerError> {
        let mut state = self.lock();
        match state.uploads.get_mut(file_ref) {
            Some(entry) if !entry.claimed && entry.uploaded_by == uploaded_by => {
                entry.claimed = true;
                entry.uploaded_by = Some(*owner);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, file_ref: &FileRef) -> Result<(), UploadLedgerError> {
        if let Some(entry) = self.lock().uploads.get_mut(file_ref) {
            entry.claimed = false;
        }
        Ok(())
    }

    async fn forget(&self, file_ref: &FileRef) -> Result<(), UploadLedgerError> {
        self.lock().uploads.remove(file_ref);
        Ok(())
    }

    async fn expired(
        &self,
        uploaded_before: DateTime<Utc>,
    ) -> Result<Vec<FileRef>, UploadLedgerError> {
        let mut expired: Vec<FileRef> = self
            .lock()
            .uploads
            .iter()
            .filter(|(_, entry)| !entry.claimed && entry.uploaded_at < uploaded_before)
            .map(|(file_ref, _)| file_ref.clone())
            .collect();
        expired.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(expired)
    }

    async fn forget_unclaimed(&self, file_ref: &FileRef) -> Result<bool, UploadLedgerError> {
        let mut state = self.lock();
        let unclaimed = state
            .uploads
            .get(file_ref)
            .is_some_and(|entry| !entry.claimed);
        if unclaimed {
            state.uploads.remove(file_ref);
        }
        Ok(unclaimed)
    }
}

/// In-memory blob store. Removals can be made to fail.
#[derive(Default)]
pub struct InMemoryBlobStore {
    files: Mutex<HashMap<FileRef, Vec<u8>>>,
    fail_removals: bool,
}

impl InMemoryBlobStore {
    /// A store whose `remove` always errors.
    pub fn failing_removals() -> Self {
        Self {
            fail_removals: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FileRef, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store bytes under a known reference.
    pub fn seed(&self, file_ref: FileRef, bytes: Vec<u8>) {
        self.lock().insert(file_ref, bytes);
    }

    /// Whether anything is stored under `file_ref`.
    pub fn contains(&self, file_ref: &FileRef) -> bool {
        self.lock().contains_key(file_ref)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<FileRef, BlobStoreError> {
        let file_ref = FileRef::for_upload(original_name)
            .map_err(|err| BlobStoreError::invalid_name(err.to_string()))?;
        self.lock().insert(file_ref.clone(), bytes.to_vec());
        Ok(file_ref)
    }

    async fn get(&self, file_ref: &FileRef) -> Result<Option<Vec<u8>>, BlobStoreError> {
        Ok(self.lock().get(file_ref).cloned())
    }

    async fn remove(&self, file_ref: &FileRef) -> Result<(), BlobStoreError> {
        if self.fail_removals {
            return Err(BlobStoreError::io("removal disabled"));
        }
        self.lock().remove(file_ref);
        Ok(())
    }
}

/// Reversible "hasher" for tests: stores `plain:<password>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextHasher;

impl CredentialHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHashError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialHashError> {
        stored_hash
            .strip_prefix("plain:")
            .map(|stored| stored == password)
            .ok_or_else(|| CredentialHashError::malformed_hash(stored_hash))
    }
}

/// Clock frozen at a fixed instant, advanced manually.
pub struct FixtureClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    /// Clock frozen at 2024-01-01T00:00:00Z.
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
