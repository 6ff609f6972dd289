//! Tests for the catalog service.

use std::sync::Arc;

use chrono::Duration;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockBlobStore, MockFavoriteRepository, MockProjectRepository, MockUploadLedger,
    MockUserRepository, ProjectPersistenceError,
};
use crate::domain::{DisplayName, Email, ErrorCode};
use crate::test_support::{FixtureClock, InMemoryBlobStore, InMemoryStore};

type Service =
    CatalogService<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore, InMemoryBlobStore>;

struct World {
    store: Arc<InMemoryStore>,
    blobs: Arc<InMemoryBlobStore>,
    clock: Arc<FixtureClock>,
    ana: UserId,
    bruno: UserId,
    admin: UserId,
    outsider: UserId,
}

impl World {
    fn service(&self) -> Service {
        CatalogService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.blobs.clone(),
            self.clock.clone(),
        )
    }

    /// Store a file as if `uploader` had just sent it.
    fn upload(&self, uploader: UserId, name: &str) -> FileRef {
        let file_ref = FileRef::new(name).expect("ref");
        self.blobs.seed(file_ref.clone(), name.as_bytes().to_vec());
        self.store
            .seed_upload(file_ref.clone(), Some(uploader), self.clock.utc());
        file_ref
    }
}

fn seed(store: &InMemoryStore, name: &str, is_admin: bool) -> UserId {
    let id = UserId::random();
    let email = format!("{}@example.org", name.to_lowercase());
    store.seed_user(
        User::new(
            id,
            DisplayName::new(name).expect("name"),
            Email::new(email).expect("email"),
            None,
            is_admin,
        ),
        "plain:secret",
    );
    id
}

fn world_with_blobs(blobs: InMemoryBlobStore) -> World {
    let store = InMemoryStore::shared();
    let ana = seed(&store, "Ana", false);
    let bruno = seed(&store, "Bruno", false);
    let admin = seed(&store, "Root", true);
    let outsider = seed(&store, "Olga", false);
    World {
        store,
        blobs: Arc::new(blobs),
        clock: Arc::new(FixtureClock::new()),
        ana,
        bruno,
        admin,
        outsider,
    }
}

#[fixture]
fn world() -> World {
    world_with_blobs(InMemoryBlobStore::default())
}

fn draft(authors: &str) -> ProjectDraft {
    ProjectDraft::try_new("Robots", "A study of robots", authors, None).expect("draft")
}

fn draft_with_file(authors: &str, file_ref: &FileRef) -> ProjectDraft {
    ProjectDraft::try_new("Robots", "A study of robots", authors, Some(file_ref.clone()))
        .expect("draft")
}

fn update(project_id: ProjectId, draft: ProjectDraft) -> UpdateProjectRequest {
    UpdateProjectRequest {
        project_id,
        draft,
        expected_revision: None,
    }
}

#[rstest]
#[tokio::test]
async fn create_associates_creator_and_matched_names(world: World) {
    let created = world
        .service()
        .create_project(&world.ana, draft("bruno, Carlos"))
        .await
        .expect("create succeeds");

    assert_eq!(
        created.project.author_ids,
        BTreeSet::from([world.ana, world.bruno])
    );
    assert_eq!(created.unmatched_authors, vec!["Carlos".to_owned()]);
    assert_eq!(created.project.revision, 1);
    assert!(world.store.project(&created.project.id).is_some());
}

#[rstest]
#[tokio::test]
async fn create_requires_known_actor(world: World) {
    let err = world
        .service()
        .create_project(&UserId::random(), draft("Ana"))
        .await
        .expect_err("unknown actor");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn update_replaces_authors(world: World) {
    let service = world.service();
    let created = service
        .create_project(&world.ana, draft("Ana, Bruno"))
        .await
        .expect("create");

    let updated = service
        .update_project(&world.ana, update(created.project.id, draft("Ana")))
        .await
        .expect("update");

    assert_eq!(updated.project.author_ids, BTreeSet::from([world.ana]));
    assert_eq!(updated.project.revision, 2);
}

#[rstest]
#[tokio::test]
async fn editor_can_remove_themselves(world: World) {
    let service = world.service();
    let created = service
        .create_project(&world.ana, draft("Ana, Bruno"))
        .await
        .expect("create");

    let updated = service
        .update_project(&world.ana, update(created.project.id, draft("Bruno")))
        .await
        .expect("update");

    assert_eq!(updated.project.author_ids, BTreeSet::from([world.bruno]));
    let err = service
        .update_project(&world.ana, update(created.project.id, draft("Ana")))
        .await
        .expect_err("no longer an author");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn outsiders_cannot_edit_but_admins_can(world: World) {
    let service = world.service();
    let created = service
        .create_project(&world.ana, draft("Ana"))
        .await
        .expect("create");

    let err = service
        .update_project(&world.outsider, update(created.project.id, draft("Olga")))
        .await
        .expect_err("outsider");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let updated = service
        .update_project(&world.admin, update(created.project.id, draft("Bruno")))
        .await
        .expect("admin edit");
    assert_eq!(updated.project.author_ids, BTreeSet::from([world.bruno]));
}

#[rstest]
#[tokio::test]
async fn update_of_missing_project_is_not_found_before_access(world: World) {
    let err = world
        .service()
        .update_project(&world.outsider, update(ProjectId::random(), draft("Ana")))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(Some(1), true)]
#[case(Some(7), false)]
#[case(None, true)]
#[tokio::test]
async fn update_honours_expected_revision(
    world: World,
    #[case] expected_revision: Option<u32>,
    #[case] succeeds: bool,
) {
    let service = world.service();
    let created = service
        .create_project(&world.ana, draft("Ana"))
        .await
        .expect("create");

    let result = service
        .update_project(
            &world.ana,
            UpdateProjectRequest {
                project_id: created.project.id,
                draft: draft("Ana, Bruno"),
                expected_revision,
            },
        )
        .await;

    match result {
        Ok(mutation) => {
            assert!(succeeds);
            assert_eq!(mutation.project.revision, 2);
        }
        Err(err) => {
            assert!(!succeeds);
            assert_eq!(err.code(), ErrorCode::Conflict);
        }
    }
}

#[rstest]
#[tokio::test]
async fn update_keeps_file_unless_replaced(world: World) {
    let service = world.service();
    let original = world.upload(world.ana, "old_report.pdf");
    let created = service
        .create_project(&world.ana, draft_with_file("Ana", &original))
        .await
        .expect("create");

    let kept = service
        .update_project(&world.ana, update(created.project.id, draft("Ana")))
        .await
        .expect("update without file");
    assert_eq!(kept.project.file_ref.as_ref(), Some(&original));
    assert!(world.blobs.contains(&original));

    let replacement = world.upload(world.ana, "new_report.pdf");
    let replaced = service
        .update_project(
            &world.ana,
            update(created.project.id, draft_with_file("Ana", &replacement)),
        )
        .await
        .expect("update with file");
    assert_eq!(replaced.project.file_ref.as_ref(), Some(&replacement));
    assert!(!world.blobs.contains(&original));
    assert_eq!(world.store.upload_state(&original), None);
    assert_eq!(
        world.store.upload_state(&replacement),
        Some((Some(world.ana), true))
    );
}

#[rstest]
#[tokio::test]
async fn delete_cascades_and_removes_blob(world: World) {
    let service = world.service();
    let file = world.upload(world.ana, "abc_thesis.pdf");
    let created = service
        .create_project(&world.ana, draft_with_file("Ana", &file))
        .await
        .expect("create");
    FavoriteRepository::add(
        world.store.as_ref(),
        &crate::domain::Favorite {
            user_id: world.bruno,
            project_id: created.project.id,
            created_at: world.clock.utc(),
        },
    )
    .await
    .expect("favorite");

    service
        .delete_project(&world.ana, &created.project.id)
        .await
        .expect("delete");

    assert!(world.store.project(&created.project.id).is_none());
    assert_eq!(world.store.favorite_count(), 0);
    assert!(!world.blobs.contains(&file));
    assert_eq!(world.store.upload_state(&file), None);
}

#[tokio::test]
async fn delete_succeeds_when_blob_removal_fails() {
    let world = world_with_blobs(InMemoryBlobStore::failing_removals());
    let service = world.service();
    let file = world.upload(world.ana, "abc_thesis.pdf");
    let created = service
        .create_project(&world.ana, draft_with_file("Ana", &file))
        .await
        .expect("create");

    service
        .delete_project(&world.ana, &created.project.id)
        .await
        .expect("blob failure is not surfaced");
}

#[rstest]
#[tokio::test]
async fn attached_files_cannot_be_claimed_by_another_project(world: World) {
    let service = world.service();
    let thesis = world.upload(world.ana, "0123_thesis.pdf");
    service
        .create_project(&world.ana, draft_with_file("Ana", &thesis))
        .await
        .expect("create");

    let err = service
        .create_project(&world.outsider, draft_with_file("Olga", &thesis))
        .await
        .expect_err("already attached");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details["field"], "fileRef");
    assert_eq!(details["code"], "unavailable");

    let own = service
        .create_project(&world.outsider, draft("Olga"))
        .await
        .expect("create");
    let err = service
        .update_project(
            &world.outsider,
            update(own.project.id, draft_with_file("Olga", &thesis)),
        )
        .await
        .expect_err("already attached");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    service
        .delete_project(&world.outsider, &own.project.id)
        .await
        .expect("delete own project");
    assert!(world.blobs.contains(&thesis));
    assert_eq!(
        world.store.upload_state(&thesis),
        Some((Some(world.ana), true))
    );
}

#[rstest]
#[tokio::test]
async fn only_the_uploader_can_attach_a_fresh_upload(world: World) {
    let service = world.service();
    let report = world.upload(world.ana, "0456_report.pdf");

    let err = service
        .create_project(&world.bruno, draft_with_file("Bruno", &report))
        .await
        .expect_err("someone else's upload");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(world.store.upload_state(&report), Some((Some(world.ana), false)));

    let unknown = FileRef::new("0789_unknown.pdf").expect("ref");
    let err = service
        .create_project(&world.ana, draft_with_file("Ana", &unknown))
        .await
        .expect_err("never uploaded");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let created = service
        .create_project(&world.ana, draft_with_file("Ana", &report))
        .await
        .expect("own upload");
    assert_eq!(created.project.file_ref.as_ref(), Some(&report));
    assert_eq!(world.store.upload_state(&report), Some((Some(world.ana), true)));
}

#[tokio::test]
async fn failed_inserts_release_the_claimed_file() {
    let actor = User::new(
        UserId::random(),
        DisplayName::new("Ana").expect("name"),
        Email::new("ana@example.org").expect("email"),
        None,
        false,
    );
    let file = FileRef::new("0123_thesis.pdf").expect("ref");

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(actor)));
    users.expect_list_identities().return_once(|| Ok(Vec::new()));
    let mut projects = MockProjectRepository::new();
    projects
        .expect_insert()
        .return_once(|_| Err(ProjectPersistenceError::query("boom")));
    let mut uploads = MockUploadLedger::new();
    uploads.expect_claim().return_once(|_, _, _| Ok(true));
    let released = file.clone();
    uploads
        .expect_release()
        .withf(move |file_ref| *file_ref == released)
        .times(1)
        .return_once(|_| Ok(()));

    let service = CatalogService::new(
        Arc::new(users),
        Arc::new(projects),
        Arc::new(MockFavoriteRepository::new()),
        Arc::new(uploads),
        Arc::new(MockBlobStore::new()),
        Arc::new(FixtureClock::new()),
    );
    let err = service
        .create_project(&UserId::random(), draft_with_file("Ana", &file))
        .await
        .expect_err("insert fails");

    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn delete_is_forbidden_for_non_authors(world: World) {
    let service = world.service();
    let created = service
        .create_project(&world.ana, draft("Ana"))
        .await
        .expect("create");

    let err = service
        .delete_project(&world.bruno, &created.project.id)
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert!(world.store.project(&created.project.id).is_some());
}

#[rstest]
#[tokio::test]
async fn get_project_reports_viewer_flags(world: World) {
    let service = world.service();
    let created = service
        .create_project(&world.ana, draft("Ana, Bruno"))
        .await
        .expect("create");
    FavoriteRepository::add(
        world.store.as_ref(),
        &crate::domain::Favorite {
            user_id: world.ana,
            project_id: created.project.id,
            created_at: world.clock.utc(),
        },
    )
    .await
    .expect("favorite");

    let anonymous = service
        .get_project(None, &created.project.id)
        .await
        .expect("anonymous view");
    assert!(!anonymous.is_favorite);
    assert!(!anonymous.can_edit);
    let names: Vec<&str> = anonymous
        .authors
        .iter()
        .map(|u| u.display_name().as_ref())
        .collect();
    assert_eq!(names, vec!["Ana", "Bruno"]);

    let author = service
        .get_project(Some(world.ana), &created.project.id)
        .await
        .expect("author view");
    assert!(author.is_favorite);
    assert!(author.can_edit);

    let outsider = service
        .get_project(Some(world.outsider), &created.project.id)
        .await
        .expect("outsider view");
    assert!(!outsider.is_favorite);
    assert!(!outsider.can_edit);
}

#[rstest]
#[tokio::test]
async fn get_missing_project_is_not_found(world: World) {
    let err = world
        .service()
        .get_project(None, &ProjectId::random())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn search_pages_newest_first(world: World) {
    let service = world.service();
    for n in 0..12 {
        let draft = ProjectDraft::try_new(&format!("Project {n}"), "Body", "Ana", None)
            .expect("draft");
        service
            .create_project(&world.ana, draft)
            .await
            .expect("create");
        world.clock.advance(Duration::minutes(1));
    }

    let first = service
        .search_projects(ProjectSearch::new(None, None))
        .await
        .expect("page 1");
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].title, "Project 11");
    assert_eq!(first.total, 12);
    assert_eq!(first.total_pages(), 2);

    let second = service
        .search_projects(ProjectSearch::new(None, Some(2)))
        .await
        .expect("page 2");
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.items[1].title, "Project 0");

    let beyond = service
        .search_projects(ProjectSearch::new(None, Some(9)))
        .await
        .expect("out of range");
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.page, 9);
}

#[rstest]
#[case(Some("ROBOT"), 1)]
#[case(Some("bruno"), 1)]
#[case(Some("   "), 2)]
#[case(Some("nothing"), 0)]
#[case(None, 2)]
#[tokio::test]
async fn search_filters_case_insensitively(
    world: World,
    #[case] q: Option<&str>,
    #[case] expected: usize,
) {
    let service = world.service();
    service
        .create_project(&world.ana, draft("Ana, Bruno"))
        .await
        .expect("create");
    let other = ProjectDraft::try_new("Poetry", "Verses", "Ana", None).expect("draft");
    service
        .create_project(&world.ana, other)
        .await
        .expect("create");

    let page = service
        .search_projects(ProjectSearch::new(q.map(str::to_owned), None))
        .await
        .expect("search");
    assert_eq!(page.items.len(), expected);
}

#[rstest]
#[tokio::test]
async fn admin_overview_requires_admin(world: World) {
    let service = world.service();
    let err = service
        .admin_overview(&world.ana)
        .await
        .expect_err("not admin");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let overview = service.admin_overview(&world.admin).await.expect("admin");
    let names: Vec<&str> = overview
        .users
        .iter()
        .map(|u| u.display_name().as_ref())
        .collect();
    assert_eq!(names, vec!["Ana", "Bruno", "Olga", "Root"]);
}

#[tokio::test]
async fn stale_revision_from_store_maps_to_conflict() {
    let actor = User::new(
        UserId::random(),
        DisplayName::new("Ana").expect("name"),
        Email::new("ana@example.org").expect("email"),
        None,
        true,
    );
    let existing = Project::create(
        ProjectId::random(),
        draft("Ana"),
        BTreeSet::from([*actor.id()]),
        chrono::Utc::now(),
    );
    let project_id = existing.id;

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(actor)));
    users.expect_list_identities().return_once(|| Ok(Vec::new()));
    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(existing)));
    projects
        .expect_replace()
        .return_once(|_, _| Err(ProjectPersistenceError::revision_mismatch(1_u32, 2_u32)));

    let service = CatalogService::new(
        Arc::new(users),
        Arc::new(projects),
        Arc::new(MockFavoriteRepository::new()),
        Arc::new(MockUploadLedger::new()),
        Arc::new(MockBlobStore::new()),
        Arc::new(FixtureClock::new()),
    );
    let err = service
        .update_project(
            &UserId::random(),
            UpdateProjectRequest {
                project_id,
                draft: draft("Ana"),
                expected_revision: Some(1),
            },
        )
        .await
        .expect_err("conflict");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn connection_failures_are_service_unavailable() {
    let mut projects = MockProjectRepository::new();
    projects
        .expect_search()
        .return_once(|_| Err(ProjectPersistenceError::connection("refused")));
    let service = CatalogService::new(
        Arc::new(MockUserRepository::new()),
        Arc::new(projects),
        Arc::new(MockFavoriteRepository::new()),
        Arc::new(MockUploadLedger::new()),
        Arc::new(MockBlobStore::new()),
        Arc::new(FixtureClock::new()),
    );

    let err = service
        .search_projects(ProjectSearch::new(None, None))
        .await
        .expect_err("unavailable");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
