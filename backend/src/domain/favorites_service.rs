//! Favorite toggle service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    FavoriteRepository, FavoritesCommand, FavoritesQuery, ProjectRepository,
};
use crate::domain::service_support::{map_favorite_error, map_project_error};
use crate::domain::{Error, Favorite, FavoriteState, Project, ProjectId, UserId};

/// Service implementing the favorite driving ports.
#[derive(Clone)]
pub struct FavoritesService<P, F> {
    projects: Arc<P>,
    favorites: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<P, F> FavoritesService<P, F> {
    pub fn new(projects: Arc<P>, favorites: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self {
            projects,
            favorites,
            clock,
        }
    }
}

#[async_trait]
impl<P, F> FavoritesCommand for FavoritesService<P, F>
where
    P: ProjectRepository,
    F: FavoriteRepository,
{
    async fn toggle_favorite(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
    ) -> Result<FavoriteState, Error> {
        self.projects
            .find_by_id(project_id)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found(format!("project {project_id} not found")))?;

        let currently = self
            .favorites
            .exists(actor, project_id)
            .await
            .map_err(map_favorite_error)?;
        let next = FavoriteState::after_toggle(currently);

        match next {
            FavoriteState::Unfavorited => {
                self.favorites
                    .remove(actor, project_id)
                    .await
                    .map_err(map_favorite_error)?;
            }
            FavoriteState::Favorited => {
                let favorite = Favorite {
                    user_id: *actor,
                    project_id: *project_id,
                    created_at: self.clock.utc(),
                };
                self.favorites
                    .add(&favorite)
                    .await
                    .map_err(map_favorite_error)?;
            }
        }
        Ok(next)
    }
}

#[async_trait]
impl<P, F> FavoritesQuery for FavoritesService<P, F>
where
    P: ProjectRepository,
    F: FavoriteRepository,
{
    async fn list_favorites(&self, actor: &UserId) -> Result<Vec<Project>, Error> {
        let ids = self
            .favorites
            .list_for_user(actor)
            .await
            .map_err(map_favorite_error)?;
        let mut by_id: HashMap<ProjectId, Project> = self
            .projects
            .find_many(&ids)
            .await
            .map_err(map_project_error)?
            .into_iter()
            .map(|project| (project.id, project))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Duration;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockFavoriteRepository, MockProjectRepository};
    use crate::domain::{ErrorCode, ProjectDraft};
    use crate::test_support::{FixtureClock, InMemoryStore};

    fn project(title: &str, clock: &FixtureClock) -> Project {
        let draft = ProjectDraft::try_new(title, "Body", "Ana", None).expect("draft");
        Project::create(ProjectId::random(), draft, BTreeSet::new(), clock.utc())
    }

    #[rstest]
    #[tokio::test]
    async fn toggling_twice_restores_original_state() {
        let store = InMemoryStore::shared();
        let clock = Arc::new(FixtureClock::new());
        let target = project("Robots", &clock);
        store.seed_project(target.clone());
        let service = FavoritesService::new(store.clone(), store.clone(), clock);
        let actor = UserId::random();

        let first = service
            .toggle_favorite(&actor, &target.id)
            .await
            .expect("first toggle");
        let second = service
            .toggle_favorite(&actor, &target.id)
            .await
            .expect("second toggle");

        assert_eq!(first, FavoriteState::Favorited);
        assert_eq!(second, FavoriteState::Unfavorited);
        assert_eq!(store.favorite_count(), 0);
    }

    #[tokio::test]
    async fn toggle_unknown_project_is_not_found_and_touches_nothing() {
        let mut projects = MockProjectRepository::new();
        projects.expect_find_by_id().return_once(|_| Ok(None));
        let mut favorites = MockFavoriteRepository::new();
        favorites.expect_exists().never();
        favorites.expect_add().never();
        favorites.expect_remove().never();
        let service = FavoritesService::new(
            Arc::new(projects),
            Arc::new(favorites),
            Arc::new(FixtureClock::new()),
        );

        let err = service
            .toggle_favorite(&UserId::random(), &ProjectId::random())
            .await
            .expect_err("missing project");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn list_returns_newest_favorite_first() {
        let store = InMemoryStore::shared();
        let clock = Arc::new(FixtureClock::new());
        let older = project("Older", &clock);
        let newer = project("Newer", &clock);
        store.seed_project(older.clone());
        store.seed_project(newer.clone());
        let service = FavoritesService::new(store.clone(), store.clone(), clock.clone());
        let actor = UserId::random();

        service
            .toggle_favorite(&actor, &older.id)
            .await
            .expect("favorite older");
        clock.advance(Duration::seconds(5));
        service
            .toggle_favorite(&actor, &newer.id)
            .await
            .expect("favorite newer");

        let titles: Vec<String> = service
            .list_favorites(&actor)
            .await
            .expect("list")
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Newer".to_owned(), "Older".to_owned()]);

        let others = service
            .list_favorites(&UserId::random())
            .await
            .expect("list for someone else");
        assert!(others.is_empty());
    }
}
