//! Favorite membership.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{ProjectId, UserId};

/// Outcome of a favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteState {
    Favorited,
    Unfavorited,
}

impl FavoriteState {
    /// State reached by toggling from `currently_favorited`.
    ///
    /// # Examples
    /// ```
    /// use catalog::domain::FavoriteState;
    ///
    /// assert_eq!(FavoriteState::after_toggle(true), FavoriteState::Unfavorited);
    /// ```
    pub fn after_toggle(currently_favorited: bool) -> Self {
        if currently_favorited {
            Self::Unfavorited
        } else {
            Self::Favorited
        }
    }

    pub fn is_favorited(self) -> bool {
        matches!(self, Self::Favorited)
    }
}

/// A `(user, project)` favorite record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, FavoriteState::Favorited)]
    #[case(true, FavoriteState::Unfavorited)]
    fn toggle_flips(#[case] current: bool, #[case] expected: FavoriteState) {
        let next = FavoriteState::after_toggle(current);
        assert_eq!(next, expected);
        assert_eq!(FavoriteState::after_toggle(next.is_favorited()).is_favorited(), current);
    }
}
