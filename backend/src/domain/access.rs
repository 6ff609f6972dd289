//! Ownership and role checks that gate catalog mutations.

use super::{Error, Project, User};

/// Whether `actor` may edit or delete `project`.
///
/// Anonymous actors never may; administrators always may; anyone else must be
/// one of the project's associated authors.
pub fn can_mutate(actor: Option<&User>, project: &Project) -> bool {
    actor.is_some_and(|user| user.is_admin() || project.has_author(user.id()))
}

/// [`can_mutate`] as a guard returning [`Error::forbidden`].
pub fn ensure_can_mutate(actor: Option<&User>, project: &Project) -> Result<(), Error> {
    if can_mutate(actor, project) {
        Ok(())
    } else {
        Err(Error::forbidden("you do not have permission to modify this project"))
    }
}

/// Admit administrators only.
pub fn ensure_admin(actor: &User) -> Result<(), Error> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("administrator role required"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{DisplayName, Email, ErrorCode, ProjectDraft, ProjectId, UserId};

    fn user(is_admin: bool) -> User {
        User::new(
            UserId::random(),
            DisplayName::new("Ana").expect("name"),
            Email::new("ana@example.org").expect("email"),
            None,
            is_admin,
        )
    }

    fn project_with(authors: &[UserId]) -> Project {
        let draft = ProjectDraft::try_new("Robots", "Study", "Ana", None).expect("draft");
        Project::create(
            ProjectId::random(),
            draft,
            authors.iter().copied().collect::<BTreeSet<_>>(),
            Utc::now(),
        )
    }

    #[fixture]
    fn author() -> User {
        user(false)
    }

    #[rstest]
    fn anonymous_actor_is_denied(author: User) {
        let project = project_with(&[*author.id()]);
        assert!(!can_mutate(None, &project));
        let err = ensure_can_mutate(None, &project).expect_err("denied");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn admin_is_allowed_without_authorship() {
        let admin = user(true);
        assert!(can_mutate(Some(&admin), &project_with(&[])));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn non_admin_access_matches_membership(author: User, #[case] is_member: bool) {
        let authors = if is_member {
            vec![*author.id(), UserId::random()]
        } else {
            vec![UserId::random()]
        };
        let project = project_with(&authors);
        assert_eq!(can_mutate(Some(&author), &project), is_member);
        assert_eq!(ensure_can_mutate(Some(&author), &project).is_ok(), is_member);
    }

    #[rstest]
    fn ensure_admin_rejects_regular_users(author: User) {
        let err = ensure_admin(&author).expect_err("not admin");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert!(ensure_admin(&user(true)).is_ok());
    }
}
