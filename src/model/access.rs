use uuid::Uuid;

use crate::{
    model::error::{DatabaseError, DatabaseResult},
    web::AuthenticatedUser,
};

/// Rows that belong to exactly one user.
pub trait HasOwner {
    fn owner_id(&self) -> Uuid;
}

/// Admins reach every row; everyone else only their own.
pub fn check_access<T: HasOwner>(actor: &AuthenticatedUser, resource: &T) -> DatabaseResult<()> {
    if actor.is_admin() || resource.owner_id() == actor.user_id() {
        return Ok(());
    }
    tracing::debug!(
        "user {} denied access to a row of {}",
        actor.user_id(),
        resource.owner_id()
    );
    Err(DatabaseError::Forbidden)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::web::UserRole;

    struct Owned(Uuid);

    impl HasOwner for Owned {
        fn owner_id(&self) -> Uuid {
            self.0
        }
    }

    #[test]
    fn owner_and_admin_pass() {
        let owner = Uuid::new_v4();
        let row = Owned(owner);

        assert!(check_access(&AuthenticatedUser::new(owner, UserRole::User), &row).is_ok());
        assert!(check_access(&AuthenticatedUser::admin(), &row).is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        let row = Owned(Uuid::new_v4());
        let stranger = AuthenticatedUser::new(Uuid::new_v4(), UserRole::User);

        assert!(matches!(
            check_access(&stranger, &row),
            Err(DatabaseError::Forbidden)
        ));
    }
}
