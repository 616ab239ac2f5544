use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, StoreError, User};

/// Process-local store. Uniqueness is checked and written under one write lock.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

fn email_taken(users: &[User], email: &str, exclude: Option<Uuid>) -> bool {
    users
        .iter()
        .any(|u| u.email == email && Some(u.id) != exclude)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email == email && Some(u.id) != exclude)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(StoreError::Conflict);
        }
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, user: &NewUser) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(pos) = users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        if email_taken(&users, &user.email, Some(id)) {
            return Err(StoreError::Conflict);
        }
        let existing = &mut users[pos];
        existing.name = user.name.clone();
        existing.email = user.email.clone();
        existing.updated_at = OffsetDateTime::now_utc();
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn create_rejects_taken_email_atomically() {
        let store = MemoryUserStore::default();
        store.create(&new_user("Ana", "ana@x.com")).await.unwrap();

        let err = store.create(&new_user("Other", "ana@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_excludes_self_from_uniqueness() {
        let store = MemoryUserStore::default();
        let ana = store.create(&new_user("Ana", "ana@x.com")).await.unwrap();
        let bob = store.create(&new_user("Bob", "bob@x.com")).await.unwrap();

        let renamed = store
            .update(ana.id, &new_user("Ana Maria", "ana@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.id, ana.id);
        assert_eq!(renamed.name, "Ana Maria");

        let err = store.update(bob.id, &new_user("Bob", "ana@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
    }

    #[tokio::test]
    async fn absent_records_are_none_not_errors() {
        let store = MemoryUserStore::default();
        let id = Uuid::new_v4();
        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(store.update(id, &new_user("A", "a@x.com")).await.unwrap().is_none());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn update_of_absent_id_is_none_even_if_email_taken() {
        let store = MemoryUserStore::default();
        store.create(&new_user("Ana", "ana@x.com")).await.unwrap();

        let res = store.update(Uuid::new_v4(), &new_user("X", "ana@x.com")).await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn find_all_keeps_creation_order() {
        let store = MemoryUserStore::default();
        for (name, email) in [("A", "a@x.com"), ("B", "b@x.com"), ("C", "c@x.com")] {
            store.create(&new_user(name, email)).await.unwrap();
        }
        let names: Vec<_> = store.find_all().await.unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }
}
