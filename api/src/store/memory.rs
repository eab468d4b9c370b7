use std::{
    collections::BTreeMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;

use crate::models::{
    comment::{Comment, NewComment},
    publication::Publication,
    user::{AuthorProfile, User},
};

use super::{CommentStore, StoreError};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    publications: BTreeMap<i32, Publication>,
    comments: BTreeMap<i32, Comment>,
    last_comment_id: i32,
}

/// A process-local store. Every write holds the single table lock, so the
/// insert-plus-index pair is as atomic here as in a database transaction.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_index_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    pub fn add_user(&self, user: User) -> Result<(), StoreError> {
        self.tables()?.users.insert(user.id, user);
        Ok(())
    }

    pub fn add_publication(&self, publication: Publication) -> Result<(), StoreError> {
        self.tables()?
            .publications
            .insert(publication.id, publication);
        Ok(())
    }

    /// Stores a record as-is, bypassing the index maintenance of the trait
    /// methods. Useful to load pre-existing trees.
    pub fn put_comment(&self, comment: Comment) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        tables.last_comment_id = tables.last_comment_id.max(comment.id);
        tables.comments.insert(comment.id, comment);
        Ok(())
    }

    /// Makes every following index update fail, after the comment has been
    /// staged but before anything is committed.
    pub fn fail_index_writes(&self, fail: bool) {
        self.fail_index_writes.store(fail, Ordering::SeqCst);
    }

    pub fn comment_count(&self) -> Result<usize, StoreError> {
        Ok(self.tables()?.comments.len())
    }

    fn check_index_write(&self) -> Result<(), StoreError> {
        if self.fail_index_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("index write rejected".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn user_exists(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.tables()?.users.contains_key(&id))
    }

    async fn find_publication(&self, id: i32) -> Result<Option<Publication>, StoreError> {
        Ok(self.tables()?.publications.get(&id).cloned())
    }

    async fn find_comment(&self, id: i32) -> Result<Option<Comment>, StoreError> {
        Ok(self.tables()?.comments.get(&id).cloned())
    }

    async fn comments_by_publication(
        &self,
        publication_id: i32,
    ) -> Result<Vec<Comment>, StoreError> {
        Ok(self
            .tables()?
            .comments
            .values()
            .filter(|c| c.publication_id == publication_id)
            .cloned()
            .collect())
    }

    async fn comments_by_ids(&self, ids: &[i32]) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.comments.get(id).cloned())
            .collect())
    }

    async fn author_profiles(&self, ids: &[i32]) -> Result<Vec<AuthorProfile>, StoreError> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).map(AuthorProfile::from))
            .collect())
    }

    async fn insert_publication_comment(
        &self,
        comment: NewComment,
    ) -> Result<Comment, StoreError> {
        let mut tables = self.tables()?;

        if !tables.publications.contains_key(&comment.publication_id) {
            return Err(StoreError::MissingIndexOwner {
                table: "publications",
                id: comment.publication_id,
            });
        }
        self.check_index_write()?;

        let id = tables.last_comment_id + 1;
        let inserted = comment.into_comment(id);

        tables.last_comment_id = id;
        tables.comments.insert(id, inserted.clone());
        if let Some(publication) = tables.publications.get_mut(&inserted.publication_id) {
            publication.comment_ids.insert(0, id);
        }

        Ok(inserted)
    }

    async fn insert_reply(
        &self,
        comment: NewComment,
        parent_id: i32,
    ) -> Result<Comment, StoreError> {
        let mut tables = self.tables()?;

        if !tables.comments.contains_key(&parent_id) {
            return Err(StoreError::MissingIndexOwner {
                table: "comments",
                id: parent_id,
            });
        }
        self.check_index_write()?;

        let id = tables.last_comment_id + 1;
        let inserted = comment.into_comment(id);

        tables.last_comment_id = id;
        tables.comments.insert(id, inserted.clone());
        if let Some(parent) = tables.comments.get_mut(&parent_id) {
            parent.reply_ids.push(id);
        }

        Ok(inserted)
    }
}
