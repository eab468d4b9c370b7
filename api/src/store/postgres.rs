use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Array, Int4};
use diesel_async::{
    AsyncConnection, AsyncPgConnection, RunQueryDsl,
    pooled_connection::{
        AsyncDieselConnectionManager,
        deadpool::{Object, Pool},
    },
    scoped_futures::ScopedFutureExt,
};

use crate::models::{
    comment::{Comment, NewComment},
    publication::Publication,
    user::AuthorProfile,
};

use super::{CommentStore, StoreError};

diesel::define_sql_function! {
    fn array_prepend(element: Int4, array: Array<Int4>) -> Array<Int4>;
}

diesel::define_sql_function! {
    fn array_append(array: Array<Int4>, element: Int4) -> Array<Int4>;
}

pub struct PgStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgStore {
    pub fn connect(
        database_url: &str,
        max_connections: usize,
        timeout: Duration,
    ) -> Result<Self, eyre::Error> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);

        let pool = Pool::builder(manager)
            .max_size(max_connections)
            .runtime(deadpool_runtime::Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .build()
            .map_err(|e| eyre::eyre!("couldn't build the database pool: {e}"))?;

        Ok(PgStore { pool })
    }

    async fn conn(&self) -> Result<Object<AsyncPgConnection>, StoreError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn user_exists(&self, id: i32) -> Result<bool, StoreError> {
        use crate::schema::users;

        let mut conn = self.conn().await?;

        Ok(diesel::select(diesel::dsl::exists(users::table.find(id)))
            .get_result::<bool>(&mut conn)
            .await?)
    }

    async fn find_publication(&self, id: i32) -> Result<Option<Publication>, StoreError> {
        use crate::schema::publications;

        let mut conn = self.conn().await?;

        Ok(publications::table
            .find(id)
            .select(Publication::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn find_comment(&self, id: i32) -> Result<Option<Comment>, StoreError> {
        use crate::schema::comments;

        let mut conn = self.conn().await?;

        Ok(comments::table
            .find(id)
            .select(Comment::as_select())
            .first(&mut conn)
            .await
            .optional()?)
    }

    async fn comments_by_publication(
        &self,
        publication_id: i32,
    ) -> Result<Vec<Comment>, StoreError> {
        use crate::schema::comments;

        let mut conn = self.conn().await?;

        Ok(comments::table
            .filter(comments::publication_id.eq(publication_id))
            .select(Comment::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn comments_by_ids(&self, ids: &[i32]) -> Result<Vec<Comment>, StoreError> {
        use crate::schema::comments;

        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.conn().await?;

        Ok(comments::table
            .filter(comments::id.eq_any(ids.to_vec()))
            .select(Comment::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn author_profiles(&self, ids: &[i32]) -> Result<Vec<AuthorProfile>, StoreError> {
        use crate::schema::users;

        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.conn().await?;

        Ok(users::table
            .filter(users::id.eq_any(ids.to_vec()))
            .select(AuthorProfile::as_select())
            .load(&mut conn)
            .await?)
    }

    async fn insert_publication_comment(
        &self,
        comment: NewComment,
    ) -> Result<Comment, StoreError> {
        use crate::schema::{comments, publications};

        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction::<_, StoreError, _>(move |conn| {
            async move {
                let inserted: Comment = diesel::insert_into(comments::table)
                    .values(&comment)
                    .returning(Comment::as_returning())
                    .get_result(conn)
                    .await?;

                let updated = diesel::update(publications::table.find(inserted.publication_id))
                    .set(
                        publications::comment_ids
                            .eq(array_prepend(inserted.id, publications::comment_ids)),
                    )
                    .execute(conn)
                    .await?;

                if updated != 1 {
                    return Err(StoreError::MissingIndexOwner {
                        table: "publications",
                        id: inserted.publication_id,
                    });
                }

                Ok(inserted)
            }
            .scope_boxed()
        })
        .await
    }

    async fn insert_reply(
        &self,
        comment: NewComment,
        parent_id: i32,
    ) -> Result<Comment, StoreError> {
        use crate::schema::comments;

        let mut conn = self.conn().await?;
        let conn: &mut AsyncPgConnection = &mut conn;

        conn.transaction::<_, StoreError, _>(move |conn| {
            async move {
                let inserted: Comment = diesel::insert_into(comments::table)
                    .values(&comment)
                    .returning(Comment::as_returning())
                    .get_result(conn)
                    .await?;

                let updated = diesel::update(comments::table.find(parent_id))
                    .set(comments::reply_ids.eq(array_append(comments::reply_ids, inserted.id)))
                    .execute(conn)
                    .await?;

                if updated != 1 {
                    return Err(StoreError::MissingIndexOwner {
                        table: "comments",
                        id: parent_id,
                    });
                }

                Ok(inserted)
            }
            .scope_boxed()
        })
        .await
    }
}
