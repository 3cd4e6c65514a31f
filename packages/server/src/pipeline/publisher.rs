use chrono::Utc;
use common::RequestStatus;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionSession, TransactionTrait,
};
use uuid::Uuid;

use super::embed::embed_snippet;
use super::resolver::ResolvedUrls;
use crate::entity::{model, request};
use crate::error::AppError;

fn already_published(request_id: i32) -> AppError {
    AppError::Conflict(format!("Request {request_id} already has a published model"))
}

/// Creates Model records and links them to their Request.
pub struct ModelPublisher<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
    embed_base_url: &'a str,
}

impl<'a, C: ConnectionTrait + TransactionTrait> ModelPublisher<'a, C> {
    pub fn new(conn: &'a C, embed_base_url: &'a str) -> Self {
        Self {
            conn,
            embed_base_url,
        }
    }

    /// Fails unless the request exists and has no model yet.
    ///
    /// Run before storing anything so that doomed uploads leave no files behind.
    pub async fn ensure_publishable(&self, request_id: i32) -> Result<request::Model, AppError> {
        let request = request::Entity::find_by_id(request_id)
            .one(self.conn)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        if request.model_id.is_some() {
            return Err(already_published(request_id));
        }
        Ok(request)
    }

    /// Insert the Model and mark its Request completed, atomically.
    ///
    /// The Request update only matches while `model_id` is still NULL; when a
    /// concurrent publish got there first, nothing is written and the call
    /// fails with `Conflict`.
    pub async fn publish(
        &self,
        request_id: i32,
        urls: ResolvedUrls,
        uploaded_by: i32,
    ) -> Result<model::Model, AppError> {
        let model_id = Uuid::now_v7();
        let embed_code = embed_snippet(self.embed_base_url, model_id);
        let now = Utc::now();

        let txn = self.conn.begin().await?;

        request::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or(AppError::RequestNotFound)?;

        let model = model::ActiveModel {
            id: Set(model_id),
            request_id: Set(request_id),
            glb_file: Set(urls.glb_file),
            usdz_file: Set(urls.usdz_file),
            poster_image: Set(urls.poster_image),
            embed_code: Set(embed_code),
            uploaded_by: Set(uploaded_by),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => already_published(request_id),
            _ => AppError::from(e),
        })?;

        let updated = request::Entity::update_many()
            .set(request::ActiveModel {
                model_id: Set(Some(model_id)),
                status: Set(RequestStatus::Completed),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(request::Column::Id.eq(request_id))
            .filter(request::Column::ModelId.is_null())
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            txn.rollback().await?;
            tracing::warn!(request_id, %model_id, "Lost publish race; model discarded");
            return Err(already_published(request_id));
        }

        txn.commit().await?;

        tracing::info!(request_id, %model_id, uploaded_by, "Published model");
        Ok(model)
    }
}
