use futures_util::future::try_join5;

use crate::client::{Query, Table};
use crate::models::{ContentKind, ContentPatch, ContentRecord, DashboardStats, NewContent, RecordId};

use super::{decode_rows, decode_single, logged, to_row, ContentFacade, FacadeResult, ID, PUBLISHED, TYPE};

impl ContentFacade {
    /// Authoring view: every record of `kind` (or of all kinds), published or not, newest first.
    pub async fn list_content(&self, kind: Option<ContentKind>) -> FacadeResult<Vec<ContentRecord>> {
        let result: FacadeResult<Vec<ContentRecord>> = async {
            let backend = self.ready().await?;
            let mut query = Query::from(Table::Content).newest_first();
            if let Some(kind) = kind {
                query = query.eq(TYPE, kind);
            }
            decode_rows(backend.select(&query).await?)
        }
        .await;
        logged("fetching content", result)
    }

    /// Public view: published records of one kind, newest first. A zero limit means no limit.
    pub async fn get_public_content(&self, kind: ContentKind, limit: Option<u32>) -> FacadeResult<Vec<ContentRecord>> {
        let result: FacadeResult<Vec<ContentRecord>> = async {
            let backend = self.ready().await?;
            let mut query = Query::from(Table::Content)
                .eq(TYPE, kind)
                .eq(PUBLISHED, true)
                .newest_first();
            if let Some(limit) = limit.filter(|n| *n > 0) {
                query = query.limit(limit);
            }
            decode_rows(backend.select(&query).await?)
        }
        .await;
        logged("fetching public content", result)
    }

    pub async fn get_content(&self, id: &RecordId) -> FacadeResult<ContentRecord> {
        let result: FacadeResult<ContentRecord> = async {
            let backend = self.ready().await?;
            let query = Query::from(Table::Content).eq(ID, id);
            decode_single(backend.select(&query).await?, "Content")
        }
        .await;
        logged("fetching content", result)
    }

    pub async fn create_content(&self, content: &NewContent) -> FacadeResult<ContentRecord> {
        let result: FacadeResult<ContentRecord> = async {
            let backend = self.ready().await?;
            let row = backend.insert(Table::Content, to_row(content)?).await?;
            Ok(serde_json::from_value(row)?)
        }
        .await;
        logged("creating content", result)
    }

    pub async fn update_content(&self, id: &RecordId, patch: &ContentPatch) -> FacadeResult<ContentRecord> {
        let result: FacadeResult<ContentRecord> = async {
            let backend = self.ready().await?;
            let query = Query::from(Table::Content).eq(ID, id);
            let rows = backend.update(&query, to_row(patch)?).await?;
            decode_single(rows, "Content")
        }
        .await;
        logged("updating content", result)
    }

    pub async fn delete_content(&self, id: &RecordId) -> FacadeResult<()> {
        let result: FacadeResult<()> = async {
            let backend = self.ready().await?;
            backend.delete(&Query::from(Table::Content).eq(ID, id)).await?;
            Ok(())
        }
        .await;
        logged("deleting content", result)
    }

    /// Per-kind and total record counts, queried concurrently. Any failed count fails the whole call.
    pub async fn dashboard_stats(&self) -> FacadeResult<DashboardStats> {
        let result: FacadeResult<DashboardStats> = async {
            let backend = self.ready().await?;
            let count = |kind: Option<ContentKind>| {
                let backend = backend.clone();
                async move {
                    let mut query = Query::from(Table::Content);
                    if let Some(kind) = kind {
                        query = query.eq(TYPE, kind);
                    }
                    backend.count(&query).await
                }
            };

            let (courses, news, files, pages, total_content) = try_join5(
                count(Some(ContentKind::Courses)),
                count(Some(ContentKind::News)),
                count(Some(ContentKind::Files)),
                count(Some(ContentKind::Pages)),
                count(None),
            )
            .await?;

            Ok(DashboardStats {
                total_content,
                courses,
                news,
                files,
                pages,
            })
        }
        .await;
        logged("fetching stats", result)
    }
}
