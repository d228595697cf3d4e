use crate::client::{page_range, Query, Table};
use crate::models::{MediaKind, MediaPatch, MediaRecord, NewMedia, Page, Pagination, RecordId};

use super::{decode_rows, decode_single, logged, to_row, ContentFacade, FacadeError, FacadeResult, ID, TYPE};

impl ContentFacade {
    /// One page of media, newest first, plus the total for the same filter.
    pub async fn list_media(&self, kind: Option<MediaKind>, page: u32, page_size: u32) -> FacadeResult<Page<MediaRecord>> {
        let result: FacadeResult<Page<MediaRecord>> = async {
            let backend = self.ready().await?;
            let page = page.max(1);
            let page_size = page_size.max(1);

            let mut query = Query::from(Table::Media).newest_first();
            if let Some(kind) = kind {
                query = query.eq(TYPE, kind);
            }
            let (from, to) = page_range(page, page_size);
            let data = decode_rows(backend.select(&query.clone().range(from, to)).await?)?;

            let total = match backend.count(&query).await {
                Ok(total) => total,
                Err(e) => {
                    log::warn!("Media count unavailable, reporting zero total: {}", e);
                    0
                }
            };

            Ok(Page {
                data,
                pagination: Pagination::new(page, page_size, total),
            })
        }
        .await;
        logged("fetching media", result)
    }

    pub async fn get_media(&self, id: &RecordId) -> FacadeResult<MediaRecord> {
        let result: FacadeResult<MediaRecord> = async {
            let backend = self.ready().await?;
            let query = Query::from(Table::Media).eq(ID, id);
            decode_single(backend.select(&query).await?, "Media item")
        }
        .await;
        logged("fetching media", result)
    }

    pub async fn create_media(&self, media: &NewMedia) -> FacadeResult<MediaRecord> {
        let result: FacadeResult<MediaRecord> = async {
            let backend = self.ready().await?;
            let row = backend.insert(Table::Media, to_row(media)?).await?;
            Ok(serde_json::from_value(row)?)
        }
        .await;
        logged("creating media", result)
    }

    pub async fn update_media(&self, id: &RecordId, patch: &MediaPatch) -> FacadeResult<MediaRecord> {
        let result: FacadeResult<MediaRecord> = async {
            let backend = self.ready().await?;
            let query = Query::from(Table::Media).eq(ID, id);
            let rows = backend.update(&query, to_row(patch)?).await?;
            decode_single(rows, "Media item")
        }
        .await;
        logged("updating media", result)
    }

    /// Deletes the row, then its stored file unless it is a video link.
    ///
    /// The row goes first; a failed file removal afterwards is only a warning.
    pub async fn delete_media(&self, id: &RecordId) -> FacadeResult<()> {
        let result: FacadeResult<()> = async {
            let backend = self.ready().await?;
            let item = self
                .get_media(id)
                .await
                .map_err(|_| FacadeError::not_found("Media item not found"))?;

            backend.delete(&Query::from(Table::Media).eq(ID, id)).await?;

            if let Some(path) = item.owned_file_path() {
                if let Err(e) = backend.remove(&[path.to_string()]).await {
                    log::warn!("Error deleting file from storage for media {}: {}", id, e);
                }
            }
            Ok(())
        }
        .await;
        logged("deleting media", result)
    }
}
