use chrono::Utc;
use rand::Rng;

use crate::client::UploadOptions;
use crate::models::{MediaKind, UploadFile, UploadedFile};

use super::{logged, ContentFacade, FacadeError, FacadeResult};

/// Folder for uploads that are not media items.
pub const CONTENT_FOLDER: &str = "content";

const MEDIA_CACHE_SECS: u32 = 3600;
const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

const FALLBACK_EXTENSION: &str = "bin";

/// `<unix millis>_<random [a-z0-9]>.<ext>`, where `ext` is what follows the last dot of
/// the original name. Names without a dot, or whose extension is not plain ASCII
/// alphanumerics, get `bin`.
pub fn generate_file_name(original_name: &str) -> String {
    let ext = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(FALLBACK_EXTENSION);

    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();

    format!("{}_{}.{}", Utc::now().timestamp_millis(), suffix, ext)
}

impl ContentFacade {
    /// Uploads into `folder` (normally [`CONTENT_FOLDER`]) under a fresh name.
    pub async fn upload_file(&self, file: &UploadFile, folder: &str) -> FacadeResult<UploadedFile> {
        let options = UploadOptions {
            content_type: file.content_type.clone(),
            ..Default::default()
        };
        let result = self.store(file, folder, &options).await;
        logged("uploading file", result)
    }

    /// Uploads into the folder for `kind`, cached for an hour, never overwriting.
    pub async fn upload_media_file(&self, file: &UploadFile, kind: MediaKind) -> FacadeResult<UploadedFile> {
        let options = UploadOptions {
            content_type: file.content_type.clone(),
            cache_control_secs: Some(MEDIA_CACHE_SECS),
            upsert: false,
        };
        let result = self.store(file, kind.folder(), &options).await;
        logged("uploading media file", result)
    }

    pub async fn delete_file(&self, path: &str) -> FacadeResult<()> {
        let result: FacadeResult<()> = async {
            let backend = self.ready().await?;
            backend
                .remove(&[path.to_string()])
                .await
                .map_err(FacadeError::storage)
        }
        .await;
        logged("deleting file", result)
    }

    async fn store(&self, file: &UploadFile, folder: &str, options: &UploadOptions) -> FacadeResult<UploadedFile> {
        let backend = self.ready().await?;
        let path = format!("{}/{}", folder.trim_matches('/'), generate_file_name(&file.name));

        backend
            .upload(&path, file.bytes.clone(), options)
            .await
            .map_err(FacadeError::storage)?;

        Ok(UploadedFile {
            url: backend.public_url(&path),
            path,
        })
    }
}
