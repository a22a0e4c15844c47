use axum::extract::multipart::Field;

use crate::error::AppResult;
use crate::insights::UploadedFile;

pub async fn read_upload(field: Field<'_>) -> AppResult<UploadedFile> {
    let file_name = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(str::to_owned);
    let data = field.bytes().await?;

    Ok(UploadedFile {
        file_name,
        content_type,
        data,
    })
}
