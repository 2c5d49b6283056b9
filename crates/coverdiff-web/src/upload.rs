use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

/// An uploaded file with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parsed form fields from the multipart upload.
///
/// Either file may be absent; the pipeline decides what that means.
#[derive(Default)]
pub struct FormFields {
    pub file1: Option<UploadedFile>,
    pub file2: Option<UploadedFile>,
}

impl FormFields {
    pub fn into_buffers(self) -> (Option<Vec<u8>>, Option<Vec<u8>>) {
        (self.file1.map(|f| f.data), self.file2.map(|f| f.data))
    }
}

/// Parse a multipart form upload with `file1` and `file2` fields.
///
/// A field with no bytes (a form submitted without choosing a file) counts as
/// missing. A repeated field keeps the first occurrence.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<FormFields, MultipartError> {
    let mut fields = FormFields::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        let slot = match name.as_str() {
            "file1" => &mut fields.file1,
            "file2" => &mut fields.file2,
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
                continue;
            }
        };

        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let data = field.bytes().await?.to_vec();

        if data.is_empty() || slot.is_some() {
            continue;
        }
        tracing::debug!(field = %name, filename = %filename, bytes = data.len(), "received upload");
        *slot = Some(UploadedFile { filename, data });
    }

    Ok(fields)
}
