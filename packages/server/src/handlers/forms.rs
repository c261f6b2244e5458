use std::collections::HashMap;

use axum::extract::multipart::{Field, Multipart};
use axum::extract::DefaultBodyLimit;

use crate::error::AppError;
use crate::upload::{ALLOWED_IMAGE_EXTENSIONS, ImageUploader};

/// Body limit for multipart content forms: 2 MB image plus field overhead.
pub fn content_form_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(4 * 1024 * 1024)
}

/// Validated image file received in a content form.
pub struct ImagePart {
    pub data: Vec<u8>,
    /// Lowercased original extension, from the allow-list.
    pub extension: String,
}

/// Parsed multipart content form: text fields plus an optional image.
pub struct ContentForm {
    fields: HashMap<String, String>,
    pub imagen: Option<ImagePart>,
}

impl ContentForm {
    /// Text field by name; missing fields read as empty (validation rejects
    /// required ones afterwards).
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

/// Read a multipart form with text fields and an optional `imagen` file.
///
/// The image is validated here (extension allow-list, image content type,
/// size limit) so callers can fail before any storage or database write.
pub async fn read_content_form(
    multipart: &mut Multipart,
    max_image_size: u64,
) -> Result<ContentForm, AppError> {
    let mut fields = HashMap::new();
    let mut imagen = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Error de formulario multipart: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "imagen" {
            imagen = read_image_field(field, max_image_size).await?;
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("No se pudo leer el campo {name}: {e}")))?;
            fields.insert(name, text);
        }
    }

    Ok(ContentForm { fields, imagen })
}

async fn read_image_field(
    mut field: Field<'_>,
    max_size: u64,
) -> Result<Option<ImagePart>, AppError> {
    // Browsers submit an empty part for an untouched file input.
    let Some(file_name) = field.file_name().map(str::to_string).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            AppError::Validation("La imagen debe tener una extensión de archivo".into())
        })?;

    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "La imagen debe ser de tipo: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )));
    }

    if let Some(content_type) = field.content_type()
        && !content_type.starts_with("image/")
    {
        return Err(AppError::Validation(
            "El archivo imagen debe ser una imagen".into(),
        ));
    }

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Error al leer la imagen: {e}")))?
    {
        if (data.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "La imagen supera el tamaño máximo de {max_size} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        return Ok(None);
    }

    Ok(Some(ImagePart { data, extension }))
}

/// Best-effort deletion of a stale or orphaned image blob.
///
/// Failures are logged with the acting identity and operation, never
/// propagated: an orphan blob is an accepted cost, a failed request is not.
pub async fn discard_image(
    images: &ImageUploader,
    usuario: &str,
    operation: &str,
    path: Option<&str>,
) {
    let Some(path) = path else {
        return;
    };
    if let Err(e) = images.delete_if_exists(path).await {
        tracing::error!(usuario, operation, path, error = %e, "failed to delete stale image");
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::extract::{FromRequest, Multipart};
    use axum::http::Request;

    use super::*;

    const BOUNDARY: &str = "XBOUNDARYX";
    const MAX: u64 = 2 * 1024 * 1024;

    struct Part {
        name: String,
        file_name: Option<String>,
        content_type: Option<String>,
        body: String,
    }

    fn text(name: &str, body: &str) -> Part {
        Part {
            name: name.into(),
            file_name: None,
            content_type: None,
            body: body.into(),
        }
    }

    fn file(file_name: &str, content_type: &str, body: String) -> Part {
        Part {
            name: "imagen".into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            body,
        }
    }

    async fn parse(parts: &[Part], max_image_size: u64) -> Result<ContentForm, AppError> {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"",
                part.name
            ));
            if let Some(file_name) = &part.file_name {
                body.push_str(&format!("; filename=\"{file_name}\""));
            }
            body.push_str("\r\n");
            if let Some(content_type) = &part.content_type {
                body.push_str(&format!("Content-Type: {content_type}\r\n"));
            }
            body.push_str("\r\n");
            body.push_str(&part.body);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        read_content_form(&mut multipart, max_image_size).await
    }

    #[tokio::test]
    async fn collects_text_fields_and_image() {
        let form = parse(
            &[
                text("titulo", "Hola"),
                file("Foto.PNG", "image/png", "png bytes".into()),
            ],
            MAX,
        )
        .await
        .unwrap();

        assert_eq!(form.text("titulo"), "Hola");
        assert_eq!(form.text("missing"), "");
        let imagen = form.imagen.unwrap();
        assert_eq!(imagen.extension, "png");
        assert_eq!(imagen.data, b"png bytes");
    }

    #[tokio::test]
    async fn rejects_disallowed_extension() {
        let result = parse(&[file("payload.exe", "image/png", "x".into())], MAX).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn rejects_filename_without_extension() {
        let result = parse(&[file("noextension", "image/png", "x".into())], MAX).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn rejects_non_image_content_type() {
        let result = parse(&[file("notes.png", "text/plain", "x".into())], MAX).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn rejects_image_over_the_size_limit() {
        let result = parse(&[file("big.png", "image/png", "a".repeat(64))], 16).await;
        let Err(AppError::Validation(message)) = result else {
            panic!("oversized image was accepted");
        };
        assert!(message.contains("tamaño"));
    }

    #[tokio::test]
    async fn empty_image_part_reads_as_no_image() {
        let form = parse(
            &[text("titulo", "Hola"), file("a.png", "image/png", "".into())],
            MAX,
        )
        .await
        .unwrap();
        assert!(form.imagen.is_none());
    }
}
