use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Extension, Multipart};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use museum_sdk::PlacementSurface;
use uuid::Uuid;

use crate::api::rest::dto::{CatalogObjectDto, PresetDeleted, UpdatePresetRequest};
use crate::api::rest::error::{ApiJson, ApiPath, ApiResult};
use crate::api::rest::routes::ConcreteServices;
use crate::domain::error::DomainError;
use crate::domain::ports::ImageBytes;
use crate::domain::service::{NewPreset, PresetVariantUpload};

const DEFAULT_UPLOAD_MIME: &str = "image/png";

pub async fn create(
    Extension(svc): Extension<Arc<ConcreteServices>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut multipart = multipart?;
    let mut form = PresetForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if field.file_name().is_some() || name.ends_with("[file]") {
            let mime_type = field
                .content_type()
                .map_or_else(|| DEFAULT_UPLOAD_MIME.to_owned(), str::to_owned);
            let bytes = field.bytes().await?;
            form.push_file(&name, bytes, mime_type);
        } else {
            let value = field.text().await?;
            form.push_text(&name, value);
        }
    }

    let object = svc.presets.create(form.finish()?).await?;
    Ok((StatusCode::CREATED, Json(CatalogObjectDto::from(object))))
}

pub async fn update(
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdatePresetRequest>,
) -> ApiResult<Json<CatalogObjectDto>> {
    let object = svc.presets.update(id, req.into()).await?;
    Ok(Json(object.into()))
}

pub async fn delete(
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<PresetDeleted>> {
    let deleted_id = svc.presets.delete(id).await?;
    Ok(Json(PresetDeleted {
        message: "Object deleted successfully",
        deleted_id,
    }))
}

#[derive(Default)]
struct VariantParts {
    name: Option<String>,
    color: Option<String>,
    file: Option<ImageBytes>,
}

/// Accumulates the flat multipart fields of a preset upload.
#[derive(Default)]
struct PresetForm {
    name: Option<String>,
    description: Option<String>,
    on_type: Option<String>,
    variants: BTreeMap<usize, VariantParts>,
}

enum VariantField {
    Name,
    Color,
    File,
}

/// Splits `imageVariants[3][color]` into its index and part.
fn variant_key(key: &str) -> Option<(usize, VariantField)> {
    let rest = key.strip_prefix("imageVariants[")?;
    let (index, rest) = rest.split_once("][")?;
    let field = match rest.strip_suffix(']')? {
        "name" => VariantField::Name,
        "color" => VariantField::Color,
        "file" => VariantField::File,
        _ => return None,
    };
    Some((index.parse().ok()?, field))
}

impl PresetForm {
    fn push_text(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = Some(value),
            "description" => self.description = Some(value),
            "onType" => self.on_type = Some(value),
            _ => match variant_key(key) {
                Some((index, VariantField::Name)) => {
                    self.variants.entry(index).or_default().name = Some(value);
                }
                Some((index, VariantField::Color)) => {
                    self.variants.entry(index).or_default().color = Some(value);
                }
                Some((_, VariantField::File)) | None => {
                    tracing::debug!(field = %key, "ignoring unexpected form field");
                }
            },
        }
    }

    fn push_file(&mut self, key: &str, bytes: Bytes, mime_type: String) {
        if let Some((index, VariantField::File)) = variant_key(key) {
            self.variants.entry(index).or_default().file = Some(ImageBytes { bytes, mime_type });
        } else {
            tracing::debug!(field = %key, "ignoring unexpected file part");
        }
    }

    fn finish(self) -> Result<NewPreset, DomainError> {
        let on_type = self
            .on_type
            .ok_or_else(|| DomainError::validation("onType", "is required"))?;
        let placement_surface: PlacementSurface = on_type
            .parse()
            .map_err(|e: String| DomainError::validation("onType", e))?;

        let mut variants = Vec::with_capacity(self.variants.len());
        for (position, parts) in self.variants.into_values().enumerate() {
            let field = format!("imageVariants[{position}]");
            let (Some(name), Some(color), Some(file)) = (parts.name, parts.color, parts.file)
            else {
                return Err(DomainError::validation(
                    field,
                    "must have name, color and file",
                ));
            };
            if name.trim().is_empty() || color.trim().is_empty() || file.bytes.is_empty() {
                return Err(DomainError::validation(
                    field,
                    "must have name, color and file",
                ));
            }
            variants.push(PresetVariantUpload { name, color, file });
        }

        Ok(NewPreset {
            name: self.name.unwrap_or_default(),
            description: self.description,
            placement_surface,
            variants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> Bytes {
        Bytes::from_static(b"\x89PNG")
    }

    #[test]
    fn variant_keys() {
        assert!(matches!(
            variant_key("imageVariants[2][color]"),
            Some((2, VariantField::Color))
        ));
        assert!(matches!(
            variant_key("imageVariants[0][file]"),
            Some((0, VariantField::File))
        ));
        assert!(variant_key("imageVariants[x][name]").is_none());
        assert!(variant_key("imageVariants[0][size]").is_none());
        assert!(variant_key("imageSets[0][name]").is_none());
    }

    #[test]
    fn form_collects_variants_in_index_order() {
        let mut form = PresetForm::default();
        form.push_text("name", "Lantern".to_owned());
        form.push_text("onType", "LeftWall".to_owned());
        form.push_file("imageVariants[1][file]", png(), "image/jpeg".to_owned());
        form.push_text("imageVariants[1][name]", "Night".to_owned());
        form.push_text("imageVariants[1][color]", "#000000".to_owned());
        form.push_text("imageVariants[0][name]", "Day".to_owned());
        form.push_text("imageVariants[0][color]", "#ffffff".to_owned());
        form.push_file("imageVariants[0][file]", png(), "image/png".to_owned());

        let preset = form.finish().unwrap();
        assert_eq!(preset.name, "Lantern");
        assert_eq!(preset.placement_surface, PlacementSurface::Wall);
        assert_eq!(preset.variants.len(), 2);
        assert_eq!(preset.variants[0].name, "Day");
        assert_eq!(preset.variants[1].file.mime_type, "image/jpeg");
    }

    #[test]
    fn incomplete_variant_is_rejected() {
        let mut form = PresetForm::default();
        form.push_text("name", "Lantern".to_owned());
        form.push_text("onType", "Floor".to_owned());
        form.push_text("imageVariants[0][name]", "Day".to_owned());
        form.push_text("imageVariants[0][color]", "#ffffff".to_owned());

        let err = form.finish().unwrap_err();
        assert!(
            matches!(err, DomainError::Validation { ref field, .. } if field == "imageVariants[0]")
        );
    }

    #[test]
    fn placement_surface_is_required_and_checked() {
        let err = PresetForm::default().finish().unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "onType"));

        let mut form = PresetForm::default();
        form.push_text("onType", "Ceiling".to_owned());
        assert!(form.finish().is_err());
    }
}
