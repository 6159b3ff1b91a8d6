//! Staff-only administrative console, served as JSON.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use serde_json::Value;
use uuid::Uuid;

use yatube_core::admin::{self, AdminModel, ChangeListQuery, ModelAdmin};
use yatube_core::domain::{Group, slugify};
use yatube_shared::dto::{
    AdminModelInfo, ChangeListResponse, ChangeListRowResponse, CreateGroupRequest,
    GroupResponse, InlineEditRequest,
};

use crate::middleware::auth::StaffUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn model_info(admin: &ModelAdmin) -> AdminModelInfo {
    AdminModelInfo {
        model: admin.model.to_string(),
        verbose_name: admin.verbose_name.to_string(),
        verbose_name_plural: admin.verbose_name_plural.to_string(),
        list_display: strings(admin.list_display),
        list_editable: strings(admin.list_editable),
        search_fields: strings(admin.search_fields),
        list_filter: strings(admin.list_filter),
        prepopulated_fields: admin
            .prepopulated_fields
            .iter()
            .map(|(target, sources)| (target.to_string(), strings(sources)))
            .collect(),
    }
}

/// GET /admin/
pub async fn index(_staff: StaffUser) -> HttpResponse {
    let models: Vec<AdminModelInfo> = admin::registry().into_iter().map(model_info).collect();
    HttpResponse::Ok().json(models)
}

/// GET /admin/{model}/?q=&{filter}=&page=
pub async fn change_list(
    _staff: StaffUser,
    state: web::Data<AppState>,
    model: web::Path<String>,
    params: web::Query<BTreeMap<String, String>>,
) -> AppResult<HttpResponse> {
    let model: AdminModel = model.parse()?;
    let admin = admin::lookup(model);
    let query = ChangeListQuery::parse(admin, &params)?;

    let page = state.admin.change_list(admin, &query).await?;

    Ok(HttpResponse::Ok().json(ChangeListResponse {
        model: model.to_string(),
        columns: strings(admin.list_display),
        rows: page
            .object_list
            .into_iter()
            .map(|row| ChangeListRowResponse {
                pk: row.pk,
                values: row.values,
            })
            .collect(),
        page: page.number,
        num_pages: page.num_pages,
        count: page.count,
    }))
}

/// Group id from an inline edit value: a UUID string, or null/"" to clear.
async fn group_choice(state: &AppState, value: &Value) -> AppResult<Option<Uuid>> {
    let raw = match value {
        Value::Null => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim(),
        other => {
            return Err(AppError::BadRequest(format!(
                "group: expected a group id or null, got {other}"
            )));
        }
    };

    let id = Uuid::parse_str(raw)
        .map_err(|_| AppError::BadRequest(format!("group: '{raw}' is not a group id")))?;
    if state.groups.find_by_id(id).await?.is_none() {
        return Err(AppError::BadRequest(format!("group: '{raw}' does not exist")));
    }
    Ok(Some(id))
}

/// PATCH /admin/{model}/{id}/ - edit `list_editable` columns in place.
pub async fn inline_edit(
    staff: StaffUser,
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
    body: web::Json<InlineEditRequest>,
) -> AppResult<HttpResponse> {
    let (model, id) = path.into_inner();
    let model: AdminModel = model.parse()?;
    let admin = admin::lookup(model);

    if body.columns.is_empty() {
        return Err(AppError::BadRequest("no columns to update".to_string()));
    }
    if let Some(column) = body.columns.keys().find(|c| !admin.is_editable(c)) {
        return Err(AppError::BadRequest(format!(
            "'{column}' is not editable on {model}"
        )));
    }

    for (column, value) in &body.columns {
        match (model, column.as_str()) {
            (AdminModel::Post, "group") => {
                let group_id = group_choice(&state, value).await?;
                state.admin.set_post_group(id, group_id).await?;
            }
            _ => {
                return Err(AppError::Internal(format!(
                    "editable column {model}.{column} has no handler"
                )));
            }
        }
    }

    tracing::info!(staff = %staff.0.username, %model, %id, "Inline edit");
    Ok(HttpResponse::NoContent().finish())
}

/// Value of a field a prepopulated field is derived from.
fn group_field<'a>(req: &'a CreateGroupRequest, field: &str) -> Option<&'a str> {
    match field {
        "title" => Some(req.title.as_str()),
        "description" => Some(req.description.as_str()),
        _ => None,
    }
}

/// POST /admin/{model}/ - only groups are created from the console.
pub async fn add(
    staff: StaffUser,
    state: web::Data<AppState>,
    model: web::Path<String>,
    body: web::Json<CreateGroupRequest>,
) -> AppResult<HttpResponse> {
    let model: AdminModel = model.parse()?;
    if model != AdminModel::Group {
        return Err(AppError::BadRequest(format!(
            "{model} entries cannot be added from the console"
        )));
    }
    let admin = admin::lookup(model);
    let req = body.into_inner();

    let slug = match req.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => {
            let sources = admin.prepopulated_from("slug").unwrap_or_default();
            let seed: Vec<&str> = sources
                .iter()
                .filter_map(|field| group_field(&req, field))
                .collect();
            slugify(&seed.join(" "))
        }
    };

    let group = Group::new(req.title.trim().to_string(), slug, req.description.clone());
    group.validate()?;

    let group = state.groups.save(group).await.map_err(|e| {
        if e.is_constraint() {
            AppError::Conflict("A group with this slug already exists".to_string())
        } else {
            AppError::from(e)
        }
    })?;
    tracing::info!(staff = %staff.0.username, slug = %group.slug, "Group created");

    Ok(HttpResponse::Created().json(GroupResponse {
        id: group.id,
        title: group.title,
        slug: group.slug,
        description: group.description,
    }))
}

/// DELETE /admin/{model}/{id}/
pub async fn delete(
    staff: StaffUser,
    state: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> AppResult<HttpResponse> {
    let (model, id) = path.into_inner();
    let model: AdminModel = model.parse()?;

    state.admin.delete(model, id).await?;
    tracing::info!(staff = %staff.0.username, %model, %id, "Deleted from console");

    Ok(HttpResponse::NoContent().finish())
}
