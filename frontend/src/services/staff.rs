use serde_json::{json, Map, Value};
use validator::Validate;

use crate::api::{decode_rows, Backend, Query, Staff, StaffRole, StaffStatus};
use crate::services::{
    auth::require_admin,
    error::{ServiceError, ServiceResult},
    PageRequest, Paged,
};

pub const STAFF_CODE_PREFIX: &str = "STF";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffQuery {
    pub page: PageRequest,
    /// Matched against code, name, email and department.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct NewStaff {
    /// Generated when empty.
    #[validate(length(max = 20, message = "Staff ID must be at most 20 characters"))]
    pub staff_id: Option<String>,
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub department: Option<String>,
    pub role: StaffRole,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct StaffUpdate {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// An empty string clears the department.
    pub department: Option<String>,
    pub role: Option<StaffRole>,
}

/// Next `STF###` code after the highest numeric code in use.
pub fn next_staff_code<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let highest = existing
        .into_iter()
        .filter_map(|code| code.strip_prefix(STAFF_CODE_PREFIX))
        .filter_map(|digits| digits.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:03}", STAFF_CODE_PREFIX, highest + 1)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn get_all_staff(backend: &Backend, query: &StaffQuery) -> ServiceResult<Paged<Staff>> {
    let mut select = Query::table("staff").order("staff_id", true);
    if let Some(term) = non_empty(query.search.as_deref()) {
        select = select.any_ilike(
            &["staff_id", "name", "email", "department"],
            format!("%{}%", term),
        );
    }
    let result = backend
        .store
        .select(&select.page(query.page.page, query.page.limit).count_exact())
        .await
        .map_err(|err| ServiceError::backend("Failed to load staff", err))?;
    let total = result.total.unwrap_or(0);
    let items = result
        .decode()
        .map_err(|err| ServiceError::backend("Failed to load staff", err))?;
    Ok(Paged { items, total })
}

async fn find_one(backend: &Backend, query: Query) -> ServiceResult<Option<Staff>> {
    match backend
        .store
        .select(&query)
        .await
        .and_then(|r| r.maybe_single::<Staff>())
    {
        Ok(staff) => Ok(staff),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(ServiceError::backend("Failed to load staff", err)),
    }
}

pub async fn get_staff_by_id(backend: &Backend, id: &str) -> ServiceResult<Option<Staff>> {
    find_one(backend, Query::table("staff").eq("id", id)).await
}

pub async fn get_staff_by_code(backend: &Backend, code: &str) -> ServiceResult<Option<Staff>> {
    find_one(backend, Query::table("staff").eq("staff_id", code.trim())).await
}

async fn email_taken(backend: &Backend, email: &str, except_id: Option<&str>) -> ServiceResult<bool> {
    let mut query = Query::table("staff").select("id").eq("email", email);
    if let Some(id) = except_id {
        query = query.neq("id", id);
    }
    let result = backend
        .store
        .select(&query)
        .await
        .map_err(|err| ServiceError::backend("Failed to check email", err))?;
    Ok(!result.rows.is_empty())
}

pub async fn create_staff(backend: &Backend, new_staff: NewStaff) -> ServiceResult<Staff> {
    require_admin(backend).await?;
    new_staff.validate()?;

    let code = match non_empty(new_staff.staff_id.as_deref()) {
        Some(code) => code,
        None => {
            let existing = backend
                .store
                .select(&Query::table("staff").select("staff_id"))
                .await
                .map_err(|err| ServiceError::backend("Failed to load staff codes", err))?;
            let codes: Vec<String> = existing
                .rows
                .iter()
                .filter_map(|row| row.get("staff_id").and_then(Value::as_str).map(str::to_string))
                .collect();
            next_staff_code(codes.iter().map(String::as_str))
        }
    };
    let email = new_staff.email.trim().to_lowercase();

    if get_staff_by_code(backend, &code).await?.is_some() {
        return Err(ServiceError::Duplicate(format!(
            "Staff ID {} already exists",
            code
        )));
    }
    if email_taken(backend, &email, None).await? {
        return Err(ServiceError::Duplicate(format!(
            "A staff member with email {} already exists",
            email
        )));
    }

    let rows = backend
        .store
        .insert(
            "staff",
            vec![json!({
                "staff_id": code,
                "name": new_staff.name.trim(),
                "email": email,
                "department": non_empty(new_staff.department.as_deref()),
                "role": new_staff.role,
                "status": StaffStatus::Active,
            })],
        )
        .await
        .and_then(decode_rows::<Staff>)
        .map_err(|err| ServiceError::write_failed("Staff creation", "Failed to create staff", err))?;
    let created = rows
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound("Staff member was not created".to_string()))?;
    log::info!("created staff {}", created.staff_id);
    Ok(created)
}

async fn patch_staff(backend: &Backend, id: &str, patch: Value) -> ServiceResult<Staff> {
    backend
        .store
        .update(&Query::table("staff").eq("id", id), patch)
        .await
        .and_then(decode_rows::<Staff>)
        .map_err(|err| ServiceError::write_failed("Staff update", "Failed to update staff", err))?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound("Staff member not found".to_string()))
}

pub async fn update_staff(backend: &Backend, id: &str, update: StaffUpdate) -> ServiceResult<Staff> {
    require_admin(backend).await?;
    update.validate()?;

    let mut patch = Map::new();
    if let Some(name) = non_empty(update.name.as_deref()) {
        patch.insert("name".into(), json!(name));
    }
    if let Some(email) = non_empty(update.email.as_deref()).map(|e| e.to_lowercase()) {
        if email_taken(backend, &email, Some(id)).await? {
            return Err(ServiceError::Duplicate(format!(
                "A staff member with email {} already exists",
                email
            )));
        }
        patch.insert("email".into(), json!(email));
    }
    if let Some(department) = update.department.as_deref() {
        patch.insert("department".into(), json!(non_empty(Some(department))));
    }
    if let Some(role) = update.role {
        patch.insert("role".into(), json!(role));
    }
    if patch.is_empty() {
        return Err(ServiceError::InvalidInput("Nothing to update".to_string()));
    }
    patch_staff(backend, id, Value::Object(patch)).await
}

pub async fn set_staff_status(backend: &Backend, id: &str, status: StaffStatus) -> ServiceResult<Staff> {
    require_admin(backend).await?;
    patch_staff(backend, id, json!({ "status": status })).await
}

pub async fn deactivate_staff(backend: &Backend, id: &str) -> ServiceResult<Staff> {
    set_staff_status(backend, id, StaffStatus::Inactive).await
}

pub async fn reactivate_staff(backend: &Backend, id: &str) -> ServiceResult<Staff> {
    set_staff_status(backend, id, StaffStatus::Active).await
}

/// Sorted, de-duplicated, non-empty.
pub async fn get_unique_departments(backend: &Backend) -> ServiceResult<Vec<String>> {
    let result = backend
        .store
        .select(&Query::table("staff").select("department"))
        .await
        .map_err(|err| ServiceError::backend("Failed to load departments", err))?;
    let mut departments: Vec<String> = result
        .rows
        .iter()
        .filter_map(|row| row.get("department").and_then(Value::as_str))
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect();
    departments.sort();
    departments.dedup();
    Ok(departments)
}
