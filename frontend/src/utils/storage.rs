use web_sys::{Storage, Window};

pub fn window() -> Result<Window, String> {
    web_sys::window().ok_or_else(|| "No window object".to_string())
}

pub fn local_storage() -> Result<Storage, String> {
    window()?
        .local_storage()
        .map_err(|_| "No localStorage".to_string())?
        .ok_or_else(|| "No localStorage".to_string())
}

pub fn read_item(key: &str) -> Result<Option<String>, String> {
    local_storage()?
        .get_item(key)
        .map_err(|_| format!("Failed to read {}", key))
}

pub fn write_item(key: &str, value: &str) -> Result<(), String> {
    local_storage()?
        .set_item(key, value)
        .map_err(|_| format!("Failed to write {}", key))
}

pub fn remove_item(key: &str) -> Result<(), String> {
    local_storage()?
        .remove_item(key)
        .map_err(|_| format!("Failed to remove {}", key))
}

/// `scheme://host[:port]` of the current page.
pub fn origin() -> Result<String, String> {
    window()?
        .location()
        .origin()
        .map_err(|_| "No location origin".to_string())
}
