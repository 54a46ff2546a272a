use leptos::*;

use crate::services::ServiceError;

/// Validation messages are joined with `; ` by the service layer.
fn validation_items(error: &ServiceError) -> Option<Vec<String>> {
    match error {
        ServiceError::Validation(msg) if msg.contains("; ") => {
            Some(msg.split("; ").map(str::to_string).collect())
        }
        _ => None,
    }
}

#[component]
pub fn InlineErrorMessage(#[prop(into)] error: Signal<Option<ServiceError>>) -> impl IntoView {
    view! {
        <Show when=move || error.get().is_some() fallback=|| ()>
            <div class="bg-status-error-bg border border-status-error-border text-status-error-text px-4 py-3 rounded space-y-1 my-2" role="alert">
                {move || error.get().map(|e| match validation_items(&e) {
                    Some(items) => view! {
                        <ul class="list-disc list-inside text-sm">
                            {items.into_iter().map(|item| view! { <li>{item}</li> }).collect_view()}
                        </ul>
                    }
                    .into_view(),
                    None => view! { <div class="font-bold">{e.to_string()}</div> }.into_view(),
                })}
                {move || error.get().and_then(|e| match &e {
                    ServiceError::Backend { source, .. } if !source.code.is_empty() => Some(view! {
                        <div class="text-xs opacity-75">{"Code: "}{source.code.clone()}</div>
                    }),
                    _ => None,
                })}
            </div>
        </Show>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::ApiError;
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn renders_validation_messages_as_list() {
        let html = render_to_string(move || {
            let signal = create_rw_signal(Some(ServiceError::Validation(
                "Name is required; Passwords do not match".into(),
            )));
            view! { <InlineErrorMessage error=signal/> }
        });
        assert!(html.contains("<li"));
        assert!(html.contains("Name is required"));
        assert!(html.contains("Passwords do not match"));
    }

    #[test]
    fn renders_backend_code() {
        let html = render_to_string(move || {
            let signal = create_rw_signal(Some(ServiceError::backend(
                "Failed to fetch staff",
                ApiError::new("PGRST301", "JWT expired"),
            )));
            view! { <InlineErrorMessage error=signal/> }
        });
        assert!(html.contains("Failed to fetch staff: JWT expired"));
        assert!(html.contains("Code: PGRST301"));
    }

    #[test]
    fn hidden_without_error() {
        let html = render_to_string(move || {
            let signal = create_rw_signal(None::<ServiceError>);
            view! { <InlineErrorMessage error=signal/> }
        });
        assert!(!html.contains("role=\"alert\""));
    }
}
