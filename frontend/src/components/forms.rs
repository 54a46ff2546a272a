use leptos::*;
use web_sys::HtmlInputElement;

const INPUT_CLASS: &str = "appearance-none block w-full px-3 py-2 border border-border rounded-md bg-surface-elevated text-fg placeholder-fg-muted focus:outline-none focus:ring-action-primary-focus focus:border-action-primary-bg sm:text-sm";

/// Labelled input bound to a string signal.
#[component]
pub fn TextField(
    #[prop(into)] id: String,
    #[prop(into)] label: String,
    value: RwSignal<String>,
    #[prop(optional, into)] input_type: Option<String>,
    #[prop(optional, into)] placeholder: Option<String>,
    #[prop(optional)] required: bool,
) -> impl IntoView {
    let input_type = input_type.unwrap_or_else(|| "text".to_string());
    view! {
        <div class="space-y-1">
            <label for=id.clone() class="block text-sm font-medium text-fg">{label}</label>
            <input
                id=id.clone()
                name=id
                type=input_type
                required=required
                placeholder=placeholder.unwrap_or_default()
                class=INPUT_CLASS
                prop:value=move || value.get()
                on:input=move |ev| {
                    let target = event_target::<HtmlInputElement>(&ev);
                    value.set(target.value());
                }
            />
        </div>
    }
}

/// Password input with a show/hide toggle.
#[component]
pub fn PasswordField(
    #[prop(into)] id: String,
    #[prop(into)] label: String,
    value: RwSignal<String>,
    #[prop(optional)] visible: Option<RwSignal<bool>>,
    #[prop(optional)] required: bool,
) -> impl IntoView {
    let visible = visible.unwrap_or_else(|| create_rw_signal(false));
    view! {
        <div class="space-y-1">
            <label for=id.clone() class="block text-sm font-medium text-fg">{label}</label>
            <div class="relative">
                <input
                    id=id.clone()
                    name=id
                    type=move || if visible.get() { "text" } else { "password" }
                    required=required
                    class=format!("{} pr-10", INPUT_CLASS)
                    prop:value=move || value.get()
                    on:input=move |ev| {
                        let target = event_target::<HtmlInputElement>(&ev);
                        value.set(target.value());
                    }
                />
                <button
                    type="button"
                    class="absolute inset-y-0 right-0 flex items-center px-3 text-fg-muted hover:text-fg"
                    aria-label=move || if visible.get() { "Hide password" } else { "Show password" }
                    on:click=move |_| visible.update(|v| *v = !*v)
                >
                    <svg class="h-5 w-5" viewBox="0 0 20 20" fill="none" aria-hidden="true">
                        <path
                            d="M1.667 10C1.667 10 4.583 4.167 10 4.167C15.417 4.167 18.333 10 18.333 10C18.333 10 15.417 15.833 10 15.833C4.583 15.833 1.667 10 1.667 10Z"
                            stroke="currentColor"
                            stroke-width="1.5"
                        />
                        <circle cx="10" cy="10" r="2.5" stroke="currentColor" stroke-width="1.5"/>
                        <Show when=move || !visible.get()>
                            <path d="M2.5 2.5L17.5 17.5" stroke="currentColor" stroke-width="1.5" stroke-linecap="round"/>
                        </Show>
                    </svg>
                </button>
            </div>
        </div>
    }
}

/// Select over `(value, label)` pairs; the empty value means "any".
#[component]
pub fn SelectField(
    #[prop(into)] id: String,
    #[prop(into)] label: String,
    value: RwSignal<String>,
    #[prop(into)] options: Signal<Vec<(String, String)>>,
) -> impl IntoView {
    view! {
        <div class="space-y-1">
            <label for=id.clone() class="block text-sm font-medium text-fg">{label}</label>
            <select
                id=id
                class=INPUT_CLASS
                prop:value=move || value.get()
                on:change=move |ev| value.set(event_target_value(&ev))
            >
                {move || {
                    options
                        .get()
                        .into_iter()
                        .map(|(v, text)| {
                            let selected = v == value.get_untracked();
                            view! { <option value=v selected=selected>{text}</option> }
                        })
                        .collect_view()
                }}
            </select>
        </div>
    }
}
