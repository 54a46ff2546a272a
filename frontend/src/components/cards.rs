use leptos::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardColor {
    #[default]
    Primary,
    Success,
    Danger,
    Warning,
    Info,
}

impl CardColor {
    pub fn classes(&self) -> &'static str {
        match self {
            CardColor::Primary | CardColor::Info => "bg-status-info-bg border-status-info-border",
            CardColor::Success => "bg-status-success-bg border-status-success-border",
            CardColor::Danger => "bg-status-error-bg border-status-error-border",
            CardColor::Warning => "bg-status-warning-bg border-status-warning-border",
        }
    }
}

/// Headline number with a caption, used on the dashboards and reports.
#[component]
pub fn StatCard(
    #[prop(into)] title: String,
    #[prop(into)] value: MaybeSignal<String>,
    #[prop(optional, into)] icon: Option<String>,
    #[prop(optional)] color: CardColor,
) -> impl IntoView {
    view! {
        <div class=format!("shadow-sm rounded-lg border {}", color.classes())>
            <div class="p-6">
                {icon.map(|i| view! { <div class="text-2xl mb-2">{i}</div> })}
                <h3 class="text-3xl font-bold mb-2 text-fg">{move || value.get()}</h3>
                <p class="text-sm text-fg-muted">{title}</p>
            </div>
        </div>
    }
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn renders_title_value_and_color() {
        let html = render_to_string(move || {
            view! { <StatCard title="Present Days" value="18".to_string() icon="✅" color=CardColor::Success/> }
        });
        assert!(html.contains("Present Days"));
        assert!(html.contains("18"));
        assert!(html.contains("bg-status-success-bg"));
    }
}
