use leptos::*;

use crate::components::layout::Layout;
use crate::router::RouteMatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub time: String,
    pub action: String,
    pub department: String,
    pub staff_id: String,
}

impl CheckResult {
    /// Missing required values fall back to placeholders.
    pub fn from_route(matched: &RouteMatch) -> Self {
        let complete = ["name", "time", "action"]
            .iter()
            .all(|key| matched.param(key).is_some());
        if !complete {
            log::warn!("success page opened without name, time and action");
        }
        let or_na = |key: &str| matched.param(key).unwrap_or("N/A").to_string();
        Self {
            name: matched.param("name").filter(|_| complete).unwrap_or("User").to_string(),
            time: matched.param("time").filter(|_| complete).unwrap_or("--:--").to_string(),
            action: matched
                .param("action")
                .filter(|_| complete)
                .unwrap_or("Check-In")
                .to_string(),
            department: if complete { or_na("department") } else { "N/A".into() },
            staff_id: if complete { or_na("staffId") } else { "N/A".into() },
        }
    }
}

#[component]
pub fn ScanSuccessPage(matched: RouteMatch) -> impl IntoView {
    let result = CheckResult::from_route(&matched);
    view! {
        <Layout>
            <div class="max-w-md mx-auto bg-surface-elevated shadow rounded-lg p-8 text-center space-y-4">
                <div class="text-5xl text-status-success-text">"✓"</div>
                <h1 class="text-2xl font-bold text-fg">{format!("{} Successful", result.action)}</h1>
                <p class="text-lg text-fg">{result.name}</p>
                <dl class="grid grid-cols-2 gap-2 text-sm text-left">
                    <dt class="text-fg-muted">"Time"</dt>
                    <dd class="text-fg">{result.time}</dd>
                    <dt class="text-fg-muted">"Department"</dt>
                    <dd class="text-fg">{result.department}</dd>
                    <dt class="text-fg-muted">"Staff ID"</dt>
                    <dd class="text-fg">{result.staff_id}</dd>
                </dl>
                <a href="/" data-router="true" class="inline-block text-action-primary-bg hover:underline">"Done"</a>
            </div>
        </Layout>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Page;

    #[test]
    fn reads_decoded_params() {
        let matched = RouteMatch::new(
            Page::ScanSuccess,
            "/scan/success",
            "/scan/success?name=Ada%20Lovelace&time=08%3A05&action=Check-In&department=Finance&staffId=STF001",
        );
        let result = CheckResult::from_route(&matched);
        assert_eq!(result.name, "Ada Lovelace");
        assert_eq!(result.time, "08:05");
        assert_eq!(result.department, "Finance");
        assert_eq!(result.staff_id, "STF001");
    }

    #[test]
    fn incomplete_params_use_placeholders() {
        let matched = RouteMatch::new(Page::ScanSuccess, "/scan/success", "/scan/success?name=Ada");
        let result = CheckResult::from_route(&matched);
        assert_eq!(result.name, "User");
        assert_eq!(result.action, "Check-In");
        assert_eq!(result.staff_id, "N/A");

        let partial = RouteMatch::new(
            Page::ScanSuccess,
            "/scan/success",
            "/scan/success?name=Ada&time=17%3A01&action=Check-Out",
        );
        assert_eq!(CheckResult::from_route(&partial).department, "N/A");
    }
}
