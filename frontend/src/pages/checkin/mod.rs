use leptos::*;

use crate::router::RouteMatch;

pub mod repository;
pub mod view_model;

mod panel;

pub use panel::CheckInPanel;

#[component]
pub fn CheckInPage(matched: RouteMatch) -> impl IntoView {
    let email = matched.param("email").map(str::to_string);
    view! { <CheckInPanel email=email/> }
}
