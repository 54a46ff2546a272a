use leptos::*;

use crate::router::RouteMatch;

pub mod utils;
pub mod view_model;

mod panel;

pub use panel::LoginPanel;

#[component]
pub fn LoginPage(matched: RouteMatch) -> impl IntoView {
    let redirect = matched.param("redirect").map(str::to_string);
    view! { <LoginPanel redirect=redirect/> }
}
