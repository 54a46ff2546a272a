use leptos::*;

const MAX_VISIBLE: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(u64),
    Gap,
}

/// Page buttons to show, at most seven with gaps standing in for the rest.
pub fn page_numbers(current: u64, total: u64) -> Vec<PageSlot> {
    use PageSlot::{Gap, Page};

    if total <= MAX_VISIBLE {
        return (1..=total).map(Page).collect();
    }
    if current <= 4 {
        let mut slots: Vec<PageSlot> = (1..=5).map(Page).collect();
        slots.extend([Gap, Page(total)]);
        slots
    } else if current >= total - 3 {
        let mut slots = vec![Page(1), Gap];
        slots.extend((total - 4..=total).map(Page));
        slots
    } else {
        let mut slots = vec![Page(1), Gap];
        slots.extend((current - 1..=current + 1).map(Page));
        slots.extend([Gap, Page(total)]);
        slots
    }
}

#[component]
pub fn Pagination(
    #[prop(into)] page: Signal<u64>,
    #[prop(into)] total_pages: Signal<u64>,
    #[prop(into)] total_records: Signal<u64>,
    on_change: Callback<u64>,
) -> impl IntoView {
    let go = move |target: u64| {
        let current = page.get_untracked();
        if target >= 1 && target <= total_pages.get_untracked() && target != current {
            on_change.call(target);
        }
    };

    view! {
        <div class="flex flex-wrap items-center gap-2 mt-4">
            {move || {
                let current = page.get();
                let total = total_pages.get();
                let records = total_records.get();
                if total <= 1 {
                    return (records > 0)
                        .then(|| view! {
                            <span class="text-sm text-fg-muted p-4">
                                {format!("Page 1 of 1 ({} records)", records)}
                            </span>
                        })
                        .into_view();
                }
                let buttons = page_numbers(current, total)
                    .into_iter()
                    .map(|slot| match slot {
                        PageSlot::Gap => view! { <span class="text-fg-muted p-2">"..."</span> }.into_view(),
                        PageSlot::Page(n) => {
                            let class = if n == current {
                                "px-3 py-1 rounded-md text-sm bg-action-primary-bg text-action-primary-text"
                            } else {
                                "px-3 py-1 rounded-md text-sm border border-border text-fg hover:bg-action-ghost-bg-hover"
                            };
                            view! { <button class=class on:click=move |_| go(n)>{n}</button> }.into_view()
                        }
                    })
                    .collect_view();
                view! {
                    <button
                        class="px-3 py-1 rounded-md text-sm border border-border disabled:opacity-50"
                        disabled=current <= 1
                        on:click=move |_| go(current.saturating_sub(1))
                    >
                        "Previous"
                    </button>
                    {buttons}
                    <button
                        class="px-3 py-1 rounded-md text-sm border border-border disabled:opacity-50"
                        disabled=current >= total
                        on:click=move |_| go(current + 1)
                    >
                        "Next"
                    </button>
                    <span class="text-sm text-fg-muted p-4">{format!("Page {} of {}", current, total)}</span>
                }
                .into_view()
            }}
        </div>
    }
}
