use base64::Engine;
use leptos::*;
use qrcode::{render::svg, QrCode};

use crate::utils::download::{trigger_download, SVG_MIME};

pub const QR_SIZE: u32 = 256;

/// Renders `data` as an SVG QR code at least `size` pixels wide.
pub fn qr_svg(data: &str, size: u32) -> Result<String, String> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| format!("Failed to generate QR code: {}", e))?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(size, size)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .quiet_zone(true)
        .build())
}

pub fn svg_data_uri(svg: &str) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(svg)
    )
}

#[component]
pub fn QrCodeImage(
    #[prop(into)] data: String,
    #[prop(into)] filename: String,
    #[prop(optional, into)] caption: Option<String>,
) -> impl IntoView {
    match qr_svg(&data, QR_SIZE) {
        Ok(svg) => {
            let src = svg_data_uri(&svg);
            let on_download = move |_| {
                if let Err(err) = trigger_download(&filename, &svg, SVG_MIME) {
                    log::error!("QR download failed: {}", err);
                }
            };
            view! {
                <div class="flex flex-col items-center gap-3">
                    <img src=src alt="QR code" width=QR_SIZE height=QR_SIZE class="border border-border rounded"/>
                    {caption.map(|c| view! { <p class="text-sm text-fg-muted">{c}</p> })}
                    <button
                        class="px-4 py-2 rounded-md text-sm border border-border text-fg hover:bg-action-ghost-bg-hover"
                        on:click=on_download
                    >
                        "Download QR Code"
                    </button>
                </div>
            }
            .into_view()
        }
        Err(err) => {
            log::error!("{}", err);
            view! { <p class="text-status-error-text">"Failed to generate QR code"</p> }.into_view()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_urls_as_svg() {
        let svg = qr_svg("https://qams.example/checkin", QR_SIZE).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
        assert!(svg_data_uri(&svg).starts_with("data:image/svg+xml;base64,"));
    }
}
