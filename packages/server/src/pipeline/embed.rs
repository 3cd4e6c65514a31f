use uuid::Uuid;

/// The iframe snippet customers paste into their pages.
///
/// Depends only on the embed origin and the model id, so it can be rendered
/// before the model row exists.
pub fn embed_snippet(embed_base_url: &str, model_id: Uuid) -> String {
    let base = escape_attr(embed_base_url.trim_end_matches('/'));
    format!(
        "<iframe\n  \
         src=\"{base}/embed/{model_id}\"\n  \
         width=\"600\"\n  \
         height=\"400\"\n  \
         frameborder=\"0\"\n  \
         allowfullscreen\n  \
         allow=\"autoplay; fullscreen; ar; xr\"\n\
         ></iframe>"
    )
}

/// URLs a viewer page renders.
#[derive(Debug, Clone, Copy)]
pub struct ViewerAssets<'a> {
    pub glb_file: &'a str,
    pub usdz_file: &'a str,
    pub poster_image: Option<&'a str>,
}

/// Complete HTML document hosting `<model-viewer>` for one model.
///
/// Locally stored files carry site-relative URLs; those are made absolute
/// against `public_base_url` so the page also works when framed elsewhere.
pub fn viewer_html(assets: ViewerAssets<'_>, public_base_url: &str) -> String {
    let src = escape_attr(&absolute_url(assets.glb_file, public_base_url));
    let ios_src = escape_attr(&absolute_url(assets.usdz_file, public_base_url));
    let poster = assets
        .poster_image
        .map(|p| {
            format!(
                "\n    poster=\"{}\"",
                escape_attr(&absolute_url(p, public_base_url))
            )
        })
        .unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>3D Model Viewer</title>
  <script type="module" src="https://unpkg.com/@google/model-viewer/dist/model-viewer.min.js"></script>
  <style>
    body, html {{
      margin: 0;
      padding: 0;
      height: 100%;
      background: #ffffff;
    }}
    model-viewer {{
      width: 100%;
      height: 100%;
    }}
    .ar-button {{
      background-color: #4285f4;
      color: white;
      border: none;
      border-radius: 4px;
      position: absolute;
      bottom: 16px;
      right: 16px;
      padding: 8px 16px;
      font-weight: bold;
    }}
  </style>
</head>
<body>
  <model-viewer
    src="{src}"
    ios-src="{ios_src}"{poster}
    alt="3D Model"
    auto-rotate
    camera-controls
    ar
    ar-modes="webxr scene-viewer quick-look"
    shadow-intensity="1"
    background-color="#ffffff">
    <button slot="ar-button" class="ar-button">View in AR</button>
  </model-viewer>
</body>
</html>
"##
    )
}

fn absolute_url(url: &str, base: &str) -> String {
    if url.starts_with('/') && !url.starts_with("//") {
        format!("{}{url}", base.trim_end_matches('/'))
    } else {
        url.to_string()
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
