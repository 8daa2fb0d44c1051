//! The `index.html` page that renders the generated document with RapiDoc.

/// Inputs of the viewer page.
#[derive(Debug, Clone, Copy)]
pub struct ViewerPage<'a> {
    /// Text of the `<title>` element
    pub title: &'a str,
    /// File name of the JSON document, relative to the page
    pub spec_file: &'a str,
    /// Overrides the server RapiDoc sends requests to
    pub server_url: Option<&'a str>,
    /// The document itself, when it is inlined into the page
    pub embedded_spec: Option<&'a str>,
}

const HEAD: &str = r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
	<title>"#;

const SCRIPT_AND_ELEMENT: &str = r#"</title>
	<script src="https://cdnjs.cloudflare.com/ajax/libs/rapidoc/9.3.8/rapidoc-min.js"
			integrity="sha512-0ES6eX4K9J1PrIEjIizv79dTlN5HwI2GW9Ku6ymb8dijMHF5CIplkS8N0iFJ/wl3GybCSqBJu8HDhiFkZRAf0g=="
			crossorigin="anonymous"
			referrerpolicy="no-referrer">
	</script>
</head>
<body>
<rapi-doc id="rapidoc"
          theme="dark"
          render-style="view"
          schema-style="table"
          schema-description-expanded="true""#;

const ATTRIBUTE_INDENT: &str = "\n          ";

/// Renders the page. Attribute values and the title are HTML-escaped.
pub fn render_index(page: &ViewerPage<'_>) -> String {
    let mut html = String::with_capacity(1024 + page.embedded_spec.map_or(0, str::len));

    html.push_str(HEAD);
    html.push_str(&escape_html(page.title));
    html.push_str(SCRIPT_AND_ELEMENT);

    if page.embedded_spec.is_none() {
        html.push_str(ATTRIBUTE_INDENT);
        html.push_str(&format!("spec-url=\"{}\"", escape_html(page.spec_file)));
    }
    html.push_str(ATTRIBUTE_INDENT);
    html.push_str("allow-spec-file-download=\"true\"");
    if let Some(url) = page.server_url {
        html.push_str(ATTRIBUTE_INDENT);
        html.push_str(&format!("server-url=\"{}\"", escape_html(url)));
    }
    html.push_str("\n>\n</rapi-doc>");

    if let Some(spec) = page.embedded_spec {
        html.push_str(&loader_script(spec));
    }
    html.push_str("\n</body>\n</html>");
    html
}

fn loader_script(spec: &str) -> String {
    format!(
        r#"
<script>
    window.addEventListener("DOMContentLoaded", (event) => {{
        const rapidocEl = document.getElementById("rapidoc");
        rapidocEl.loadSpec({})
    }})
</script>"#,
        escape_script(spec)
    )
}

/// `</` inside a script element would end it early; `<\/` means the same in JSON.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
