//! Minimal inline HTML for the form and result views.

/// Escape text for interpolation into HTML content and attributes.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Static input form for the seven measurements.
pub(crate) const INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Cultivar - Crop Recommendation</title>
</head>
<body>
  <h1>Crop Recommendation</h1>
  <form method="post" action="/predict">
    <label>Nitrogen (N, kg/ha): <input name="N" required></label><br>
    <label>Phosphorus (P, kg/ha): <input name="P" required></label><br>
    <label>Potassium (K, kg/ha): <input name="K" required></label><br>
    <label>Temperature (&deg;C): <input name="temperature" required></label><br>
    <label>Humidity (%): <input name="humidity" required></label><br>
    <label>pH: <input name="ph" required></label><br>
    <label>Rainfall (mm): <input name="rainfall" required></label><br>
    <button type="submit">Recommend a crop</button>
  </form>
</body>
</html>
"#;

/// Result view: recommended crop, echoed parameters, and a download
/// form that resubmits the same values to `/download_report`.
pub(crate) fn result_page(crop: &str, params: &[(String, String)]) -> String {
    let crop = escape_html(crop);

    let mut rows = String::new();
    let mut hidden = String::new();
    for (name, value) in params {
        let name = escape_html(name);
        let value = escape_html(value);
        rows.push_str(&format!("    <li>{name}: {value}</li>\n"));
        hidden.push_str(&format!(
            "    <input type=\"hidden\" name=\"{name}\" value=\"{value}\">\n"
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Cultivar - Result</title>
</head>
<body>
  <h1>Recommended crop: {crop}</h1>
  <ul>
{rows}  </ul>
  <form method="post" action="/download_report">
    <input type="hidden" name="crop" value="{crop}">
{hidden}    <button type="submit">Download PDF report</button>
  </form>
  <p><a href="/">Try another set of measurements</a></p>
</body>
</html>
"#
    )
}
