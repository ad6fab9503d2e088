//! The single HTML page

use mediadrop_core::MediaKind;

const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>mediadrop</title>
<style>
body{font-family:system-ui,Arial,sans-serif;background:#f4f5f9;margin:0;padding:32px;}
main{max-width:720px;margin:40px auto;background:#fff;padding:24px 28px;border-radius:12px;box-shadow:0 6px 22px rgba(0,0,0,.08);}
label{font-weight:600;}
input,select{box-sizing:border-box;width:100%;padding:12px;margin:8px 0 16px;border:1px solid #d6d8e0;border-radius:8px;}
button{background:#1d4ed8;color:#fff;border:0;padding:12px 18px;border-radius:8px;font-weight:600;cursor:pointer;}
.error{color:#b42318;margin-bottom:12px;}
.note{font-size:.9rem;color:#555;margin-top:12px;}
</style>
</head>
<body>
<main>
<h1>mediadrop</h1>
{{flash}}
<form method="post" action="/download">
<label for="url">Video or page URL</label>
<input id="url" type="text" name="url" placeholder="https://www.youtube.com/watch?v=..." required>
<label for="kind">Format</label>
<select id="kind" name="kind">
{{options}}
</select>
<button type="submit">Download</button>
</form>
<p class="note">Large videos take a while: the file is fetched completely before your download starts.</p>
</main>
</body>
</html>
"#;

pub fn render_index(flash: Option<&str>) -> String {
    let flash = flash
        .map(|message| format!(r#"<div class="error">{}</div>"#, escape_html(message)))
        .unwrap_or_default();

    let options = [MediaKind::Video, MediaKind::Audio]
        .iter()
        .map(|kind| format!(r#"<option value="{}">{}</option>"#, kind.as_str(), kind.label()))
        .collect::<Vec<_>>()
        .join("\n");

    INDEX_TEMPLATE
        .replace("{{options}}", &options)
        .replace("{{flash}}", &flash)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
