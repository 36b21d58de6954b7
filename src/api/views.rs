//! Server-rendered HTML views.
//!
//! Every value that originates from a user goes through [`escape`] before it
//! is placed into markup.

use crate::storage::PageRecord;

pub const INDEX_TITLE: &str = "Home - QR Snap";
pub const CREATE_TITLE: &str = "Create Page - QR Snap";
pub const RESULT_TITLE: &str = "Page Created!";
pub const NOT_FOUND_TITLE: &str = "Page not found";

/// Themes offered by the creation form. Any other value renders with the default style.
pub const THEMES: &[(&str, &str)] = &[
    ("blue", "Blue"),
    ("green", "Green"),
    ("red", "Red"),
    ("purple", "Purple"),
    ("orange", "Orange"),
    ("dark", "Dark"),
];

const STYLES: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f4f5f7; color: #1f2933; }
main { max-width: 40rem; margin: 2rem auto; padding: 2rem; background: #fff; border-radius: 12px; box-shadow: 0 2px 12px rgba(0,0,0,.08); }
h1 { margin-top: 0; }
a.button, button { display: inline-block; padding: .6rem 1.2rem; border: 0; border-radius: 8px; background: #2563eb; color: #fff; text-decoration: none; font-size: 1rem; cursor: pointer; }
label { display: block; margin: 1rem 0 .3rem; font-weight: 600; }
input, textarea, select { width: 100%; box-sizing: border-box; padding: .5rem; font-size: 1rem; }
textarea { min-height: 8rem; }
.qr img { width: 240px; height: 240px; }
.meta { color: #52606d; font-size: .9rem; }
.page img { max-width: 100%; border-radius: 8px; }
.theme-blue { background: #dbeafe; }
.theme-green { background: #dcfce7; }
.theme-red { background: #fee2e2; }
.theme-purple { background: #ede9fe; }
.theme-orange { background: #ffedd5; }
.theme-dark { background: #111827; color: #f9fafb; }
.theme-dark main { background: #1f2937; }
"#;

/// Escape text for use in HTML element content and quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn layout(title: &str, body_class: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{STYLES}</style>
</head>
<body class="{body_class}">
<main>
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
        body_class = escape(body_class),
    )
}

pub fn index(title: &str) -> String {
    let content = format!(
        r#"<h1>{}</h1>
<p>Create a small page with a message and an optional picture, then share it with a QR code.</p>
<p><a class="button" href="/create">Create a page</a></p>"#,
        escape(title)
    );
    layout(title, "", &content)
}

pub fn create_form(title: &str) -> String {
    let options: String = THEMES
        .iter()
        .map(|(value, label)| format!(r#"<option value="{value}">{label}</option>"#))
        .collect();

    let content = format!(
        r#"<h1>{}</h1>
<form method="post" action="/create" enctype="multipart/form-data">
<label for="title">Title</label>
<input id="title" name="title" type="text">
<label for="author">Author</label>
<input id="author" name="author" type="text">
<label for="message">Message</label>
<textarea id="message" name="message"></textarea>
<label for="theme">Theme</label>
<select id="theme" name="theme">{options}</select>
<label for="image">Image (optional)</label>
<input id="image" name="image" type="file" accept="image/*">
<p><button type="submit">Create</button></p>
</form>"#,
        escape(title)
    );
    layout(title, "", &content)
}

pub fn result(title: &str, page_url: &str, qr_image: &str, id: &str) -> String {
    let content = format!(
        r#"<h1>{title}</h1>
<p>Your page is ready. Scan the code or share the link.</p>
<div class="qr"><img src="{qr}" alt="QR code for {url}"></div>
<p><a href="{url}">{url}</a></p>
<p><a class="button" href="{qr}" download="qr-{id}.svg">Download QR</a></p>
<p class="meta">Page id: {id}</p>"#,
        title = escape(title),
        qr = escape(qr_image),
        url = escape(page_url),
        id = escape(id),
    );
    layout(title, "", &content)
}

pub fn page(record: &PageRecord) -> String {
    let image = match record.image {
        Some(ref src) => format!(
            r#"<p><img src="{}" alt="{}"></p>"#,
            escape(src),
            escape(&record.title)
        ),
        None => String::new(),
    };

    let content = format!(
        r#"<article class="page">
<h1>{title}</h1>
{image}<p>{message}</p>
<p class="meta">By {author} &middot; {created} &middot; {views} {noun}</p>
</article>"#,
        title = escape(&record.title),
        message = escape(&record.message).replace('\n', "<br>"),
        author = escape(&record.author),
        created = record.created_at.format("%Y-%m-%d %H:%M UTC"),
        views = record.views,
        noun = if record.views == 1 { "view" } else { "views" },
    );

    layout(&record.title, &format!("theme-{}", record.theme), &content)
}
