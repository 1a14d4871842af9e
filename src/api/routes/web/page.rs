//! The single chat page, rendered with Handlebars. Handlebars escapes
//! HTML by default which matters here since everything in the
//! transcript comes from the user or the assistant.

use handlebars::Handlebars;

use super::public::ChatPage;

pub const CHAT_PAGE: &str = "chat_page";

const CHAT_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{title}}</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 0 auto; padding: 1rem; }
#history { max-height: 70vh; overflow-y: auto; }
.warning { color: #a15c00; }
.error { color: #b00020; }
form { display: flex; gap: 0.5rem; }
input[type=text] { flex: 1; }
</style>
</head>
<body>
<h1>{{title}}</h1>
<div id="history">
{{#each lines}}
<p>{{this}}</p>
{{/each}}
</div>
{{#if warning}}
<p class="warning">{{warning}}</p>
{{/if}}
{{#if error}}
<p class="error">{{error}}</p>
{{/if}}
<form method="post" action="/">
<input type="text" name="message" placeholder="Type a message..." autocomplete="off" autofocus>
<button type="submit">Send</button>
</form>
</body>
</html>
"#;

pub fn templates() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
        .register_template_string(CHAT_PAGE, CHAT_PAGE_TEMPLATE)
        .expect("Failed to register template");
    registry
}

pub fn render(registry: &Handlebars, page: &ChatPage) -> Result<String, handlebars::RenderError> {
    registry.render(CHAT_PAGE, page)
}
