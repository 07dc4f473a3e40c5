use axum::{extract::Query, response::Html};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ResetPageQuery {
    pub token: Option<String>,
}

/// The page the emailed link opens. It posts to `/api/reset-password`.
pub async fn reset_page(Query(q): Query<ResetPageQuery>) -> Html<String> {
    Html(render(q.token.as_deref().unwrap_or_default()))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn render(token: &str) -> String {
    let token = escape_html(token);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Reset Password</title>
  <style>
    body {{ font-family: sans-serif; max-width: 420px; margin: 4rem auto; }}
    input {{ width: 100%; padding: .5rem; margin: .25rem 0 1rem; box-sizing: border-box; }}
    button {{ padding: .6rem 1.2rem; }}
    #message {{ margin-top: 1rem; }}
  </style>
</head>
<body>
  <h2>Reset your password</h2>
  <form id="resetForm">
    <input type="hidden" id="token" value="{token}">
    <label for="newPassword">New password</label>
    <input type="password" id="newPassword" minlength="6" required>
    <label for="confirmPassword">Confirm password</label>
    <input type="password" id="confirmPassword" minlength="6" required>
    <button type="submit">Reset Password</button>
  </form>
  <div id="message"></div>
  <script>
    document.getElementById('resetForm').addEventListener('submit', async (e) => {{
      e.preventDefault();
      const msg = document.getElementById('message');
      const password = document.getElementById('newPassword').value;
      if (password !== document.getElementById('confirmPassword').value) {{
        msg.textContent = 'Passwords do not match';
        return;
      }}
      const res = await fetch('/api/reset-password', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify({{ token: document.getElementById('token').value, new_password: password }})
      }});
      const data = await res.json();
      msg.textContent = data.message;
    }});
  </script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_embeds_token() {
        let page = render("abc.def.ghi");
        assert!(page.contains(r#"value="abc.def.ghi""#));
        assert!(page.contains("/api/reset-password"));
    }

    #[test]
    fn render_escapes_markup() {
        let page = render(r#""><script>alert(1)</script>"#);
        assert!(!page.contains("<script>alert(1)"));
        assert!(page.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[tokio::test]
    async fn reset_page_without_token_still_renders() {
        let Html(page) = reset_page(Query(ResetPageQuery { token: None })).await;
        assert!(page.contains(r#"value="""#));
    }
}
