use super::{escape, layout};

pub fn login(next: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<div class="flash error">{}</div>"#, escape(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Log in</h1>{error}
<form class="stacked" method="post" action="/login">
<input type="hidden" name="next" value="{next}">
<label for="username">Username</label><input name="username" id="username" required>
<label for="password">Password</label><input type="password" name="password" id="password" required>
<p><button type="submit">Log in</button></p>
</form>
<p>No account? <a href="/register">Register</a></p>"#,
        next = escape(next),
    );
    layout("Log in", None, None, &body)
}

pub fn register(username: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<div class="flash error">{}</div>"#, escape(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Register</h1>{error}
<form class="stacked" method="post" action="/register">
<label for="username">Username</label><input name="username" id="username" value="{username}" required>
<label for="password">Password</label><input type="password" name="password" id="password" required>
<label for="password_confirm">Confirm password</label><input type="password" name="password_confirm" id="password_confirm" required>
<p><button type="submit">Create account</button></p>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#,
        username = escape(username),
    );
    layout("Register", None, None, &body)
}
