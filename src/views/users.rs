pub fn signup_form() -> String {
    r#"        <h3>Sign up on Wanderlust</h3>
        <form method="POST" action="/signup" class="auth-form">
            <label for="username">Username</label>
            <input id="username" name="username" required>
            <label for="email">Email</label>
            <input id="email" name="email" type="email" required>
            <label for="password">Password</label>
            <input id="password" name="password" type="password" required>
            <button class="btn">Sign up</button>
        </form>"#
        .to_string()
}

pub fn login_form() -> String {
    r#"        <h3>Log in</h3>
        <form method="POST" action="/login" class="auth-form">
            <label for="username">Username</label>
            <input id="username" name="username" required>
            <label for="password">Password</label>
            <input id="password" name="password" type="password" required>
            <button class="btn">Log in</button>
        </form>"#
        .to_string()
}
