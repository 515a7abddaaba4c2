use anyhow::Result;
use colored::Colorize;
use higia_application::messages;

use super::user_error;
use crate::bootstrap::App;

pub async fn login(app: &App, email: &str, password: &str) -> Result<()> {
    let user = app
        .auth
        .login(email, password)
        .await
        .map_err(|err| user_error(err, messages::LOGIN_FAILED))?;

    println!("{} Logged in as {} <{}>", "✓".green(), user.name.bold(), user.email);
    Ok(())
}

pub async fn register(app: &App, name: &str, email: &str, password: &str) -> Result<()> {
    let user = app
        .auth
        .register(name, email, password)
        .await
        .map_err(|err| user_error(err, messages::REGISTER_FAILED))?;

    println!("{} Account created for {}", "✓".green(), user.email.bold());
    println!("  Log in with `higia login --email {}`", user.email);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.auth.logout().await?;
    println!("{} Logged out", "✓".green());
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    match app.auth.restore().await? {
        Some(user) => {
            println!("{} <{}>", user.name.bold(), user.email);
            if let Some(role) = user.role {
                println!("  role: {role}");
            }
        }
        None => println!("{}", "Not logged in".yellow()),
    }
    Ok(())
}
