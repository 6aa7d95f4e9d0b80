use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use super::{app::App, display, prompt};

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Log in and store the tokens for later commands
    Login(LoginArgs),
    /// Forget the stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Exchange the stored refresh token for a new access token
    Refresh,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account name; prompted for when omitted.
    #[arg(long, short)]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting.
    #[arg(long)]
    pub password_stdin: bool,
}

pub async fn run(app: &App, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Login(args) => login(app, args).await,
        SessionCommand::Logout => logout(app),
        SessionCommand::Whoami => whoami(app),
        SessionCommand::Refresh => refresh(app).await,
    }
}

async fn login(app: &App, args: LoginArgs) -> Result<()> {
    let username = prompt::value_or_prompt(args.username, "Username: ")?;
    let password = prompt::password("Password: ", args.password_stdin)?;

    let user = app
        .session
        .login(&username, &password)
        .await
        .context("login failed")?;
    println!("Logged in as {}", user.username);
    if user.is_pending_supplier() {
        println!("Your supplier account is awaiting approval; the dashboard stays locked until then.");
    }
    println!("tokens stored at {}", app.config.token_path.display());
    Ok(())
}

fn logout(app: &App) -> Result<()> {
    let was_signed_in = app.session.user().is_some();
    app.session
        .logout()
        .context("failed to remove stored tokens")?;
    if was_signed_in {
        println!("Logged out");
    } else {
        println!("No active session");
    }
    Ok(())
}

fn whoami(app: &App) -> Result<()> {
    let Some(user) = app.session.user() else {
        bail!("not logged in; run `myecom session login` first");
    };
    display::print_user(&user);
    Ok(())
}

async fn refresh(app: &App) -> Result<()> {
    let snapshot = app
        .session
        .refresh_access_token()
        .await
        .context("token refresh failed")?;
    match snapshot.user {
        Some(user) => println!("Session refreshed for {}", user.username),
        None => println!("Session refreshed"),
    }
    Ok(())
}
