use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use client::Capability;
use shared::models::{ChangePasswordRequest, ProfileUpdateRequest, RegisterRequest};

use super::{app::App, display, prompt};

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Create a customer account
    Register(RegisterArgs),
    /// Change your username, email or names
    Update(UpdateArgs),
    /// Change your password
    ChangePassword {
        /// Read old, new and confirmation passwords from stdin, one per line.
        #[arg(long)]
        password_stdin: bool,
    },
    /// Ask to become a supplier
    RequestSupplier {
        /// Your age, as required by the supplier application.
        #[arg(long)]
        age: u32,
    },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long, short)]
    pub username: Option<String>,
    #[arg(long, short)]
    pub email: Option<String>,
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    /// Read the password and its confirmation from stdin, one per line.
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

pub async fn run(app: &App, command: AccountCommand) -> Result<()> {
    match command {
        AccountCommand::Register(args) => register(app, args).await,
        AccountCommand::Update(args) => update(app, args).await,
        AccountCommand::ChangePassword { password_stdin } => {
            change_password(app, password_stdin).await
        }
        AccountCommand::RequestSupplier { age } => request_supplier(app, age).await,
    }
}

async fn register(app: &App, args: RegisterArgs) -> Result<()> {
    let username = prompt::value_or_prompt(args.username, "Username: ")?;
    let email = prompt::value_or_prompt(args.email, "Email: ")?;
    let password = prompt::password("Password: ", args.password_stdin)?;
    let password2 = prompt::password("Confirm password: ", args.password_stdin)?;

    let form = RegisterRequest {
        username,
        email,
        first_name: args.first_name,
        last_name: args.last_name,
        password,
        password2,
    };
    let response = app.api.register(&form).await.context("registration failed")?;
    println!("{}", response.detail);
    println!("Log in with `myecom session login -u {}`", form.username);
    Ok(())
}

async fn update(app: &App, args: UpdateArgs) -> Result<()> {
    let user = app.require(Capability::Shop)?;
    let mut update = ProfileUpdateRequest::from(&user);
    if let Some(username) = args.username {
        update.username = username;
    }
    if let Some(email) = args.email {
        update.email = email;
    }
    if let Some(first_name) = args.first_name {
        update.first_name = first_name;
    }
    if let Some(last_name) = args.last_name {
        update.last_name = last_name;
    }
    if update == ProfileUpdateRequest::from(&user) {
        bail!("nothing to update; pass at least one of --username, --email, --first-name, --last-name");
    }

    app.api
        .update_profile(&update)
        .await
        .context("profile update failed")?;
    let snapshot = app
        .session
        .refresh_identity()
        .await
        .context("failed to reload profile")?;
    if let Some(user) = snapshot.user {
        display::print_user(&user);
    }
    Ok(())
}

async fn change_password(app: &App, from_stdin: bool) -> Result<()> {
    app.require(Capability::Shop)?;
    let old_password = prompt::password("Current password: ", from_stdin)?;
    let new_password = prompt::password("New password: ", from_stdin)?;
    let confirmation = prompt::password("Confirm new password: ", from_stdin)?;
    if new_password != confirmation {
        bail!("new passwords do not match");
    }

    let response = app
        .api
        .change_password(&ChangePasswordRequest {
            old_password,
            new_password,
        })
        .await
        .context("password change failed")?;
    println!("{}", response.detail);
    Ok(())
}

async fn request_supplier(app: &App, age: u32) -> Result<()> {
    app.require(Capability::Shop)?;
    let response = app
        .api
        .request_supplier(age)
        .await
        .context("supplier request failed")?;
    println!("{}", response.detail);
    app.session
        .refresh_identity()
        .await
        .context("failed to reload profile")?;
    Ok(())
}
