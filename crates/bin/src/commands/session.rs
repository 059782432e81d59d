//! Session commands - login, register and logout.

use profile_sync::{
    Instance,
    gateway::{Credentials, Registration},
};

use crate::cli::{LoginArgs, OutputFormat, RegisterArgs};
use crate::output::print_profile;

/// Run the login command
pub async fn login(
    instance: &Instance,
    args: &LoginArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = Credentials::new(&args.username, &args.password);
    let profile = instance.login(&credentials).await?;
    print_profile(&profile, format)
}

/// Run the register command
pub async fn register(
    instance: &Instance,
    args: &RegisterArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let registration = Registration {
        username: args.username.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
        display_name: args.display_name.clone(),
    };
    let profile = instance.register(&registration).await?;
    print_profile(&profile, format)
}

/// Run the logout command
pub async fn logout(
    instance: &Instance,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = instance.logout().await;
    print_profile(&profile, format)
}
