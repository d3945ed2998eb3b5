use quill_core::session::SessionState;
use quill_core::validate::validate_credentials;

use crate::auth::clear_stored_session;
use crate::cli::AuthCommands;
use crate::commands::common::{build_gate, render_toasts};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { email, password } => {
            validate_credentials(&email, &password).map_err(quill_core::Error::from)?;

            let (profile_name, _config, mut gate, notifier) = build_gate(global_profile)?;
            let signed_in = gate.sign_in(&email, &password).await;
            render_toasts(&notifier);

            if signed_in {
                println!("Signed in profile '{profile_name}' as {email}");
                Ok(())
            } else {
                Err(CliError::Reported)
            }
        }
        AuthCommands::Signup { email, password } => {
            validate_credentials(&email, &password).map_err(quill_core::Error::from)?;

            let (_profile_name, _config, mut gate, notifier) = build_gate(global_profile)?;
            let created = gate.sign_up(&email, &password).await;
            render_toasts(&notifier);

            if created {
                Ok(())
            } else {
                Err(CliError::Reported)
            }
        }
        AuthCommands::Status => {
            let (profile_name, _config, mut gate, notifier) = build_gate(global_profile)?;
            gate.restore().await;
            render_toasts(&notifier);

            match gate.state() {
                SessionState::Authenticated(user) => {
                    let email_label = user.email.as_deref().unwrap_or("(no email)");
                    println!("Profile '{profile_name}' is signed in as {email_label}");
                }
                SessionState::Unknown | SessionState::Unauthenticated => {
                    println!("Profile '{profile_name}' is not signed in.");
                }
            }
            Ok(())
        }
        AuthCommands::Logout => match build_gate(global_profile) {
            Ok((profile_name, _config, mut gate, notifier)) => {
                gate.restore().await;
                let signed_out = gate.sign_out().await;
                render_toasts(&notifier);

                if signed_out {
                    println!("Signed out profile '{profile_name}'");
                    Ok(())
                } else {
                    Err(CliError::Reported)
                }
            }
            // No provider configured: still clear any stored session.
            Err(CliError::Config(_)) => {
                let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
                let profile_name = profiles.resolve_profile_name(global_profile);
                clear_stored_session(&profile_name)
                    .map_err(|error| CliError::Auth(error.to_string()))?;
                println!("Signed out profile '{profile_name}'");
                Ok(())
            }
            Err(other) => Err(other),
        },
    }
}
