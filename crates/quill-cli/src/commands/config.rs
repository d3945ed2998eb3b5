use std::env;

use crate::cli::ConfigCommands;
use crate::commands::common::resolve_app_config;
use crate::config_profiles::{is_http_url, normalize_text_option, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_base_url,
            auth_url,
            auth_api_key,
            no_activate,
        } => run_config_init(global_profile, api_base_url, auth_url, auth_api_key, no_activate),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

fn run_config_init(
    profile_name: Option<&str>,
    api_base_url: Option<String>,
    auth_url: Option<String>,
    auth_api_key: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged_api_base_url = normalize_text_option(api_base_url)
        .or_else(|| normalize_text_option(env::var("QUILL_API_BASE_URL").ok()))
        .or_else(|| existing.api_base_url());
    let merged_auth_url = normalize_text_option(auth_url)
        .or_else(|| normalize_text_option(env::var("QUILL_AUTH_URL").ok()))
        .or_else(|| existing.auth_url());
    let merged_auth_api_key = normalize_text_option(auth_api_key)
        .or_else(|| normalize_text_option(env::var("QUILL_AUTH_API_KEY").ok()))
        .or_else(|| existing.auth_api_key());

    for (field, value) in [
        ("api_base_url", merged_api_base_url.as_deref()),
        ("auth_url", merged_auth_url.as_deref()),
    ] {
        if let Some(url) = value {
            if !is_http_url(url) {
                return Err(CliError::Config(format!(
                    "{field} must include http:// or https://"
                )));
            }
        }
    }

    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(value) = merged_api_base_url {
        profile.api_base_url = Some(value);
    }
    if let Some(value) = merged_auth_url {
        profile.auth_url = Some(value);
    }
    if let Some(value) = merged_auth_api_key {
        profile.auth_api_key = Some(value);
    }

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let profile = config
        .profiles
        .get(&profile_name)
        .ok_or_else(|| CliError::Config("Failed to persist profile".to_string()))?;
    let mut missing_fields = Vec::new();
    if profile.auth_url().is_none() {
        missing_fields.push("auth_url");
    }
    if profile.auth_api_key().is_none() {
        missing_fields.push("auth_api_key");
    }
    if missing_fields.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `quill auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let (profile_name, config) = resolve_app_config(global_profile)?;

    println!("profile: {profile_name}");
    println!("api_base_url: {}", config.api_base_url);
    println!(
        "auth_url: {}",
        config.provider_url.as_deref().unwrap_or("(unset)")
    );
    // The key is public but keep it out of casual terminal scrollback.
    println!(
        "auth_api_key: {}",
        if config.provider_api_key.is_some() {
            "(set)"
        } else {
            "(unset)"
        }
    );
    println!("app: {} {}", config.app_name, config.app_version);
    Ok(())
}
