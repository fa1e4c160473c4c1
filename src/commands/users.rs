use crate::core::config::LauncherConfig;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::users::{is_valid_player_name, is_valid_uuid, offline_uuid, User};

pub fn run_user_add(
    name: &str,
    uuid: Option<&str>,
    config: &mut LauncherConfig,
) -> LauncherResult<()> {
    if !is_valid_player_name(name) {
        return Err(LauncherError::Other(format!(
            "invalid player name: {} (3-16 word characters)",
            name
        )));
    }
    if config.find_user(name).is_some() {
        return Err(LauncherError::Other(format!("user {} already exists", name)));
    }

    let uuid = match uuid {
        Some(explicit) => {
            if !is_valid_uuid(explicit) {
                return Err(LauncherError::Other(format!("invalid UUID: {}", explicit)));
            }
            explicit.to_string()
        }
        None => offline_uuid(name),
    };

    config.users.push(User {
        name: name.to_string(),
        uuid: uuid.clone(),
        user_type: "offline".into(),
        access_token: None,
    });
    config.save()?;
    println!("Added user {} ({})", name, uuid);
    Ok(())
}

pub fn run_user_list(config: &LauncherConfig) -> LauncherResult<()> {
    if config.users.is_empty() {
        println!("No users configured");
        return Ok(());
    }
    for user in &config.users {
        println!("{:<18} {:<38} {}", user.name, user.uuid, user.user_type);
    }
    Ok(())
}

pub fn run_user_remove(name: &str, config: &mut LauncherConfig) -> LauncherResult<()> {
    let before = config.users.len();
    config.users.retain(|u| u.name != name);
    if config.users.len() == before {
        return Err(LauncherError::Other(format!("unknown user: {}", name)));
    }
    config.save()?;
    println!("Removed user {}", name);
    Ok(())
}
