use crate::cli::build_state;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::bootstrap::{self, Seeded};

pub async fn handle(config: AppConfig, name: &str, email: &str, password: &str) -> anyhow::Result<()> {
    let state = build_state(config).await?;

    match bootstrap::create_admin(&state, name, email, password).await {
        Ok(Seeded::Created(admin)) => println!("Created admin {} ({})", admin.email, admin.id),
        Ok(Seeded::AlreadyPresent) => println!("A user with email {} already exists", email),
        Err(ApiError::Validation(errors)) => {
            let messages: Vec<String> = errors.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
            anyhow::bail!("invalid admin details: {}", messages.join("; "));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
