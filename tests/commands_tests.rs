use std::sync::Arc;

use central::commands::{execute_license_command, parse_license_command, LicenseCommand};
use central::database::Database;
use central::errors::{CentralError, CentralResult};
use central::keygen::KeyGenerator;
use central::license::{LicenseStatus, Plan};

async fn setup_generator() -> CentralResult<(Arc<Database>, KeyGenerator)> {
    let db = Arc::new(Database::connect("sqlite::memory:").await?);
    Ok((db.clone(), KeyGenerator::new(db)))
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn create_prints_key_and_customer_instructions() -> CentralResult<()> {
    let (db, generator) = setup_generator().await?;
    let cmd = parse_license_command(&args(&[
        "hushlane_license",
        "create",
        "acme",
        "Acme Corp",
        "--plan",
        "pro",
    ]))?;

    let output = execute_license_command(&generator, cmd).await?;
    let license = db
        .get_license_by_customer("acme")
        .await?
        .expect("license should be stored");

    assert!(output.contains("LICENSE CREATED SUCCESSFULLY"));
    assert!(output.contains(&format!("LICENSE_KEY={}", license.license_key)));
    assert!(output.contains("CUSTOMER_ID=acme"));
    assert!(output.contains("(12 months)"));
    assert_eq!(license.plan, Plan::Pro);
    Ok(())
}

#[tokio::test]
async fn create_with_zero_months_is_lifetime() -> CentralResult<()> {
    let (db, generator) = setup_generator().await?;
    let output = execute_license_command(
        &generator,
        LicenseCommand::Create {
            customer_id: "globex".to_string(),
            customer_name: "Globex".to_string(),
            plan: Plan::Standard,
            months: 0,
        },
    )
    .await?;

    assert!(output.contains("Never (lifetime)"));
    let license = db
        .get_license_by_customer("globex")
        .await?
        .expect("license should be stored");
    assert!(license.expires_at.is_none());
    Ok(())
}

#[tokio::test]
async fn list_shows_all_licenses() -> CentralResult<()> {
    let (_db, generator) = setup_generator().await?;
    assert_eq!(
        execute_license_command(&generator, LicenseCommand::List).await?,
        "No licenses found"
    );

    generator
        .create_license("acme", "Acme Corp", Plan::Standard, Some(12))
        .await?;
    generator
        .create_license("globex", "Globex", Plan::Enterprise, None)
        .await?;

    let table = execute_license_command(&generator, LicenseCommand::List).await?;
    assert!(table.contains("ALL LICENSES"));
    assert!(table.contains("acme"));
    assert!(table.contains("globex"));
    assert!(table.contains("Never"));
    Ok(())
}

#[tokio::test]
async fn status_command_updates_license() -> CentralResult<()> {
    let (db, generator) = setup_generator().await?;
    let license = generator
        .create_license("acme", "Acme Corp", Plan::Standard, Some(12))
        .await?;

    let output = execute_license_command(
        &generator,
        LicenseCommand::SetStatus {
            license_key: license.license_key.clone(),
            status: LicenseStatus::Revoked,
        },
    )
    .await?;
    assert!(output.contains("revoked"));

    let stored = db
        .get_license_by_key(&license.license_key)
        .await?
        .expect("license should exist");
    assert_eq!(stored.status, LicenseStatus::Revoked);
    Ok(())
}

#[tokio::test]
async fn duplicate_create_surfaces_error() -> CentralResult<()> {
    let (_db, generator) = setup_generator().await?;
    let cmd = || LicenseCommand::Create {
        customer_id: "acme".to_string(),
        customer_name: "Acme Corp".to_string(),
        plan: Plan::Standard,
        months: 12,
    };

    execute_license_command(&generator, cmd()).await?;
    let result = execute_license_command(&generator, cmd()).await;
    assert!(matches!(result, Err(CentralError::DuplicateCustomer { .. })));
    Ok(())
}
