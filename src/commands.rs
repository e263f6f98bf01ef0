//! Offline operator commands for the `hushlane_license` tool.
//!
//! # Supported Commands
//!
//! ```text
//! hushlane_license create <customer_id> <customer_name> [--plan standard|pro|enterprise] [--months N]
//! hushlane_license list
//! hushlane_license status <license_key> <active|revoked|suspended>
//! ```
//!
//! `--months` defaults to 12; `--months 0` issues a perpetual license.

use crate::database::License;
use crate::errors::{CentralError, CentralResult};
use crate::keygen::{KeyGenerator, LicenseSummary};
use crate::license::{LicenseStatus, Plan};

/// Default license duration for `create`.
pub const DEFAULT_DURATION_MONTHS: u32 = 12;

const RULE: &str = "======================================================================";

/// Parsed operator command.
#[derive(Debug, PartialEq, Eq)]
pub enum LicenseCommand {
    /// Issue a new license
    Create {
        customer_id: String,
        customer_name: String,
        plan: Plan,
        months: u32,
    },
    /// List all licenses
    List,
    /// Change the status of an existing license
    SetStatus {
        license_key: String,
        status: LicenseStatus,
    },
    /// Print usage
    Help,
}

pub fn usage() -> &'static str {
    "HushLane License Generator\n\n\
     Usage:\n  \
     hushlane_license create <customer_id> <customer_name> [--plan standard|pro|enterprise] [--months N]\n  \
     hushlane_license list\n  \
     hushlane_license status <license_key> <active|revoked|suspended>\n\n\
     --months 0 creates a lifetime license (default: 12)"
}

/// Parse the tool's command line (`args[0]` is the program name).
pub fn parse_license_command(args: &[String]) -> CentralResult<LicenseCommand> {
    let Some(command) = args.get(1) else {
        return Ok(LicenseCommand::Help);
    };

    match command.as_str() {
        "create" => {
            let (customer_id, customer_name) = match (args.get(2), args.get(3)) {
                (Some(id), Some(name)) if !id.starts_with("--") && !name.starts_with("--") => {
                    (id.clone(), name.clone())
                }
                _ => {
                    return Err(CentralError::InvalidRequest(
                        "create requires <customer_id> and <customer_name>".to_string(),
                    ))
                }
            };

            let mut plan = Plan::default();
            let mut months = DEFAULT_DURATION_MONTHS;

            let mut i = 4;
            while i < args.len() {
                match args[i].as_str() {
                    "--plan" | "-p" => {
                        let value = args.get(i + 1).ok_or_else(|| {
                            CentralError::InvalidRequest("--plan requires a value".to_string())
                        })?;
                        plan = value.parse()?;
                        i += 2;
                    }
                    "--months" | "-m" => {
                        let value = args.get(i + 1).ok_or_else(|| {
                            CentralError::InvalidRequest("--months requires a value".to_string())
                        })?;
                        months = value.parse().map_err(|_| {
                            CentralError::InvalidRequest(format!(
                                "--months must be a non-negative integer, got '{value}'"
                            ))
                        })?;
                        i += 2;
                    }
                    other => {
                        return Err(CentralError::InvalidRequest(format!(
                            "unexpected argument '{other}'"
                        )))
                    }
                }
            }

            Ok(LicenseCommand::Create {
                customer_id,
                customer_name,
                plan,
                months,
            })
        }
        "list" => Ok(LicenseCommand::List),
        "status" => match (args.get(2), args.get(3)) {
            (Some(key), Some(status)) => Ok(LicenseCommand::SetStatus {
                license_key: key.clone(),
                status: status.parse()?,
            }),
            _ => Err(CentralError::InvalidRequest(
                "status requires <license_key> and <status>".to_string(),
            )),
        },
        _ => Ok(LicenseCommand::Help),
    }
}

/// Run a command and return the text to print on stdout.
pub async fn execute_license_command(
    generator: &KeyGenerator,
    cmd: LicenseCommand,
) -> CentralResult<String> {
    match cmd {
        LicenseCommand::Create {
            customer_id,
            customer_name,
            plan,
            months,
        } => {
            let duration = (months > 0).then_some(months);
            let license = generator
                .create_license(&customer_id, &customer_name, plan, duration)
                .await?;
            Ok(format_created_license(&license, months))
        }
        LicenseCommand::List => {
            let licenses = generator.list_licenses().await?;
            Ok(format_license_table(&licenses))
        }
        LicenseCommand::SetStatus {
            license_key,
            status,
        } => {
            generator.set_status(&license_key, status).await?;
            Ok(format!("License {license_key} is now {status}."))
        }
        LicenseCommand::Help => Ok(usage().to_string()),
    }
}

/// Summary printed after a license is issued, including what to send the customer.
pub fn format_created_license(license: &License, months: u32) -> String {
    let expires = match license.expires_at {
        Some(at) => format!("{} ({} months)", at.format("%Y-%m-%d"), months),
        None => "Never (lifetime)".to_string(),
    };

    let mut out = String::new();
    out.push_str(&format!("{RULE}\nLICENSE CREATED SUCCESSFULLY\n{RULE}\n\n"));
    out.push_str(&format!("Customer ID:   {}\n", license.customer_id));
    out.push_str(&format!("Customer Name: {}\n", license.customer_name));
    out.push_str(&format!("Plan:          {}\n", license.plan));
    out.push_str(&format!("Status:        {}\n", license.status));
    out.push_str(&format!("Expires:       {expires}\n\n"));
    out.push_str(&format!("LICENSE KEY:\n   {}\n\n{RULE}\n\n", license.license_key));
    out.push_str("Send this to the customer:\n\n");
    out.push_str("   Welcome to HushLane!\n");
    out.push_str(&format!("   Your License Key: {}\n", license.license_key));
    out.push_str(&format!("   Customer ID: {}\n\n", license.customer_id));
    out.push_str("   Add this to your .env file:\n");
    out.push_str(&format!("   LICENSE_KEY={}\n", license.license_key));
    out.push_str(&format!("   CUSTOMER_ID={}\n\n{RULE}", license.customer_id));
    out
}

/// Table of all licenses, newest first.
pub fn format_license_table(licenses: &[LicenseSummary]) -> String {
    if licenses.is_empty() {
        return "No licenses found".to_string();
    }

    let wide_rule = "=".repeat(120);
    let mut out = format!("{wide_rule}\nALL LICENSES\n{wide_rule}\n");
    out.push_str(&format!(
        "{:<15} {:<25} {:<12} {:<10} {:<22} {:<22}\n",
        "Customer ID", "Customer Name", "Plan", "Status", "Expires", "License Key"
    ));
    out.push_str(&"-".repeat(120));
    out.push('\n');

    for summary in licenses {
        let license = &summary.license;
        out.push_str(&format!(
            "{:<15} {:<25} {:<12} {:<10} {:<22} {:<22}\n",
            license.customer_id,
            license.customer_name,
            license.plan.as_str(),
            license.status.as_str(),
            summary.expiry.to_string(),
            license.license_key
        ));
    }

    out.push_str(&wide_rule);
    out
}

/// Diagnostic for a failed command, as shown to the operator.
pub fn describe_error(err: &CentralError) -> String {
    match err {
        CentralError::DuplicateCustomer {
            customer_id,
            license_key,
        } => format!(
            "Error: Customer '{customer_id}' already has a license: {license_key}\n   \
             Revoke it first with `hushlane_license status {license_key} revoked`."
        ),
        CentralError::StoreError(msg) => format!("Database error: {msg}"),
        CentralError::InvalidLicense => "Error: license key not found".to_string(),
        other => format!("Error: {other}"),
    }
}
